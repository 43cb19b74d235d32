//! Address line driver for the 74HC138 in front of the key matrix.

use embedded_hal::digital::{OutputPin, PinState};

use crate::keys::GROUPS;

/// Address line levels `[A0, A1, A2]` in the order the matrix is scanned.
///
/// Neighbouring states differ in a single line, so stepping through a scan
/// only ever toggles one pin. Key bit positions depend on this exact order.
pub const SCAN_ORDER: [[bool; 3]; GROUPS] = [
    [true, true, false],
    [false, true, false],
    [false, true, true],
    [true, true, true],
    [true, false, true],
    [true, false, false],
    [false, false, false],
    [false, false, true],
];

/// Drives the three address lines, touching only the lines that change.
pub struct AddressDecoder<P: OutputPin> {
    lines: [P; 3],
    current: Option<[bool; 3]>,
}

impl<P: OutputPin> AddressDecoder<P> {
    /// Creates a decoder over `lines`, where `lines[n]` is wired to input `An`.
    ///
    /// The lines are left untouched until [`park`](Self::park) or
    /// [`select`](Self::select) is called.
    pub fn new(lines: [P; 3]) -> Self {
        Self {
            lines,
            current: None,
        }
    }

    /// Drives every line to the first scan state.
    pub fn park(&mut self) -> Result<(), P::Error> {
        self.current = None;
        self.select(0)
    }

    /// Drives the lines to the address state at `state` in [`SCAN_ORDER`].
    ///
    /// `state` must be below [`GROUPS`].
    pub(crate) fn select(&mut self, state: usize) -> Result<(), P::Error> {
        let target = SCAN_ORDER[state];
        for (n, line) in self.lines.iter_mut().enumerate() {
            if self.current.is_some_and(|current| current[n] == target[n]) {
                continue;
            }
            if let Err(err) = line.set_state(PinState::from(target[n])) {
                // Line levels are unknown now; drive all three next time.
                self.current = None;
                return Err(err);
            }
        }
        self.current = Some(target);
        Ok(())
    }

    /// Gives the address lines back.
    pub fn release(self) -> [P; 3] {
        self.lines
    }
}
