//! One pass over the key matrix.

use embassy_time::Duration;
use embedded_hal::digital::{InputPin, OutputPin};
use log::trace;

use crate::decoder::AddressDecoder;
use crate::error::KeypadError;
use crate::keys::{Scancode, GROUPS, SENSE_LINES};

/// Default time between two matrix scans.
///
/// 20 ms lets a press, its release and the next press register within 60 ms,
/// which keeps up with the fastest typists.
pub const DEFAULT_SCAN_PERIOD: Duration = Duration::from_millis(20);

/// Sense line level that means "switch closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensePolarity {
    /// Pulled-down inputs, a closed switch reads high.
    #[default]
    ActiveHigh,
    /// Pulled-up inputs, a closed switch reads low.
    ActiveLow,
}

/// Scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Time between the start of two consecutive scans.
    pub scan_period: Duration,
    /// Level a sense line reads while its switch is closed.
    pub polarity: SensePolarity,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_period: DEFAULT_SCAN_PERIOD,
            polarity: SensePolarity::default(),
        }
    }
}

/// Reads the raw chord from the matrix.
pub struct Scanner<A: OutputPin, S: InputPin> {
    decoder: AddressDecoder<A>,
    sense: [S; SENSE_LINES],
    polarity: SensePolarity,
}

impl<A: OutputPin, S: InputPin> Scanner<A, S> {
    /// Creates a scanner and parks the address lines on the first scan state.
    pub fn new(
        address: [A; 3],
        sense: [S; SENSE_LINES],
        polarity: SensePolarity,
    ) -> Result<Self, KeypadError<A::Error, S::Error>> {
        let mut decoder = AddressDecoder::new(address);
        decoder.park().map_err(KeypadError::Address)?;
        Ok(Self {
            decoder,
            sense,
            polarity,
        })
    }

    /// Walks all eight address states and returns the assembled chord.
    ///
    /// Each state ORs its seven sense lines into the low bits of the
    /// accumulator, which is then shifted up by seven before the next state.
    pub fn scan(&mut self) -> Result<Scancode, KeypadError<A::Error, S::Error>> {
        let mut acc: u64 = 0;
        for state in 0..GROUPS {
            if state > 0 {
                acc <<= SENSE_LINES;
            }
            self.decoder.select(state).map_err(KeypadError::Address)?;
            for (line, pin) in self.sense.iter_mut().enumerate() {
                let closed = match self.polarity {
                    SensePolarity::ActiveHigh => pin.is_high(),
                    SensePolarity::ActiveLow => pin.is_low(),
                }
                .map_err(KeypadError::Sense)?;
                if closed {
                    acc |= 1 << line;
                }
            }
        }
        trace!("Raw matrix {acc:#016x}");
        Ok(Scancode::from_bits_retain(acc))
    }

    /// Gives the pins back.
    pub fn release(self) -> ([A; 3], [S; SENSE_LINES]) {
        (self.decoder.release(), self.sense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Matrix, SenseFault};

    #[test]
    fn idle_matrix_reads_zero() {
        let matrix = Matrix::new();
        let (address, sense) = matrix.pins();
        let mut scanner = Scanner::new(address, sense, SensePolarity::ActiveHigh).unwrap();
        assert_eq!(scanner.scan().unwrap(), Scancode::empty());
    }

    #[test]
    fn first_state_lands_in_the_top_bits() {
        let matrix = Matrix::new();
        matrix.close_raw([true, true, false], 0);
        matrix.close_raw([false, false, true], 6);
        let (address, sense) = matrix.pins();
        let mut scanner = Scanner::new(address, sense, SensePolarity::ActiveHigh).unwrap();
        assert_eq!(scanner.scan().unwrap().bits(), 1 << 49 | 1 << 6);
    }

    #[test]
    fn held_keys_come_back_as_the_same_flags() {
        let matrix = Matrix::new();
        let chord = Scancode::CTRL | Scancode::SHIFT | Scancode::BACKTICK | Scancode::SPACE;
        matrix.hold(chord);
        let (address, sense) = matrix.pins();
        let mut scanner = Scanner::new(address, sense, SensePolarity::ActiveHigh).unwrap();
        assert_eq!(scanner.scan().unwrap(), chord);
    }

    #[test]
    fn active_low_inverts_the_reading() {
        let matrix = Matrix::new();
        matrix.set_active_low(true);
        matrix.hold(Scancode::A);
        let (address, sense) = matrix.pins();
        let mut scanner = Scanner::new(address, sense, SensePolarity::ActiveLow).unwrap();
        assert_eq!(scanner.scan().unwrap(), Scancode::A);
    }

    #[test]
    fn sense_failure_is_reported() {
        let matrix = Matrix::new();
        matrix.set_fault(Some(SenseFault));
        let (address, sense) = matrix.pins();
        let mut scanner = Scanner::new(address, sense, SensePolarity::ActiveHigh).unwrap();
        assert!(matches!(scanner.scan(), Err(KeypadError::Sense(SenseFault))));
    }
}
