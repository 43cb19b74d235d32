//! Simulated key matrix for host tests.

extern crate std;

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::{rc::Rc, vec::Vec};

use embedded_hal::digital::{self, ErrorKind, InputPin, OutputPin};

use crate::decoder::SCAN_ORDER;
use crate::keys::{matrix_bit, Scancode, SENSE_LINES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseFault;

impl digital::Error for SenseFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct Inner {
    address: Cell<[bool; 3]>,
    closed: RefCell<Vec<([bool; 3], usize)>>,
    active_low: Cell<bool>,
    fault: Cell<Option<SenseFault>>,
}

/// Switches addressed the way the 74HC138 board wires them.
#[derive(Clone, Default)]
pub struct Matrix {
    inner: Rc<Inner>,
}

impl Matrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the switch on `line` of the group selected by `address`.
    pub fn close_raw(&self, address: [bool; 3], line: usize) {
        self.inner.closed.borrow_mut().push((address, line));
    }

    /// Holds exactly the keys in `chord`.
    pub fn hold(&self, chord: Scancode) {
        let mut closed = self.inner.closed.borrow_mut();
        closed.clear();
        for (state, address) in SCAN_ORDER.iter().enumerate() {
            for line in 0..SENSE_LINES {
                if chord.bits() & (1 << matrix_bit(state, line)) != 0 {
                    closed.push((*address, line));
                }
            }
        }
    }

    pub fn set_active_low(&self, active_low: bool) {
        self.inner.active_low.set(active_low);
    }

    pub fn set_fault(&self, fault: Option<SenseFault>) {
        self.inner.fault.set(fault);
    }

    pub fn pins(&self) -> ([AddressPin; 3], [SensePin; SENSE_LINES]) {
        let address = core::array::from_fn(|index| AddressPin {
            inner: self.inner.clone(),
            index,
        });
        let sense = core::array::from_fn(|line| SensePin {
            inner: self.inner.clone(),
            line,
        });
        (address, sense)
    }
}

pub struct AddressPin {
    inner: Rc<Inner>,
    index: usize,
}

impl AddressPin {
    fn drive(&self, level: bool) {
        let mut address = self.inner.address.get();
        address[self.index] = level;
        self.inner.address.set(address);
    }
}

impl digital::ErrorType for AddressPin {
    type Error = Infallible;
}

impl OutputPin for AddressPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}

pub struct SensePin {
    inner: Rc<Inner>,
    line: usize,
}

impl SensePin {
    fn closed(&self) -> bool {
        let address = self.inner.address.get();
        self.inner
            .closed
            .borrow()
            .iter()
            .any(|&(a, line)| a == address && line == self.line)
    }
}

impl digital::ErrorType for SensePin {
    type Error = SenseFault;
}

impl InputPin for SensePin {
    fn is_high(&mut self) -> Result<bool, SenseFault> {
        if let Some(fault) = self.inner.fault.get() {
            return Err(fault);
        }
        Ok(self.closed() != self.inner.active_low.get())
    }

    fn is_low(&mut self) -> Result<bool, SenseFault> {
        self.is_high().map(|high| !high)
    }
}
