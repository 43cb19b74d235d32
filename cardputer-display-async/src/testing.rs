//! Recording pins and bus for host tests.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::{rc::Rc, vec, vec::Vec};

use embedded_hal::digital::{self, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{self, Operation, SpiDevice};

use crate::{LcdConfig, LcdDisplay};

/// Everything written to the bus, tagged with the D/C level at the time.
pub type Log = Rc<RefCell<Vec<(bool, Vec<u8>)>>>;

pub struct DcPin(pub Rc<Cell<bool>>);

impl digital::ErrorType for DcPin {
    type Error = Infallible;
}

impl OutputPin for DcPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

pub struct Bus {
    dc: Rc<Cell<bool>>,
    log: Log,
}

impl spi::ErrorType for Bus {
    type Error = Infallible;
}

impl SpiDevice<u8> for Bus {
    async fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        for op in operations {
            if let Operation::Write(bytes) = op {
                self.log.borrow_mut().push((self.dc.get(), bytes.to_vec()));
            }
        }
        Ok(())
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// A default-sized panel with its frame memory and bus log.
pub struct Rig {
    pub frame: Vec<u8>,
    pub log: Log,
    dc: Rc<Cell<bool>>,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            frame: vec![0; LcdConfig::default().buffer_len()],
            log: Log::default(),
            dc: Rc::new(Cell::new(false)),
        }
    }

    pub fn parts(&mut self) -> (LcdDisplay<'_, DcPin, DcPin>, Bus) {
        let display = LcdDisplay::new(
            DcPin(self.dc.clone()),
            None,
            &mut self.frame,
            LcdConfig::default(),
        )
        .unwrap();
        let bus = Bus {
            dc: self.dc.clone(),
            log: self.log.clone(),
        };
        (display, bus)
    }

    /// Command bytes sent so far, in order.
    pub fn commands(&self) -> Vec<u8> {
        self.log
            .borrow()
            .iter()
            .filter(|(data, _)| !data)
            .map(|(_, bytes)| bytes[0])
            .collect()
    }
}
