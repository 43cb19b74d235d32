//! An exclusive [`SpiDevice`] for the LCD.
//!
//! The LCD is alone on SPI2, so the bus is owned outright instead of being
//! shared behind a lock.

use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::spi::{SpiBus, SpiDevice};

/// An SPI bus plus the chip select of the one device on it.
pub struct LcdBus<BUS, CS, D> {
    bus: BUS,
    cs: CS,
    delay: D,
}

impl<BUS, CS, D> LcdBus<BUS, CS, D> {
    /// Creates a new `LcdBus`.
    ///
    /// # Arguments
    ///
    /// * `bus` - The SPI bus the LCD is wired to.
    /// * `cs` - The chip select pin, already driven high.
    /// * `delay` - A delay provider for `DelayNs` operations.
    pub fn new(bus: BUS, cs: CS, delay: D) -> Self {
        Self { bus, cs, delay }
    }
}

/// An error type for `LcdBus` transactions.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BusError<BUS, CS> {
    /// An inner SPI bus operation failed.
    Spi(BUS),
    /// Asserting or deasserting the CS pin failed.
    Cs(CS),
}

impl<BUS, CS> Error for BusError<BUS, CS>
where
    BUS: Error + Debug,
    CS: Debug,
{
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Spi(e) => e.kind(),
            Self::Cs(_) => ErrorKind::ChipSelectFault,
        }
    }
}

impl<BUS, CS, D> ErrorType for LcdBus<BUS, CS, D>
where
    BUS: ErrorType,
    CS: OutputPin,
{
    type Error = BusError<BUS::Error, CS::Error>;
}

impl<BUS, CS, D> SpiDevice<u8> for LcdBus<BUS, CS, D>
where
    BUS: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    async fn transaction(
        &mut self,
        operations: &mut [Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(BusError::Cs)?;

        let mut result = Ok(());
        for op in operations {
            result = match op {
                Operation::Read(buf) => self.bus.read(buf).await,
                Operation::Write(buf) => self.bus.write(buf).await,
                Operation::Transfer(read, write) => self.bus.transfer(read, write).await,
                Operation::TransferInPlace(buf) => self.bus.transfer_in_place(buf).await,
                Operation::DelayNs(ns) => match self.bus.flush().await {
                    Ok(()) => {
                        self.delay.delay_ns(*ns).await;
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
            };
            if result.is_err() {
                break;
            }
        }

        // CS goes high even after a failed operation.
        let flush = self.bus.flush().await;
        self.cs.set_high().map_err(BusError::Cs)?;

        if let Err(err) = &result {
            log::warn!("LCD transfer failed: {err:?}");
        }
        result.map_err(BusError::Spi)?;
        flush.map_err(BusError::Spi)
    }
}
