//! Error types for the keypad driver.

use core::fmt::{self, Debug};

/// Errors reported while setting up or scanning the key matrix.
pub enum KeypadError<AE, SE> {
    /// Driving an address line failed.
    Address(AE),
    /// Reading a sense line failed.
    Sense(SE),
    /// The scan period was zero.
    InvalidScanPeriod,
    /// A handler list is full.
    HandlerCapacity,
}

impl<AE: Debug, SE: Debug> Debug for KeypadError<AE, SE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(err) => write!(f, "Address({err:?})"),
            Self::Sense(err) => write!(f, "Sense({err:?})"),
            Self::InvalidScanPeriod => write!(f, "InvalidScanPeriod"),
            Self::HandlerCapacity => write!(f, "HandlerCapacity"),
        }
    }
}

impl<AE, SE> From<crate::dispatch::CapacityError> for KeypadError<AE, SE> {
    fn from(_: crate::dispatch::CapacityError) -> Self {
        KeypadError::HandlerCapacity
    }
}
