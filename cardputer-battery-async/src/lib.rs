//! An asynchronous, `no_std` battery gauge for the M5 Cardputer.
//!
//! The Cardputer has no fuel gauge IC. The battery voltage goes through a
//! halving divider into an ADC pin, and this crate turns that raw reading into
//! a rough percentage.
//!
//! # Usage
//!
//! Implement [`BatterySense`] for whatever reads the ADC channel, then ask a
//! [`BatteryService`] for the level.
//!
//! ```ignore
//! use cardputer_battery_async::{BatteryConfig, BatteryService};
//!
//! let mut battery = BatteryService::new(adc_channel, BatteryConfig::default());
//! if let Ok(percent) = battery.level().await {
//!     log::info!("Battery at {percent}%");
//! }
//! ```

#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;
use log::{debug, error};

/// Raw 8-bit reading of a fully charged cell.
///
/// A 3.7 V cell halved by the divider against a 3.3 V reference reads about
/// 144 at 8 bits. Rounded down so a full battery can actually show 100%.
pub const FULL_CHARGE_RAW: u16 = 144;

/// Source of raw battery voltage samples.
#[allow(async_fn_in_trait)]
pub trait BatterySense {
    type Error: Debug;

    /// Takes one raw ADC sample of the divided battery voltage.
    async fn sample(&mut self) -> Result<u16, Self::Error>;
}

/// Battery gauge configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryConfig {
    /// Raw reading that maps to 100%.
    pub full_charge_raw: u16,
    /// Number of samples averaged per measurement.
    pub samples: u8,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            full_charge_raw: FULL_CHARGE_RAW,
            samples: 32,
        }
    }
}

/// The result of a single measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    /// Average raw sample.
    pub raw: u16,
    /// Charge estimate, 0 to 100.
    pub percent: u8,
}

/// Maps a raw reading linearly onto 0-100%, saturating at 100.
pub fn percent_from_raw(raw: u16, full_charge_raw: u16) -> u8 {
    if full_charge_raw == 0 {
        return 0;
    }
    let percent = u32::from(raw) * 100 / u32::from(full_charge_raw);
    percent.min(100) as u8
}

/// A service for estimating the battery level.
pub struct BatteryService<S: BatterySense> {
    sense: S,
    config: BatteryConfig,
}

impl<S: BatterySense> BatteryService<S> {
    /// Creates a new `BatteryService`.
    ///
    /// # Arguments
    ///
    /// * `sense` - The ADC channel the battery divider is wired to.
    /// * `config` - Calibration and averaging settings.
    pub fn new(sense: S, config: BatteryConfig) -> Self {
        Self { sense, config }
    }

    /// Averages the configured number of samples and converts them.
    pub async fn measure(&mut self) -> Result<BatteryReading, ()> {
        let samples = self.config.samples.max(1);
        let mut sum: u32 = 0;
        for _ in 0..samples {
            let raw = self
                .sense
                .sample()
                .await
                .map_err(|e| error!("Battery ADC error: {e:?}"))?;
            sum += u32::from(raw);
        }
        let raw = (sum / u32::from(samples)) as u16;
        let percent = percent_from_raw(raw, self.config.full_charge_raw);
        debug!("Battery raw {raw}, {percent}%");
        Ok(BatteryReading { raw, percent })
    }

    /// Returns the battery level as a percentage, 0 to 100.
    pub async fn level(&mut self) -> Result<u8, ()> {
        Ok(self.measure().await?.percent)
    }
}
