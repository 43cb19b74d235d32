//! Tone output for the M5 Cardputer's NS4168 I2S amplifier.
//!
//! The amplifier accepts 8 kHz to 96 kHz. This crate plays fixed waveform
//! tables at [`SAMPLE_RATE_HZ`] through anything that implements
//! [`SampleSink`], usually an I2S transmit channel.
//!
//! # Usage
//!
//! ```ignore
//! use cardputer_speaker_async::Speaker;
//!
//! let mut speaker = Speaker::new(i2s_tx);
//! speaker.beep().await.ok();
//! ```

#![cfg_attr(not(test), no_std)]

use core::fmt::Debug;
use log::{debug, error};

/// Rate the waveform tables are sampled at.
pub const SAMPLE_RATE_HZ: u32 = 8_000;

/// One full cycle of a 440 Hz sine at 8 kHz, 18 samples or 2.25 ms.
///
/// Unsigned 16-bit, centred on `0x8000`.
pub const SIN_440_FULL_WAVE: [u16; 18] = [
    0x8000, 0xab5b, 0xd196, 0xee2c, 0xfdbb, 0xfe6c, 0xf02a, 0xd4a5, 0xaf1e, 0x8405, 0x5872,
    0x318c, 0x13ed, 0x0315, 0x0102, 0x0df3, 0x2861, 0x4d2a,
];

/// Number of samples in a beep, a quarter second at [`SAMPLE_RATE_HZ`].
pub const BEEP_SAMPLES: usize = SAMPLE_RATE_HZ as usize / 4;

/// Destination for mono 16-bit samples.
#[allow(async_fn_in_trait)]
pub trait SampleSink {
    type Error: Debug;

    /// Writes `samples` and returns once they have been queued.
    async fn write_mono(&mut self, samples: &[u16]) -> Result<(), Self::Error>;
}

/// Plays tones through a [`SampleSink`].
pub struct Speaker<S: SampleSink> {
    sink: S,
}

impl<S: SampleSink> Speaker<S> {
    /// Creates a new `Speaker`.
    ///
    /// # Arguments
    ///
    /// * `sink` - An output already configured for [`SAMPLE_RATE_HZ`].
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Repeats whole cycles of `wave` until roughly `samples` have been written.
    ///
    /// Partial cycles are dropped, so the tone never ends mid-period.
    pub async fn play(&mut self, wave: &[u16], samples: usize) -> Result<(), ()> {
        if wave.is_empty() {
            return Ok(());
        }
        let cycles = samples / wave.len();
        debug!("Playing {cycles} cycles of {} samples", wave.len());
        for _ in 0..cycles {
            self.sink
                .write_mono(wave)
                .await
                .map_err(|e| error!("Speaker write error: {e:?}"))?;
        }
        Ok(())
    }

    /// A short neutral beep: 440 Hz for a quarter second.
    pub async fn beep(&mut self) -> Result<(), ()> {
        self.play(&SIN_440_FULL_WAVE, BEEP_SAMPLES).await
    }

    /// Gives the sink back.
    pub fn release(self) -> S {
        self.sink
    }
}
