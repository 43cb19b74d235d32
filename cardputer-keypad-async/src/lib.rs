//! An asynchronous, `no_std` driver for the M5 Cardputer's keyboard.
//!
//! The Cardputer wires its 56 keys as a matrix behind a 74HC138 decoder: three
//! address lines pick one of eight groups and seven sense lines report the keys
//! of that group. This driver provides a [`Keypad`] that walks the matrix on a
//! fixed period, keeps the set of held keys as a [`Scancode`], fires press and
//! release handlers with the keys that changed, and translates the held chord
//! into the bytes a terminal keyboard would send.
//!
//! # Usage
//!
//! The keypad takes any `embedded-hal` pins. It is meant to be owned by a
//! single task; a [`ScanControl`] shared with other tasks stops it.
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
//! # use embassy_executor::Spawner;
//! # use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, pipe::Pipe};
//! use cardputer_keypad_async::{Keypad, PipeSink, ScanConfig, ScanControl};
//!
//! static KEYS: Pipe<CriticalSectionRawMutex, 64> = Pipe::new();
//! static CONTROL: ScanControl<CriticalSectionRawMutex> = ScanControl::new();
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let peripherals = esp_hal::init(esp_hal::Config::default());
//!     let out = OutputConfig::default();
//!     let address = [
//!         Output::new(peripherals.GPIO8, Level::Low, out),
//!         Output::new(peripherals.GPIO9, Level::Low, out),
//!         Output::new(peripherals.GPIO11, Level::Low, out),
//!     ];
//!     let input = InputConfig::default().with_pull(Pull::Down);
//!     let sense = [
//!         Input::new(peripherals.GPIO13, input),
//!         // ... GPIO15, GPIO3, GPIO4, GPIO5, GPIO6
//!         Input::new(peripherals.GPIO7, input),
//!     ];
//!
//!     let mut keypad =
//!         Keypad::new(address, sense, ScanConfig::default(), PipeSink::new(&KEYS)).unwrap();
//!     keypad.run(&CONTROL).await;
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod control;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod keypad;
pub mod keys;
pub mod scanner;
pub mod sink;
pub mod tracker;
pub mod translate;

#[cfg(test)]
mod testing;

pub use control::ScanControl;
pub use dispatch::{EventKind, KeyEvent};
pub use error::KeypadError;
pub use keypad::Keypad;
pub use keys::Scancode;
pub use scanner::{ScanConfig, SensePolarity, DEFAULT_SCAN_PERIOD};
pub use sink::{Discard, OutputSink, PipeSink};
pub use translate::{Mapping, Translator, DEFAULT_TABLE};
