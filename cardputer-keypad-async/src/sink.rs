//! Byte consumers for translated key presses.

use embassy_sync::{blocking_mutex::raw::RawMutex, pipe::Pipe};
use log::warn;

/// Accepts the byte sequences produced by the translator.
///
/// `write` is called from inside the scanning task and must not block. A sink
/// that cannot take a whole sequence should drop it rather than wait.
pub trait OutputSink {
    fn write(&mut self, bytes: &[u8]);
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }
}

/// Throws every byte away.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl OutputSink for Discard {
    fn write(&mut self, _bytes: &[u8]) {}
}

impl<const N: usize> OutputSink for heapless::Vec<u8, N> {
    fn write(&mut self, bytes: &[u8]) {
        if self.extend_from_slice(bytes).is_err() {
            warn!("Output buffer full, dropping {} bytes", bytes.len());
        }
    }
}

/// Feeds a [`Pipe`] so another task can read the byte stream.
///
/// Sequences are written whole or not at all, so a full pipe never leaves half
/// an escape sequence behind.
pub struct PipeSink<'p, M: RawMutex, const N: usize> {
    pipe: &'p Pipe<M, N>,
}

impl<'p, M: RawMutex, const N: usize> PipeSink<'p, M, N> {
    pub fn new(pipe: &'p Pipe<M, N>) -> Self {
        Self { pipe }
    }
}

impl<M: RawMutex, const N: usize> OutputSink for PipeSink<'_, M, N> {
    fn write(&mut self, bytes: &[u8]) {
        if N - self.pipe.len() < bytes.len() {
            warn!("Key pipe full, dropping {} bytes", bytes.len());
            return;
        }
        // A write stops at the ring's wrap point, so it may take two.
        let mut rest = bytes;
        while !rest.is_empty() {
            match self.pipe.try_write(rest) {
                Ok(n) => rest = &rest[n..],
                Err(err) => {
                    warn!("Key pipe write failed: {err:?}");
                    return;
                }
            }
        }
    }
}
