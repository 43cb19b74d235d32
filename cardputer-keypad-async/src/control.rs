//! Stop handle for the scanning task.

use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};

/// Lets other tasks stop a running [`Keypad`](crate::Keypad) scan loop.
///
/// Requests never block and may be repeated; the loop finishes the scan in
/// progress, then acknowledges.
pub struct ScanControl<M: RawMutex> {
    request: Signal<M, ()>,
    stopped: Signal<M, ()>,
}

impl<M: RawMutex> Default for ScanControl<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ScanControl<M> {
    pub const fn new() -> Self {
        Self {
            request: Signal::new(),
            stopped: Signal::new(),
        }
    }

    /// Asks the scan loop to stop after its current scan.
    ///
    /// Does nothing once the loop has stopped, so a late duplicate cannot end
    /// the next [`run`](crate::Keypad::run). A request made before the first
    /// run still makes that run return without scanning.
    pub fn request_stop(&self) {
        if self.stopped.signaled() {
            return;
        }
        self.request.signal(());
    }

    /// Returns `true` once the scan loop has acknowledged a stop and returned.
    pub fn is_stopped(&self) -> bool {
        self.stopped.signaled()
    }

    /// Waits until the scan loop has stopped.
    pub async fn wait_stopped(&self) {
        self.stopped.wait().await;
        // Leave the acknowledgment in place for other observers.
        self.stopped.signal(());
    }

    pub(crate) fn begin(&self) {
        self.stopped.reset();
    }

    pub(crate) fn take_request(&self) -> bool {
        self.request.try_take().is_some()
    }

    pub(crate) async fn requested(&self) {
        self.request.wait().await;
    }

    pub(crate) fn acknowledge(&self) {
        self.request.reset();
        self.stopped.signal(());
    }
}
