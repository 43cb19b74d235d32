//! The scan, track, dispatch and translate pipeline.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker};
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::control::ScanControl;
use crate::dispatch::{EventDispatcher, EventKind, Handler, KeyEvent};
use crate::error::KeypadError;
use crate::keys::{Scancode, SENSE_LINES};
use crate::scanner::{ScanConfig, Scanner};
use crate::sink::OutputSink;
use crate::tracker::{Delta, StateTracker};
use crate::translate::Translator;

/// A key matrix driver that owns its pins and runs inside a single task.
///
/// Every scan commits the chord, fires release handlers, then press handlers,
/// and finally writes the translation of the held chord to the sink.
pub struct Keypad<'h, A: OutputPin, S: InputPin, O: OutputSink> {
    scanner: Scanner<A, S>,
    tracker: StateTracker,
    dispatcher: EventDispatcher<'h>,
    translator: Option<Translator>,
    sink: O,
    scan_period: Duration,
}

impl<'h, A: OutputPin, S: InputPin, O: OutputSink> Keypad<'h, A, S, O> {
    /// Creates a new `Keypad`.
    ///
    /// # Arguments
    ///
    /// * `address` - The output pins wired to A0, A1 and A2 of the decoder.
    /// * `sense` - The seven input pins, in sense line order.
    /// * `config` - Scan period and sense polarity.
    /// * `sink` - Receives translated bytes. Translation uses the default table
    ///   until changed with [`set_translator`](Self::set_translator).
    ///
    /// Fails if the scan period is zero or the address lines cannot be driven.
    pub fn new(
        address: [A; 3],
        sense: [S; SENSE_LINES],
        config: ScanConfig,
        sink: O,
    ) -> Result<Self, KeypadError<A::Error, S::Error>> {
        if config.scan_period == Duration::from_ticks(0) {
            return Err(KeypadError::InvalidScanPeriod);
        }
        let scanner = Scanner::new(address, sense, config.polarity)?;
        Ok(Self {
            scanner,
            tracker: StateTracker::new(),
            dispatcher: EventDispatcher::new(),
            translator: Some(Translator::default()),
            sink,
            scan_period: config.scan_period,
        })
    }

    /// Registers a handler called with the keys pressed in a scan.
    pub fn on_pressed(
        &mut self,
        handler: Handler<'h>,
    ) -> Result<(), KeypadError<A::Error, S::Error>> {
        Ok(self.dispatcher.on_pressed(handler)?)
    }

    /// Registers a handler called with the keys released in a scan.
    pub fn on_released(
        &mut self,
        handler: Handler<'h>,
    ) -> Result<(), KeypadError<A::Error, S::Error>> {
        Ok(self.dispatcher.on_released(handler)?)
    }

    /// Replaces the translator, or turns translation off with `None`.
    pub fn set_translator(&mut self, translator: Option<Translator>) {
        self.translator = translator;
    }

    /// The committed chord.
    pub fn state(&self) -> Scancode {
        self.tracker.state()
    }

    /// Forgets every held key without firing release events.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Scans the matrix once and processes any change.
    ///
    /// Returns the edges committed by this scan, or `None` if the chord did not
    /// change. A pin error leaves the committed chord untouched.
    pub fn tick(&mut self) -> Result<Option<Delta>, KeypadError<A::Error, S::Error>> {
        let chord = self.scanner.scan()?;
        let Some(delta) = self.tracker.commit(chord) else {
            return Ok(None);
        };
        debug!("Chord {chord:?}");

        if !delta.released.is_empty() {
            self.dispatcher.dispatch(KeyEvent {
                kind: EventKind::Released,
                delta: delta.released,
            });
        }
        if !delta.pressed.is_empty() {
            self.dispatcher.dispatch(KeyEvent {
                kind: EventKind::Pressed,
                delta: delta.pressed,
            });
            self.emit(chord);
        }
        Ok(Some(delta))
    }

    fn emit(&mut self, chord: Scancode) {
        let Some(bytes) = self.translator.and_then(|t| t.translate(chord)) else {
            return;
        };
        debug!("Sending {:?}", bytes.as_slice());
        self.sink.write(&bytes);
    }

    /// Scans every period until `control` asks to stop.
    ///
    /// The committed chord survives the stop; calling `run` again resumes from
    /// it.
    pub async fn run<M: RawMutex>(&mut self, control: &ScanControl<M>) {
        control.begin();
        info!("Keypad scanning every {} ms", self.scan_period.as_millis());

        let mut ticker = Ticker::every(self.scan_period);
        while !control.take_request() {
            match select(ticker.next(), control.requested()).await {
                Either::First(()) => {
                    if let Err(err) = self.tick() {
                        warn!("Keypad scan failed: {err:?}");
                    }
                }
                Either::Second(()) => break,
            }
        }

        control.acknowledge();
        info!("Keypad scanning stopped");
    }

    /// Gives the pins and the sink back.
    pub fn release(self) -> ([A; 3], [S; SENSE_LINES], O) {
        let (address, sense) = self.scanner.release();
        (address, sense, self.sink)
    }
}
