//! Full decoder chain

#[cfg(not(test))]
use log::{info, trace};

#[cfg(test)]
use std::println as trace;
#[cfg(test)]
use std::println as info;

use std::collections::vec_deque::{Drain, VecDeque};
use std::convert::From;

mod bytesync;
mod framing;
mod output;
mod symsync;
mod timeddata;
mod tone;
mod validator;

pub use output::{BurstRejection, CaptureError, DecoderEvent, EventKind};
pub(crate) use validator::DEFAULT_BURST_WINDOW_SYMBOLS;

use crate::builder::{self, ConfigurationError, DecoderBuilder};
use crate::waveform;

use bytesync::ByteSync;
use framing::{FrameOut, FrameScanner};
use symsync::BitClock;
use tone::ToneDetector;
use validator::{Validator, Verdict};

/// A complete SAME decoder chain
///
/// The decoder takes `f32` audio samples and performs the
/// following operations:
///
/// 1. Tone detection: each window of `input_rate / 2080`
///    samples is classified as mark, space, or neither by
///    counting zero crossings.
/// 2. Bit clock: tone windows are combined into one bit
///    decision per SAME bit period.
/// 3. Byte synchronization on the `0xABABABAB` preamble,
///    least-significant bit first.
/// 4. Framing: the text of each `ZCZC` header or `NNNN`
///    trailer is captured and checked against the header
///    grammar.
/// 5. Validation: a header is accepted once two of its three
///    transmissions agree exactly.
///
/// To create the decoder, first create its Builder:
///
/// ```
/// use samezc::DecoderBuilder;
///
/// let mut decoder = DecoderBuilder::default().build().expect("bad config");
/// assert_eq!(decoder.input_rate(), 22050);
///
/// decoder.push_samples(&[0.0f32; 4410], 22050).expect("bad rate");
/// assert_eq!(0, decoder.events().count());
/// assert_eq!(4410, decoder.input_sample_counter());
/// ```
///
/// The decoder holds no global state. Decode independent
/// streams with independent decoders.
#[derive(Clone, Debug)]
pub struct SameDecoder {
    detector: ToneDetector,
    clock: BitClock,
    bytesync: ByteSync,
    scanner: FrameScanner,
    validator: Validator,
    capture_timeout_symbols: u64,
    burst_window_symbols: u64,
    diagnostics: bool,
    input_sample_counter: u64,
    window_counter: u64,
    events: VecDeque<DecoderEvent>,
}

impl SameDecoder {
    /// Process a block of audio samples
    ///
    /// The `samples` must be mono PCM audio, scaled to the range
    /// `[-1.0, 1.0]`, sampled at `sample_rate` Hz. Blocks must
    /// be delivered in order. Blocks may have any length.
    ///
    /// If `sample_rate` differs from the current
    /// [`input_rate()`](#method.input_rate), the decoder is
    /// reconfigured for the new rate before these samples are
    /// processed. Any tone, bit, byte, or capture in progress is
    /// lost, but captures already collected for validation are
    /// kept.
    ///
    /// Returns an error, without processing any samples, if the
    /// `sample_rate` is unusable. Retrieve the results with
    /// [`events()`](#method.events).
    pub fn push_samples(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<(), ConfigurationError> {
        if sample_rate != self.input_rate() {
            self.set_input_rate(sample_rate)?;
        }

        for &sa in samples {
            self.process(sa);
        }
        Ok(())
    }

    /// Drain pending output events
    ///
    /// Returns an iterator over every event which has occurred
    /// since the last call, oldest first. Events not consumed by
    /// the iterator are discarded when it is dropped.
    pub fn events(&mut self) -> Drain<'_, DecoderEvent> {
        self.events.drain(..)
    }

    /// Change the input sampling rate
    ///
    /// Resets all in-flight tone, bit, byte, and capture state.
    /// Header captures which are awaiting validation are kept.
    /// Returns an error, and changes nothing, if the rate is
    /// unusable.
    pub fn set_input_rate(&mut self, input_rate: u32) -> Result<(), ConfigurationError> {
        builder::check_input_rate(input_rate)?;
        if input_rate == self.input_rate() {
            return Ok(());
        }

        info!(
            "decoder [{:<14}]: input rate changed: {} Hz → {} Hz",
            self.input_sample_counter,
            self.input_rate(),
            input_rate
        );

        self.detector
            .set_input_rate(input_rate, self.input_sample_counter);
        self.clock.set_input_rate(input_rate);
        self.bytesync.reset();
        self.scanner.reset();
        self.scanner.set_capture_timeout(waveform::symbols_to_samples(
            self.capture_timeout_symbols,
            input_rate,
        ));
        self.validator.set_burst_window(waveform::symbols_to_samples(
            self.burst_window_symbols,
            input_rate,
        ));
        Ok(())
    }

    /// Input sampling rate
    ///
    /// Returns the sampling rate most recently given to
    /// [`push_samples()`](#method.push_samples), or the rate
    /// the decoder was built with.
    pub fn input_rate(&self) -> u32 {
        self.detector.input_rate()
    }

    /// Lifetime total input sample counter
    ///
    /// Reports the lifetime total of input samples which
    /// have been processed.
    pub fn input_sample_counter(&self) -> u64 {
        self.input_sample_counter
    }

    /// Clear all states and reset to zero initial conditions
    ///
    /// All buffers, captures, and pending events are cleared.
    /// The input rate is unchanged.
    pub fn reset(&mut self) {
        self.input_sample_counter = 0;
        self.window_counter = 0;
        self.detector.reset(0);
        self.clock.reset();
        self.bytesync.reset();
        self.scanner.reset();
        self.validator.reset();
        self.events.clear();
    }

    /// Flush the decoder and emit any leftover events
    ///
    /// When processing recorded audio that has been "close cut"
    /// to the extents of a message, the last burst may still be
    /// in progress when the input ends.
    ///
    /// This method feeds two seconds of silence, which ends any
    /// capture in progress, and then closes the burst window.
    /// Retrieve the results with [`events()`](#method.events).
    pub fn flush(&mut self) {
        let two_seconds = 2 * self.input_rate() as usize;
        for _ in 0..two_seconds {
            self.process(0.0f32);
        }

        if let Some(verdict) = self.validator.poll(u64::MAX) {
            self.report(verdict);
        }
    }

    // Process a single sample
    #[inline]
    fn process(&mut self, sa: f32) {
        let win = self.detector.input(sa);
        self.input_sample_counter = self.input_sample_counter.wrapping_add(1);
        if let Some(win) = win {
            self.process_window(&win);
        }
    }

    // Process one tone window, about four per bit
    fn process_window(&mut self, win: &tone::ToneSample) {
        self.window_counter = self.window_counter.wrapping_add(1);
        if self.window_counter % Self::TRACE_LOG_INTERVAL_WINDOWS == 0 {
            trace!(
                "decoder [{:<14}]: tone {:?}, {} crossings, byte sync {}",
                self.input_sample_counter,
                win.tone,
                win.crossings,
                self.bytesync.is_synced()
            );
        }

        for bit in self.clock.input(win) {
            let Some(evt) = self.bytesync.input(&bit) else {
                continue;
            };
            if let Some(frame) = self.scanner.input(&evt) {
                self.frame(frame);
            }
        }

        if let Some(verdict) = self.validator.poll(self.input_sample_counter) {
            self.report(verdict);
        }
    }

    // Route a completed capture
    fn frame(&mut self, frame: FrameOut) {
        let verdicts = match frame {
            FrameOut::Header(capture) => self.validator.input_header(capture),
            FrameOut::Trailer(capture) => self.validator.input_trailer(capture),
            FrameOut::Failed { reason, capture } => {
                self.emit(EventKind::CaptureFailed {
                    reason,
                    raw_text: capture.text,
                });
                return;
            }
        };

        for verdict in verdicts {
            self.report(verdict);
        }
    }

    fn report(&mut self, verdict: Verdict) {
        let what = match verdict {
            Verdict::Accepted(msg) => EventKind::Message(msg),
            Verdict::EndOfMessage => EventKind::EndOfMessage,
            Verdict::Rejected { reason, captures } => {
                EventKind::BurstRejected { reason, captures }
            }
        };
        self.emit(what);
    }

    // Queue an event, unless it is a disabled diagnostic
    fn emit(&mut self, what: EventKind) {
        if what.is_diagnostic() && !self.diagnostics {
            return;
        }

        let evt = DecoderEvent::new(what, self.input_sample_counter);
        info!("decoder {}", evt);
        self.events.push_back(evt);
    }

    // Print trace-level messages about once per second
    const TRACE_LOG_INTERVAL_WINDOWS: u64 = 2080;
}

impl From<&DecoderBuilder> for SameDecoder {
    /// Create the decoder from its Builder
    ///
    /// The builder's settings are not checked. Use
    /// [`DecoderBuilder::build()`] instead.
    fn from(cfg: &DecoderBuilder) -> Self {
        let input_rate = cfg.input_rate();
        let capture_timeout =
            waveform::symbols_to_samples(cfg.capture_timeout_symbols(), input_rate);
        let burst_window = waveform::symbols_to_samples(cfg.burst_window_symbols(), input_rate);

        Self {
            detector: ToneDetector::new(input_rate, cfg.noise_floor(), 0),
            clock: BitClock::new(input_rate, cfg.tracking_gain()),
            bytesync: ByteSync::new(),
            scanner: FrameScanner::new(cfg.min_preamble_bytes(), capture_timeout),
            validator: Validator::new(burst_window),
            capture_timeout_symbols: cfg.capture_timeout_symbols(),
            burst_window_symbols: cfg.burst_window_symbols(),
            diagnostics: cfg.diagnostics(),
            input_sample_counter: 0,
            window_counter: 0,
            events: VecDeque::new(),
        }
    }
}
