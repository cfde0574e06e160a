//! SAME frame scanner
//!
//! The `FrameScanner` consumes [byte events](super::bytesync::ByteEvent)
//! and extracts the text of each SAME burst.
//!
//! ```txt
//!   start
//!    ||        0xAB × min                     ZCZC
//!    \/       +----------+  +-----------+  ==========> InHeader
//!   Idle ===> | Preamble |==| 4 bytes   |
//!    /\       +----------+  +-----------+  ==========> InTrailer
//!    ||                           ||          NNNN
//!    ||====== anything else ======||
//! ```
//!
//! A capture ends when the tone stops, when a byte which is
//! not a valid SAME character arrives, when its buffer fills,
//! or when it has run longer than a maximum-length header.
//! Completed header captures are checked against the header
//! grammar before they are reported.

use arrayvec::ArrayVec;

#[cfg(not(test))]
use log::{debug, info, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as warn;

use super::bytesync::{ByteEvent, RawByte};
use super::output::CaptureError;
use crate::message::{self, PREFIX_MESSAGE_END, PREFIX_MESSAGE_START};
use crate::waveform::{MAX_HEADER_LENGTH, PREAMBLE};

/// Text of one SAME burst
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameCapture {
    /// Captured text, starting with `ZCZC` or `NNNN`
    pub text: String,

    /// Lifetime sample index of the first prefix byte
    pub start: u64,

    /// Lifetime sample index where the capture ended
    pub end: u64,
}

/// Frame scanner output
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameOut {
    /// A header which matches the SAME header grammar
    ///
    /// The text is truncated to the end of the header.
    Header(FrameCapture),

    /// An end-of-message trailer
    Trailer(FrameCapture),

    /// A header capture which was discarded
    Failed {
        /// Why the capture was discarded
        reason: CaptureError,

        /// What was captured
        capture: FrameCapture,
    },
}

/// SAME frame scanner
#[derive(Clone, Debug)]
pub struct FrameScanner {
    state: State,

    // preamble bytes required before a prefix
    min_preamble: u32,

    // longest permitted capture, in samples
    capture_timeout: u64,
}

impl FrameScanner {
    /// New frame scanner
    ///
    /// At least `min_preamble` bytes of preamble must precede
    /// the `ZCZC` or `NNNN` prefix. Captures which run longer
    /// than `capture_timeout` samples are discarded.
    pub fn new(min_preamble: u32, capture_timeout: u64) -> Self {
        Self {
            state: State::default(),
            min_preamble,
            capture_timeout,
        }
    }

    /// Reset to zero initial conditions
    ///
    /// Any capture in progress is dropped without output.
    pub fn reset(&mut self) {
        self.state = State::default();
    }

    /// Change the capture timeout, in samples
    pub fn set_capture_timeout(&mut self, capture_timeout: u64) {
        self.capture_timeout = capture_timeout;
    }

    /// True if a header or trailer is being captured
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, State::InHeader(_) | State::InTrailer(_))
    }

    /// Process one byte synchronizer event
    ///
    /// Every event is consumed and causes at most one state
    /// transition. Returns a capture when one ends.
    pub fn input(&mut self, evt: &ByteEvent) -> Option<FrameOut> {
        match evt {
            ByteEvent::Synced(ts) => {
                // the sync word is four preamble bytes
                let out = self.finish(*ts);
                self.state = State::Idle { run: 4 };
                out
            }
            ByteEvent::Break(ts) => {
                let out = self.finish(*ts);
                self.state = State::Idle { run: 0 };
                out
            }
            ByteEvent::Byte(byte) => self.input_byte(byte),
        }
    }

    fn input_byte(&mut self, byte: &RawByte) -> Option<FrameOut> {
        let is_preamble = byte.value == PREAMBLE;
        match self.state {
            State::Idle { ref mut run } => {
                if is_preamble {
                    *run = run.saturating_add(1);
                    if *run >= self.min_preamble {
                        debug!("frame: preamble: {} bytes", run);
                        self.state = State::Preamble {
                            prefix: ArrayVec::new(),
                            start: byte.timestamp,
                        };
                    }
                } else {
                    *run = 0;
                }
                None
            }

            State::Preamble {
                ref mut prefix,
                ref mut start,
            } => {
                if is_preamble && prefix.is_empty() {
                    // more preamble
                    return None;
                }

                if prefix.is_empty() {
                    *start = byte.timestamp;
                }
                prefix.push(byte.value);
                if !is_prefix_of(prefix, PREFIX_MESSAGE_START)
                    && !is_prefix_of(prefix, PREFIX_MESSAGE_END)
                {
                    debug!(
                        "frame: no prefix: \"{}\"",
                        String::from_utf8_lossy(prefix.as_slice())
                    );
                    self.state = State::Idle {
                        run: is_preamble as u32,
                    };
                } else if prefix.is_full() {
                    let capture = Capture::new(prefix, *start);
                    if prefix.as_slice() == PREFIX_MESSAGE_START.as_bytes() {
                        info!("frame: [{:<14}]: header started", start);
                        self.state = State::InHeader(capture);
                    } else {
                        info!("frame: [{:<14}]: trailer started", start);
                        self.state = State::InTrailer(capture);
                    }
                }
                None
            }

            State::InHeader(ref mut capture) | State::InTrailer(ref mut capture) => {
                if byte.timestamp.saturating_sub(capture.start) > self.capture_timeout {
                    warn!(
                        "frame: capture exceeded {} samples: \"{}\"",
                        self.capture_timeout,
                        capture.to_string_lossy()
                    );
                    let out = FrameOut::Failed {
                        reason: CaptureError::Timeout,
                        capture: capture.take(byte.timestamp),
                    };
                    self.state = State::Idle {
                        run: is_preamble as u32,
                    };
                    Some(out)
                } else if !is_allowed_byte(byte.value) {
                    let out = self.finish(byte.timestamp);
                    self.state = State::Idle {
                        run: is_preamble as u32,
                    };
                    out
                } else if capture.text.try_push(byte.value).is_err() || capture.text.is_full() {
                    let out = self.finish(byte.timestamp);
                    self.state = State::Idle { run: 0 };
                    out
                } else {
                    None
                }
            }
        }
    }

    // End the current capture, if any, at lifetime sample `now`
    //
    // The caller sets the next state.
    fn finish(&mut self, now: u64) -> Option<FrameOut> {
        match std::mem::take(&mut self.state) {
            State::InHeader(mut capture) => {
                let capture = capture.take(now);
                match message::check_header(&capture.text) {
                    Ok((_, hdr_length)) => {
                        let mut capture = capture;
                        capture.text.truncate(hdr_length);
                        info!("frame: header: \"{}\"", capture.text);
                        Some(FrameOut::Header(capture))
                    }
                    Err(err) => {
                        warn!("frame: {}: \"{}\"", err, capture.text);
                        Some(FrameOut::Failed {
                            reason: err.into(),
                            capture,
                        })
                    }
                }
            }
            State::InTrailer(mut capture) => {
                let capture = capture.take(now);
                info!("frame: trailer: \"{}\"", capture.text);
                Some(FrameOut::Trailer(capture))
            }
            _ => None,
        }
    }
}

// Capture buffer
#[derive(Clone, Debug, PartialEq, Eq)]
struct Capture {
    text: ArrayVec<u8, MAX_HEADER_LENGTH>,
    start: u64,
}

impl Capture {
    fn new(prefix: &[u8], start: u64) -> Self {
        let mut text = ArrayVec::new();
        text.extend(prefix.iter().copied());
        Self { text, start }
    }

    fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.text.as_slice()).into_owned()
    }

    // Convert to output, ending at `end`
    fn take(&mut self, end: u64) -> FrameCapture {
        let out = FrameCapture {
            text: self.to_string_lossy(),
            start: self.start,
            end,
        };
        self.text.clear();
        out
    }
}

// Scanner state
#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    // Count consecutive preamble bytes
    Idle { run: u32 },

    // Enough preamble; read the four-byte prefix
    //
    // `start` is the time of the first prefix byte
    Preamble { prefix: ArrayVec<u8, 4>, start: u64 },

    // Capture a header
    InHeader(Capture),

    // Capture a trailer
    InTrailer(Capture),
}

impl Default for State {
    fn default() -> Self {
        State::Idle { run: 0 }
    }
}

// True if `partial` is the beginning of `prefix`
fn is_prefix_of(partial: &[u8], prefix: &str) -> bool {
    prefix.as_bytes().starts_with(partial)
}

// Is the given byte an allowed SAME/EAS character?
//
// Allowed characters are ASCII letters and digits, plus
// `-+?()[]._,/` and the space, which may appear in the
// callsign field.
//
// The preamble byte `0xAB` is not allowed after the
// data transmission begins, and it is not marked
// as allowed here.
#[inline]
fn is_allowed_byte(c: u8) -> bool {
    matches!(
        c,
        b'0'..=b'9'
            | b'A'..=b'Z'
            | b'a'..=b'z'
            | b'-'
            | b'+'
            | b'?'
            | b'('
            | b')'
            | b'['
            | b']'
            | b'.'
            | b'_'
            | b','
            | b'/'
            | b' '
    )
}
