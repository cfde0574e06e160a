//! Validates SAME headers by majority rule
//!
//! Every SAME header is transmitted three times, with one
//! second of silence (±5%) between bursts. The [`Validator`]
//! collects the header captures from one *burst window* and
//! accepts a header only when captures agree. We follow these
//! rules:
//!
//! 1. A burst window opens when a header capture begins and no
//!    window is open. It is long enough to hold three
//!    maximum-length bursts and the gaps between them. Captures
//!    which begin after the deadline belong to a new window.
//!
//! 2. As soon as two captures in the window are identical, byte
//!    for byte, their text is the message. It is reported once.
//!    Later captures in the same window are absorbed.
//!
//! 3. If three captures disagree, or if the window closes with
//!    fewer than two agreeing captures, there is no message.
//!    There is no bitwise voting and no partial repair.
//!
//! 4. An end-of-message trailer closes the window. Trailers are
//!    also sent three times; only the first one in a burst
//!    window is reported. The next header starts a new message,
//!    and its own trailer is reported even if it follows closely.
//!
//! All times are lifetime input sample counts.

use arraydeque::{ArrayDeque, Saturating};
use arrayvec::ArrayVec;

#[cfg(not(test))]
use log::{debug, info, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as warn;

use super::framing::FrameCapture;
use super::output::BurstRejection;
use super::timeddata::TimedData;
use crate::message::ValidatedMessage;
use crate::waveform;

/// Default burst window, in symbols
///
/// Three maximum-length bursts and two maximum gaps between
/// them, or about 14.4 seconds.
pub const DEFAULT_BURST_WINDOW_SYMBOLS: u64 =
    3 * 8 * waveform::MAX_BURST_LENGTH as u64 + 2 * waveform::MAX_INTERBURST_SYMBOLS;

/// Validator output
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Captures agreed on a header
    Accepted(ValidatedMessage),

    /// First end-of-message trailer in its window
    EndOfMessage,

    /// A burst window closed without agreement
    Rejected {
        /// Why there was no message
        reason: BurstRejection,

        /// Text of each capture in the window
        captures: Vec<String>,
    },
}

/// Verdicts for one input
///
/// A trailer may close a window, with a rejection, and then
/// report the end of message.
pub type Verdicts = ArrayVec<Verdict, 2>;

/// Majority-rule header validator
#[derive(Clone, Debug)]
pub struct Validator {
    // current burst window, if any
    window: Option<TimedData<Window>>,

    // burst window length, in samples
    burst_window: u64,

    // deadline for suppressing repeated trailers
    eom_suppress_until: Option<u64>,
}

impl Validator {
    /// New validator
    ///
    /// Burst windows are `burst_window` samples long.
    pub fn new(burst_window: u64) -> Self {
        Self {
            window: None,
            burst_window,
            eom_suppress_until: None,
        }
    }

    /// Reset to zero initial conditions
    ///
    /// Any open window is discarded without output.
    pub fn reset(&mut self) {
        self.window = None;
        self.eom_suppress_until = None;
    }

    /// Change the burst window length, in samples
    ///
    /// Takes effect for the next window.
    pub fn set_burst_window(&mut self, burst_window: u64) {
        self.burst_window = burst_window;
    }

    /// Number of captures in the open window
    pub fn pending(&self) -> usize {
        match &self.window {
            Some(w) => w.data.captures.len(),
            None => 0,
        }
    }

    /// Expire the burst window at time `now`
    ///
    /// Call this regularly, even when there are no new captures.
    /// If the window closed without a message, reports why.
    pub fn poll(&mut self, now: u64) -> Option<Verdict> {
        match &self.window {
            Some(w) if w.is_expired_at(now) => {
                debug!("validator: [{:<14}]: burst window expired", now);
                self.close()
            }
            _ => None,
        }
    }

    /// Handle a successful header capture
    pub fn input_header(&mut self, capture: FrameCapture) -> Verdicts {
        let mut out = Verdicts::new();

        let stale = match &self.window {
            Some(w) => w.is_expired_at(capture.start) || w.data.captures.is_full(),
            None => false,
        };
        if stale {
            out.extend(self.close());
        }

        if self.window.is_none() {
            self.eom_suppress_until = None;
        }

        let burst_window = self.burst_window;
        let window = self.window.get_or_insert_with(|| {
            debug!("validator: [{:<14}]: burst window opened", capture.start);
            TimedData::with_deadline(Window::default(), capture.start + burst_window)
        });

        let text = capture.text.clone();
        if window.data.captures.push_back(capture).is_err() {
            // full windows were closed above
            return out;
        }

        if window.data.accepted {
            debug!("validator: absorbed repeat: \"{}\"", text);
            return out;
        }

        let agreeing = window
            .data
            .captures
            .iter()
            .filter(|cap| cap.text == text)
            .count();
        if agreeing >= 2 {
            window.data.accepted = true;
            match ValidatedMessage::with_agreement(text, agreeing) {
                Ok(msg) => {
                    info!("validator: accepted ({} agree): \"{}\"", agreeing, msg);
                    out.push(Verdict::Accepted(msg));
                }
                Err(err) => {
                    warn!("validator: agreed text is not a header: {}", err);
                }
            }
        } else if window.data.captures.is_full() {
            out.extend(self.close());
        }

        out
    }

    /// Handle an end-of-message trailer
    pub fn input_trailer(&mut self, capture: FrameCapture) -> Verdicts {
        let mut out = Verdicts::new();
        out.extend(self.close());

        match self.eom_suppress_until {
            Some(until) if capture.start < until => {
                debug!("validator: repeated end of message");
            }
            _ => {
                info!("validator: [{:<14}]: end of message", capture.start);
                self.eom_suppress_until = Some(capture.start + self.burst_window);
                out.push(Verdict::EndOfMessage);
            }
        }

        out
    }

    // Close the burst window
    //
    // Reports a rejection if the window never agreed.
    fn close(&mut self) -> Option<Verdict> {
        let window = self.window.take()?.data;
        if window.accepted || window.captures.is_empty() {
            return None;
        }

        let captures: Vec<String> = window.captures.into_iter().map(|cap| cap.text).collect();
        let reason = if captures.len() < 2 {
            BurstRejection::InsufficientCaptures(captures.len())
        } else {
            BurstRejection::Disagreement
        };

        warn!("validator: {}: {:?}", reason, captures);
        Some(Verdict::Rejected { reason, captures })
    }
}

// Captures in one burst window
#[derive(Clone, Debug)]
struct Window {
    captures: ArrayDeque<FrameCapture, 3, Saturating>,
    accepted: bool,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            captures: ArrayDeque::new(),
            accepted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 1000;
    const GOOD: &str = "ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-";
    const BAD_FIPS: &str = "ZCZC-WXR-RWT-020183+0030-1181230-KRAH/NWS-";
    const BAD_CALL: &str = "ZCZC-WXR-RWT-020103+0030-1181230-KRAX/NWS-";

    fn cap(text: &str, start: u64) -> FrameCapture {
        FrameCapture {
            text: text.to_owned(),
            start,
            end: start + 100,
        }
    }

    fn accepted(out: &[Verdict]) -> Option<&ValidatedMessage> {
        out.iter().find_map(|v| match v {
            Verdict::Accepted(msg) => Some(msg),
            _ => None,
        })
    }

    #[test]
    fn test_default_window() {
        assert_eq!(7524, DEFAULT_BURST_WINDOW_SYMBOLS);
        let secs = DEFAULT_BURST_WINDOW_SYMBOLS as f32 / waveform::BAUD_HZ;
        assert!(secs > 14.0 && secs < 15.0);
    }

    #[test]
    fn test_two_agree() {
        let mut val = Validator::new(WINDOW);
        assert!(val.input_header(cap(GOOD, 0)).is_empty());
        let out = val.input_header(cap(GOOD, 200));
        let msg = accepted(&out).expect("expected message");
        assert_eq!(GOOD, msg.as_str());
        assert_eq!(2, msg.agreeing_captures());

        // third is absorbed
        assert!(val.input_header(cap(GOOD, 400)).is_empty());
        assert_eq!(3, val.pending());

        // the window expires quietly
        assert!(val.poll(999).is_none());
        assert!(val.poll(1000).is_none());
        assert_eq!(0, val.pending());
    }

    #[test]
    fn test_two_of_three() {
        let mut val = Validator::new(WINDOW);
        assert!(val.input_header(cap(GOOD, 0)).is_empty());
        assert!(val.input_header(cap(BAD_FIPS, 200)).is_empty());
        let out = val.input_header(cap(GOOD, 400));
        let msg = accepted(&out).expect("expected message");
        assert_eq!(GOOD, msg.as_str());
        assert_eq!(2, msg.agreeing_captures());
    }

    #[test]
    fn test_all_disagree() {
        let mut val = Validator::new(WINDOW);
        assert!(val.input_header(cap(GOOD, 0)).is_empty());
        assert!(val.input_header(cap(BAD_FIPS, 200)).is_empty());
        let out = val.input_header(cap(BAD_CALL, 400));
        assert_eq!(
            out.as_slice(),
            &[Verdict::Rejected {
                reason: BurstRejection::Disagreement,
                captures: vec![GOOD.to_owned(), BAD_FIPS.to_owned(), BAD_CALL.to_owned()]
            }]
        );
        assert_eq!(0, val.pending());
    }

    #[test]
    fn test_single_capture_expires() {
        let mut val = Validator::new(WINDOW);
        assert!(val.input_header(cap(GOOD, 50)).is_empty());
        assert!(val.poll(1049).is_none());
        assert_eq!(
            Some(Verdict::Rejected {
                reason: BurstRejection::InsufficientCaptures(1),
                captures: vec![GOOD.to_owned()]
            }),
            val.poll(1050)
        );
        assert!(val.poll(5000).is_none());
    }

    #[test]
    fn test_late_capture_opens_window() {
        // captures from different windows never combine
        let mut val = Validator::new(WINDOW);
        assert!(val.input_header(cap(GOOD, 0)).is_empty());
        let out = val.input_header(cap(GOOD, 1000));
        assert!(accepted(&out).is_none());
        assert_eq!(
            out.as_slice(),
            &[Verdict::Rejected {
                reason: BurstRejection::InsufficientCaptures(1),
                captures: vec![GOOD.to_owned()]
            }]
        );
        assert_eq!(1, val.pending());
    }

    #[test]
    fn test_fourth_capture_opens_window() {
        let mut val = Validator::new(WINDOW);
        val.input_header(cap(GOOD, 0));
        val.input_header(cap(GOOD, 100));
        val.input_header(cap(GOOD, 200));
        assert_eq!(3, val.pending());
        assert!(val.input_header(cap(BAD_CALL, 300)).is_empty());
        assert_eq!(1, val.pending());
    }

    #[test]
    fn test_trailer() {
        let mut val = Validator::new(WINDOW);
        val.input_header(cap(GOOD, 0));
        val.input_header(cap(GOOD, 200));

        let out = val.input_trailer(cap("NNNN", 3000));
        assert_eq!(out.as_slice(), &[Verdict::EndOfMessage]);
        assert_eq!(0, val.pending());

        // repeats are suppressed
        assert!(val.input_trailer(cap("NNNN", 3100)).is_empty());
        assert!(val.input_trailer(cap("NNNN", 3200)).is_empty());

        // until the next window
        let out = val.input_trailer(cap("NNNN", 4000));
        assert_eq!(out.as_slice(), &[Verdict::EndOfMessage]);
    }

    #[test]
    fn test_trailer_after_next_message() {
        let mut val = Validator::new(WINDOW);
        val.input_header(cap(GOOD, 0));
        val.input_header(cap(GOOD, 200));
        let out = val.input_trailer(cap("NNNN", 400));
        assert_eq!(out.as_slice(), &[Verdict::EndOfMessage]);
        assert!(val.input_trailer(cap("NNNN", 500)).is_empty());

        // the next message arrives well within the window
        assert!(val.input_header(cap(BAD_CALL, 600)).is_empty());
        let out = val.input_header(cap(BAD_CALL, 700));
        assert_eq!(BAD_CALL, accepted(&out).expect("expected message").as_str());

        let out = val.input_trailer(cap("NNNN", 800));
        assert_eq!(out.as_slice(), &[Verdict::EndOfMessage]);
        assert!(val.input_trailer(cap("NNNN", 900)).is_empty());
        assert!(val.input_trailer(cap("NNNN", 1000)).is_empty());
    }

    #[test]
    fn test_trailer_after_failed_header() {
        // a lone header still begins a new message
        let mut val = Validator::new(WINDOW);
        assert_eq!(
            val.input_trailer(cap("NNNN", 0)).as_slice(),
            &[Verdict::EndOfMessage]
        );
        assert!(val.input_header(cap(GOOD, 100)).is_empty());
        let out = val.input_trailer(cap("NNNN", 200));
        assert_eq!(
            out.as_slice(),
            &[
                Verdict::Rejected {
                    reason: BurstRejection::InsufficientCaptures(1),
                    captures: vec![GOOD.to_owned()]
                },
                Verdict::EndOfMessage
            ]
        );
    }

    #[test]
    fn test_trailer_closes_unagreed_window() {
        let mut val = Validator::new(WINDOW);
        val.input_header(cap(BAD_FIPS, 0));
        let out = val.input_trailer(cap("NNNN", 100));
        assert_eq!(
            out.as_slice(),
            &[
                Verdict::Rejected {
                    reason: BurstRejection::InsufficientCaptures(1),
                    captures: vec![BAD_FIPS.to_owned()]
                },
                Verdict::EndOfMessage
            ]
        );
    }
}
