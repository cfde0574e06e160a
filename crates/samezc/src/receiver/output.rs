use thiserror::Error;

use crate::message::{MessageDecodeErr, ValidatedMessage};

/// Decoder output event
///
/// Events are queued by
/// [`SameDecoder::push_samples()`](crate::SameDecoder::push_samples)
/// and retrieved with
/// [`SameDecoder::events()`](crate::SameDecoder::events). Each
/// event is stamped with the lifetime count of input samples at
/// the moment it occurred.
///
/// Only [`Message`](EventKind::Message) and
/// [`EndOfMessage`](EventKind::EndOfMessage) are reported by
/// default. The rest are diagnostics, which must be enabled
/// with
/// [`DecoderBuilder::with_diagnostics()`](crate::DecoderBuilder::with_diagnostics).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecoderEvent {
    what: EventKind,
    input_sample_counter: u64,
}

impl DecoderEvent {
    /// Create from event and time
    pub(crate) fn new(what: EventKind, input_sample_counter: u64) -> Self {
        Self {
            what,
            input_sample_counter,
        }
    }

    /// The event which triggered the output
    pub fn what(&self) -> &EventKind {
        &self.what
    }

    /// Event time, measured in input samples
    ///
    /// Reports the "time" of the event using a monotonic count
    /// of input samples.
    pub fn input_sample_counter(&self) -> u64 {
        self.input_sample_counter
    }

    /// Validated message, if any
    pub fn message(&self) -> Option<&ValidatedMessage> {
        match &self.what {
            EventKind::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// Consume event, returning the validated message, if any
    pub fn into_message(self) -> Option<ValidatedMessage> {
        match self.what {
            EventKind::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// True for diagnostic events
    pub fn is_diagnostic(&self) -> bool {
        self.what.is_diagnostic()
    }
}

impl From<DecoderEvent> for Option<ValidatedMessage> {
    fn from(evt: DecoderEvent) -> Self {
        evt.into_message()
    }
}

impl std::fmt::Display for DecoderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:<14}]: {}", self.input_sample_counter, self.what)
    }
}

/// Type of event
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    /// A validated SAME header
    ///
    /// At least two of the transmissions in one burst window
    /// agreed. Reported once per burst window.
    Message(ValidatedMessage),

    /// The `NNNN` end-of-message marker
    ///
    /// The voice message which followed the last header is
    /// over. Repeats of the marker are reported once.
    EndOfMessage,

    /// Diagnostic: one header transmission could not be read
    CaptureFailed {
        /// Why it failed
        reason: CaptureError,

        /// Captured text, which may be garbage
        raw_text: String,
    },

    /// Diagnostic: a burst window closed without a message
    BurstRejected {
        /// Why it was rejected
        reason: BurstRejection,

        /// Text of each capture in the window
        captures: Vec<String>,
    },
}

impl EventKind {
    /// True for diagnostic events
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            EventKind::CaptureFailed { .. } | EventKind::BurstRejected { .. }
        )
    }
}

impl AsRef<str> for EventKind {
    fn as_ref(&self) -> &str {
        match self {
            EventKind::Message(_) => "message",
            EventKind::EndOfMessage => "end of message",
            EventKind::CaptureFailed { .. } => "capture failed",
            EventKind::BurstRejected { .. } => "burst rejected",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Message(msg) => write!(
                f,
                "{}: ({} of 3 agree) \"{}\"",
                self.as_ref(),
                msg.agreeing_captures(),
                msg
            ),
            EventKind::EndOfMessage => write!(f, "{}", self.as_ref()),
            EventKind::CaptureFailed { reason, raw_text } => {
                write!(f, "{}: {}: \"{}\"", self.as_ref(), reason, raw_text)
            }
            EventKind::BurstRejected { reason, captures } => {
                write!(f, "{}: {}: {:?}", self.as_ref(), reason, captures)
            }
        }
    }
}

/// Why a header transmission was discarded
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaptureError {
    /// The captured text is not a well-formed SAME header
    #[error("frame grammar violation: {0}")]
    Grammar(#[from] MessageDecodeErr),

    /// The capture ran longer than a maximum-length header
    #[error("capture timeout")]
    Timeout,
}

/// Why a burst window produced no message
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BurstRejection {
    /// Three captures, no two of which agree
    #[error("burst validation failure: no two captures agree")]
    Disagreement,

    /// Not enough captures before the window closed
    #[error("burst validation failure: only {0} capture(s)")]
    InsufficientCaptures(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let msg = ValidatedMessage::with_agreement("ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-", 2)
            .expect("bad msg");
        let evt = DecoderEvent::new(EventKind::Message(msg.clone()), 42);
        assert_eq!(
            "[42            ]: message: (2 of 3 agree) \"ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-\"",
            &format!("{}", evt)
        );
        assert!(!evt.is_diagnostic());
        assert_eq!(Some(msg), evt.into_message());

        let evt = DecoderEvent::new(
            EventKind::CaptureFailed {
                reason: CaptureError::from(MessageDecodeErr::TooShort),
                raw_text: "ZCZC-".to_owned(),
            },
            0,
        );
        assert!(evt.is_diagnostic());
        assert_eq!(None, evt.message());
        assert_eq!(
            "capture failed: frame grammar violation: invalid SAME header: decoded message too short: \"ZCZC-\"",
            &format!("{}", evt.what())
        );
    }
}
