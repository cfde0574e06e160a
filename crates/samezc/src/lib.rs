//! # samezc: zero-crossing SAME decoder
//!
//! This crate provides a lightweight decoder for
//! [Specific Area Message Encoding](https://en.wikipedia.org/wiki/Specific_Area_Message_Encoding)
//! (SAME). It detects SAME headers in an audio signal and reports
//! them to the caller once they have been validated.
//!
//! The decoder measures tone frequencies by counting zero
//! crossings. It has no filters, no automatic gain control, and
//! no equalizer, and it never attempts to repair a damaged
//! header. A header is reported only when two of its three
//! transmissions agree character for character.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! This crate has not been certified as a weather radio receiver or for any
//! other purpose. The author **strongly discourages** its use in any
//! safety-critical applications. Always have at least two methods available
//! for receiving weather alerts.
//!
//! ## Example
//!
//! You will first need to recover *baseband audio* from a radio or
//! television station which broadcasts SAME signals. Obtaining the
//! audio is beyond the scope of this crate. If you have a stereo
//! signal, mix to mono first. Scale the samples to the range
//! `[-1.0, 1.0]`; for `i16` audio, divide by 32768.
//!
//! ```
//! use samezc::{DecoderBuilder, EventKind};
//!
//! # let some_audio_source = || vec![0.0f32; 22050];
//! #
//! // create a SameDecoder with your audio sampling rate
//! let mut decoder = DecoderBuilder::new(22050)
//!     .with_noise_floor(0.01)       // silence threshold, fraction of full scale
//!     .with_min_preamble_bytes(8)   // preamble bytes required before ZCZC
//!     .build()
//!     .expect("bad configuration");
//!
//! // push blocks of audio, in order, as they arrive
//! let block = some_audio_source();
//! decoder.push_samples(&block, 22050).expect("bad sampling rate");
//!
//! for evt in decoder.events() {
//!     match evt.what() {
//!         EventKind::Message(hdr) => {
//!             println!("begin SAME voice message: {}", hdr);
//!         }
//!         EventKind::EndOfMessage => {
//!             println!("end SAME voice message");
//!         }
//!         _ => {}
//!     }
//! }
//!
//! // at the end of a recording, flush out the last burst
//! decoder.flush();
//! assert_eq!(0, decoder.events().count());
//! ```
//!
//! The decoder is created via a
//! [builder](struct.DecoderBuilder.html). Each decoder owns all
//! of its state; decode independent audio streams with
//! independent decoders.
//!
//! An example header, as received "off the wire" in ASCII format, is:
//!
//! ```txt
//! ZCZC-WXR-RWT-012345-567890-888990+0015-0321115-KLOX/NWS-
//! ```
//!
//! Fields are available from the
//! [`ValidatedMessage`](struct.ValidatedMessage.html):
//!
//! ```
//! use samezc::{Originator, SignificanceLevel, ValidatedMessage};
//!
//! let hdr = ValidatedMessage::new(
//!     "ZCZC-WXR-RWT-012345-567890-888990+0015-0321115-KLOX/NWS-"
//! ).expect("fail to parse");
//!
//! // what organization originated the message?
//! assert_eq!(Originator::NationalWeatherService, hdr.originator());
//!
//! // event codes carry a "significance level" in their last letter
//! assert_eq!("RWT", hdr.event_str());
//! assert_eq!(SignificanceLevel::Test, hdr.significance());
//! assert!(SignificanceLevel::Test < SignificanceLevel::Warning);
//!
//! // location codes are accessed by iterator
//! let first_location = hdr.location_str_iter().next();
//! assert_eq!(Some("012345"), first_location);
//! ```
//!
//! ## Background
//!
//! SAME is commonly used to distribute weather alerts in the United States and
//! Canada. SAME headers are modulated using two-level audio frequency-shift
//! keying (AFSK) and sent at a baud rate of 520.83 Hz. The mark tone, for a
//! binary one, is 2083.3 Hz. The space tone, for a binary zero, is 1562.5 Hz.
//!
//! Every header is preceded by sixteen bytes of `0xAB` preamble and is
//! transmitted three times, with about one second of silence between
//! transmissions. The voice message which follows is ended by three
//! transmissions of `NNNN`.
//!
//! ## Crate features
//!
//! * `chrono`: Use chrono to calculate message
//!   [issuance times](struct.ValidatedMessage.html#method.issue_datetime)
//!   and other fields as true UTC timestamps. If enabled, `chrono`
//!   becomes part of this crate's public API.
//!

#![allow(dead_code)]

mod builder;
mod message;
mod receiver;
mod waveform;

pub use builder::{ConfigurationError, DecoderBuilder};
pub use message::{
    InvalidDateErr, MessageDecodeErr, Originator, SignificanceLevel, ValidatedMessage,
};
pub use receiver::{BurstRejection, CaptureError, DecoderEvent, EventKind, SameDecoder};
