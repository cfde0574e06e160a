//! Validated SAME messages

use std::convert::TryFrom;
use std::fmt;

#[cfg(feature = "chrono")]
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

mod originator;
mod significance;

pub use originator::Originator;
pub use significance::SignificanceLevel;

/// Error decoding a SAME header
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageDecodeErr {
    /// The starting prefix of the message was not recognized
    #[error("invalid SAME header: unrecognized prefix")]
    UnrecognizedPrefix,

    /// Header contains non-ASCII characters
    #[error("invalid SAME header: message contains non-ASCII characters")]
    NotAscii,

    /// Header is shorter than the minimum length for a valid message
    #[error("invalid SAME header: decoded message too short")]
    TooShort,

    /// Header does not match general format
    #[error("invalid SAME header: message text does not match required pattern")]
    Malformed,

    /// Header lists more location codes than the standard permits
    #[error("invalid SAME header: more than {} location codes", MAX_LOCATIONS)]
    TooManyLocations,

    /// Issue time is not a valid day of year and time of day
    #[error("invalid SAME header: issue time out of range")]
    InvalidIssueTime,

    /// Purge time is not a valid duration
    #[error("invalid SAME header: purge time out of range")]
    InvalidPurgeTime,
}

/// An invalid issuance time
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[error("message issuance time not valid for its receive time")]
pub struct InvalidDateErr {}

/// A SAME header which has passed validation
///
/// Every SAME header is transmitted three times. The decoder
/// emits a `ValidatedMessage` only when at least two of the
/// three transmissions agree exactly and the agreed text is a
/// well-formed header. An example header is
///
/// ```txt
/// ZCZC-WXR-RWT-020103-020209+0030-1181230-KRAH/NWS-
/// ```
///
/// The message is split into fields on demand. You can also
/// construct one directly from text, which is handy for tests
/// and replay:
///
/// ```
/// use samezc::{Originator, SignificanceLevel, ValidatedMessage};
///
/// let msg = ValidatedMessage::new("ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-")
///     .expect("bad header");
/// assert_eq!("WXR", msg.originator_str());
/// assert_eq!(Originator::NationalWeatherService, msg.originator());
/// assert_eq!("RWT", msg.event_str());
/// assert_eq!(SignificanceLevel::Test, msg.significance());
/// assert_eq!(vec!["020103"], msg.location_str_iter().collect::<Vec<_>>());
/// assert_eq!((0, 30), msg.valid_duration_fields());
/// assert_eq!((118, 12, 30), msg.issue_daytime_fields());
/// assert_eq!("KRAH/NWS", msg.callsign());
/// ```
///
/// More information on the SAME/EAS standard may be found in,
/// * "NOAA Weather Radio (NWR) All Hazards Specific Area Message
///   Encoding (SAME)," NWSI 10-172, 3 Oct. 2011,
///   <https://www.nws.noaa.gov/directives/sym/pd01017012curr.pdf>
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValidatedMessage {
    // message content, including the leading `ZCZC-`
    message: String,

    // where does the time field begin?
    // includes the leading plus character (`+`)
    offset_time: usize,

    // number of transmissions which agreed on this text
    agreeing_captures: usize,
}

impl ValidatedMessage {
    /// Try to construct a SAME header from `String`
    ///
    /// The `message` string must be a well-formed SAME header.
    /// If it does not, an error is returned. Trailing text after
    /// the header is discarded.
    pub fn new<S>(message: S) -> Result<Self, MessageDecodeErr>
    where
        S: Into<String>,
    {
        let mut message: String = message.into();
        if !message.is_ascii() {
            return Err(MessageDecodeErr::NotAscii);
        }

        let (offset_time, hdr_length) = check_header(&message)?;
        message.truncate(hdr_length);

        Ok(Self {
            message,
            offset_time,
            agreeing_captures: 1,
        })
    }

    /// Construct from text which `agreeing_captures` transmissions agreed on
    pub(crate) fn with_agreement<S>(
        message: S,
        agreeing_captures: usize,
    ) -> Result<Self, MessageDecodeErr>
    where
        S: Into<String>,
    {
        let mut out = Self::new(message)?;
        out.agreeing_captures = agreeing_captures;
        Ok(out)
    }

    /// Message text
    ///
    /// Returns the ASCII representation of the header, from
    /// `ZCZC` to the trailing `-`.
    pub fn as_str(&self) -> &str {
        &self.message
    }

    /// Originator code
    ///
    /// The ultimate source of the message, such as
    /// `Originator::WeatherService` for the National Weather Service
    pub fn originator(&self) -> Originator {
        Originator::from((self.originator_str(), self.callsign()))
    }

    /// Originator code (as string)
    ///
    /// A three-character string that is usually one of the
    /// following:
    ///
    /// - `PEP`: Primary Entry Point Station. Generally only
    ///   used for national activations, which are very rare.
    ///
    /// - `CIV`: Civil authorities (usu. state and local government)
    ///
    /// - `WXR`: National Weather Service or Environment Canada
    ///
    /// - `EAS`: EAS Participant. Usually a broadcast station.
    ///
    /// The originator code returned is three uppercase letters
    /// but is not guaranteed to be one of the above.
    pub fn originator_str(&self) -> &str {
        &self.message[Self::OFFSET_ORG..Self::OFFSET_ORG + 3]
    }

    /// Event code
    ///
    /// A three-character code which is *generally* formatted
    /// according to severity level.
    ///
    /// - `xxT`: Test
    /// - `xxS`: Statement / Advisory
    /// - `xxA`: Watch
    /// - `xxW`: Warning (generally most severe events)
    ///
    /// Major exceptions to this are the codes `SVR`
    /// ("Severe Thunderstorm Warning") and `TOR`
    /// ("Tornado Warning").
    pub fn event_str(&self) -> &str {
        &self.message[Self::OFFSET_EVT..Self::OFFSET_EVT + 3]
    }

    /// Significance level, from the event code's last letter
    ///
    /// Event codes which do not follow the convention, like
    /// `TOR`, report [`SignificanceLevel::Unknown`]. Treat
    /// those as warnings.
    pub fn significance(&self) -> SignificanceLevel {
        SignificanceLevel::from_code(&self.event_str()[2..3])
    }

    /// Iterator over location codes
    ///
    /// Returns an iterator over the location codes in the
    /// message. Location codes are six-digit strings of
    /// the form `PSSCCC`:
    ///
    /// - `P`: part of county, or zero for entire county
    /// - `SS`: FIPS State code
    /// - `CCC`: FIPS County code
    ///
    /// Locations are returned in the order listed in the
    /// message. Iterator values are guaranteed to be
    /// six-digit strings, and there are at most 31 of them.
    /// Either `-` or `+` may separate them.
    pub fn location_str_iter<'m>(&'m self) -> std::str::Split<'m, &'static [char]> {
        let locations = &self.message[Self::OFFSET_AREA_START..self.offset_time];
        locations.split(LOCATION_SEPARATORS)
    }

    /// Purge time (as string)
    ///
    /// The four-digit `TTTT` field, as `HHMM`.
    pub fn purge_time_str(&self) -> &str {
        &self.message[self.offset_time + Self::OFFSET_FROMPLUS_VALIDTIME
            ..self.offset_time + Self::OFFSET_FROMPLUS_VALIDTIME + 4]
    }

    /// Message validity duration
    ///
    /// Returns the message validity duration or "purge time."
    /// This is a tuple of (`hours`, `minutes`).
    ///
    /// This field represents the validity time of the *message*
    /// and not the expected duration of the severe condition.
    /// The valid duration is relative to the
    /// [`issue_daytime_fields()`](#method.issue_daytime_fields).
    pub fn valid_duration_fields(&self) -> (u8, u8) {
        let dur = self.purge_time_str().as_bytes();
        (two_digits(&dur[0..2]), two_digits(&dur[2..4]))
    }

    /// Message validity duration (Duration)
    ///
    /// The message is valid until
    ///
    /// ```ignore
    /// msg.issue_datetime(&now).unwrap() + msg.valid_duration()
    /// ```
    ///
    /// Requires `chrono`.
    #[cfg(feature = "chrono")]
    pub fn valid_duration(&self) -> Duration {
        let (hrs, mins) = self.valid_duration_fields();
        Duration::hours(hrs as i64) + Duration::minutes(mins as i64)
    }

    /// Issue time (as string)
    ///
    /// The seven-digit `JJJHHMM` field.
    pub fn issue_time_str(&self) -> &str {
        &self.message[self.offset_time + Self::OFFSET_FROMPLUS_ISSUETIME
            ..self.offset_time + Self::OFFSET_FROMPLUS_ISSUETIME + 7]
    }

    /// Message issuance day/time (fields)
    ///
    /// Returns the message issue day and time, from the string
    /// `JJJHHMM`, as (`day`, `hour`, `minute`).
    ///
    /// - `JJJ`: Ordinal day of the year. `001` represents 1 Jan.,
    ///   and `365` represents 31 Dec. in non leap-years. During
    ///   leap-years, `366` represents 31 Dec.
    ///
    /// - `HHMM`: UTC time of day, using a 24-hour time scale.
    pub fn issue_daytime_fields(&self) -> (u16, u8, u8) {
        issue_fields(self.issue_time_str())
    }

    /// Estimated message issuance datetime (UTC)
    ///
    /// Computes the datetime that the SAME message was *issued*
    /// from the time that the message was `received`, which
    /// must be provided. SAME headers do not include the year of
    /// issuance. As long as `received` is within ±90 days of true
    /// UTC, the output time will be correct.
    ///
    /// An error is returned if the issue day does not exist in
    /// the inferred year, such as day 366 of a non-leap year.
    ///
    /// Requires `chrono`.
    #[cfg(feature = "chrono")]
    pub fn issue_datetime(
        &self,
        received: &DateTime<Utc>,
    ) -> Result<DateTime<Utc>, InvalidDateErr> {
        calculate_issue_time(
            self.issue_daytime_fields(),
            (received.year(), received.ordinal()),
        )
    }

    /// Is the message expired?
    ///
    /// Given the current time, determine if this message has
    /// expired. It is assumed that `now` is within twelve
    /// hours of the message issuance time.
    ///
    /// Requires `chrono`.
    #[cfg(feature = "chrono")]
    pub fn is_expired_at(&self, now: &DateTime<Utc>) -> bool {
        match self.issue_datetime(now) {
            Ok(issue_ts) => issue_ts + self.valid_duration() < *now,
            Err(_e) => false,
        }
    }

    /// Sending station callsign
    ///
    /// The `LLLLLLLL` field: the FCC or other regulatory
    /// body-assigned callsign of the sending station. Minus
    /// signs (`-`) in the callsign are sent as slashes (`/`).
    pub fn callsign(&self) -> &str {
        let end = self.message.len();
        &self.message[self.offset_time + Self::OFFSET_FROMPLUS_CALLSIGN
            ..end - Self::OFFSET_FROMEND_CALLSIGN_END]
    }

    /// Number of transmissions which agreed on this message
    ///
    /// Two or three for messages from the decoder. Messages
    /// built with [`new()`](#method.new) report one.
    pub fn agreeing_captures(&self) -> usize {
        self.agreeing_captures
    }

    /// Obtain the owned message String
    pub fn release(self) -> String {
        self.message
    }

    const OFFSET_ORG: usize = 5;
    const OFFSET_EVT: usize = 9;
    const OFFSET_AREA_START: usize = 13;
    const OFFSET_FROMPLUS_VALIDTIME: usize = 1;
    const OFFSET_FROMPLUS_ISSUETIME: usize = 6;
    const OFFSET_FROMPLUS_CALLSIGN: usize = 14;
    const OFFSET_FROMEND_CALLSIGN_END: usize = 1;
}

impl fmt::Display for ValidatedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl AsRef<str> for ValidatedMessage {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<ValidatedMessage> for String {
    #[inline]
    fn from(msg: ValidatedMessage) -> String {
        msg.release()
    }
}

impl TryFrom<String> for ValidatedMessage {
    type Error = MessageDecodeErr;

    #[inline]
    fn try_from(inp: String) -> Result<Self, Self::Error> {
        Self::new(inp)
    }
}

/// Header prefix
pub(crate) const PREFIX_MESSAGE_START: &str = "ZCZC";

/// Trailer prefix
pub(crate) const PREFIX_MESSAGE_END: &str = "NNNN";

// Per NWSI 10-172
const MAX_LOCATIONS: usize = 31;

// Between location codes
const LOCATION_SEPARATORS: &[char] = &['-', '+'];

// "ZCZC-ORG-EEE-PSSCCC+TTTT-JJJHHMM-L-"
const MIN_HEADER_LENGTH: usize = 35;

// Check message header for format compliance
//
// The header must split into fields correctly, and the
// numeric fields must be in range. Returns tuple of
//
// 1. start position of the purge time field, at the `+`.
// 2. total length of the header. The `hdr` may be longer.
pub(crate) fn check_header(hdr: &str) -> Result<(usize, usize), MessageDecodeErr> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"^ZCZC-[A-Z]{3}-[A-Z]{3}(-[0-9]{6}(?:[-+][0-9]{6})*)(\+([0-9]{4})-([0-9]{7})-[^-]{1,8}-)"
        )
        .expect("bad SAME regexp");
    }

    if !hdr.starts_with(PREFIX_MESSAGE_START) {
        return Err(MessageDecodeErr::UnrecognizedPrefix);
    }

    if hdr.len() < MIN_HEADER_LENGTH {
        return Err(MessageDecodeErr::TooShort);
    }

    let caps = RE.captures(hdr).ok_or(MessageDecodeErr::Malformed)?;
    let locations = caps.get(1).ok_or(MessageDecodeErr::Malformed)?;
    let tail = caps.get(2).ok_or(MessageDecodeErr::Malformed)?;
    let purge = caps.get(3).ok_or(MessageDecodeErr::Malformed)?;
    let issue = caps.get(4).ok_or(MessageDecodeErr::Malformed)?;

    // each location is seven bytes, with its leading separator
    if locations.as_str().len() / 7 > MAX_LOCATIONS {
        return Err(MessageDecodeErr::TooManyLocations);
    }

    if two_digits(&purge.as_str().as_bytes()[2..4]) >= 60 {
        return Err(MessageDecodeErr::InvalidPurgeTime);
    }

    let (day, hour, minute) = issue_fields(issue.as_str());
    if day < 1 || day > 366 || hour >= 24 || minute >= 60 {
        return Err(MessageDecodeErr::InvalidIssueTime);
    }

    Ok((tail.start(), tail.end()))
}

// Parse two ASCII digits
//
// The caller has already matched them against `[0-9]`.
fn two_digits(digits: &[u8]) -> u8 {
    (digits[0] - b'0') * 10 + (digits[1] - b'0')
}

// Parse `JJJHHMM` into (day, hour, minute)
fn issue_fields(issue: &str) -> (u16, u8, u8) {
    let issue = issue.as_bytes();
    let day = (issue[0] - b'0') as u16 * 100 + two_digits(&issue[1..3]) as u16;
    (day, two_digits(&issue[3..5]), two_digits(&issue[5..7]))
}

// Calculate message issuance time
//
// Calculate Utc datetime of message issuance from the
// fields encoded into the `message` and a local estimate
// of when the message was `received`.
#[cfg(feature = "chrono")]
fn calculate_issue_time(
    message: (u16, u8, u8),
    received: (i32, u32),
) -> Result<DateTime<Utc>, InvalidDateErr> {
    let (day_of_year, hour, minute) = message;
    let (rx_year, rx_day_of_year) = received;

    let daydiff = rx_day_of_year as i32 - day_of_year as i32;
    let msg_year = if daydiff >= 180 {
        // the UTC new year has arrived and the message is
        // from next year
        rx_year.saturating_add(1)
    } else if daydiff <= -180 {
        // we have received a message from last UTC year
        rx_year.saturating_sub(1)
    } else {
        rx_year
    };

    let naive = NaiveDate::from_yo_opt(msg_year, day_of_year as u32)
        .ok_or(InvalidDateErr {})?
        .and_hms_opt(hour as u32, minute as u32, 0)
        .ok_or(InvalidDateErr {})?;
    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_header() {
        const INVALID_SHORT: &str = "ZCZC-ORG-EEE-012345+0000-0011122-";
        const VALID_ONE: &str = "ZCZC-ORG-EEE-012345+0000-0011122-NOCALL00-";
        const VALID_TWO: &str = "ZCZC-ORG-EEE-012345-567890+0000-0011122-NOCALL00-garbage";
        const VALID_SHORT_CALL: &str = "ZCZC-ORG-EEE-012345+0000-0011122-ABC-";
        const VALID_ONE_CHAR_CALL: &str = "ZCZC-ORG-EEE-012345+0000-0011122-K-";
        const VALID_PLUS: &str = "ZCZC-ORG-EEE-012345+567890+0000-0011122-NOCALL00-";
        const VALID_MIXED: &str = "ZCZC-ORG-EEE-012345-567890+888990+0000-0011122-NOCALL00-";

        assert_eq!(Err(MessageDecodeErr::TooShort), check_header(INVALID_SHORT));
        assert_eq!(
            Err(MessageDecodeErr::UnrecognizedPrefix),
            check_header("NNNN")
        );

        assert_eq!(Ok((19, 42)), check_header(VALID_ONE));
        assert_eq!(VALID_ONE.as_bytes()[19], b'+');

        assert_eq!(Ok((26, 49)), check_header(VALID_TWO));
        assert_eq!(VALID_TWO.as_bytes()[26], b'+');

        assert_eq!(Ok((19, 37)), check_header(VALID_SHORT_CALL));
        assert_eq!(Ok((19, 35)), check_header(VALID_ONE_CHAR_CALL));

        // locations may also be joined by `+`
        assert_eq!(Ok((26, 49)), check_header(VALID_PLUS));
        assert_eq!(VALID_PLUS.as_bytes()[26], b'+');
        assert_eq!(Ok((33, 56)), check_header(VALID_MIXED));
        assert_eq!(VALID_MIXED.as_bytes()[33], b'+');
    }

    #[test]
    fn test_check_header_malformed() {
        // lowercase originator
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-wxr-RWT-020103+0030-1181230-KRAH/NWS-")
        );

        // five-digit location
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT-02010+0030-1181230-KRAH/NWS-")
        );

        // callsign contains a dash
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT-020103+0030-1181230-KR-AH-")
        );

        // callsign longer than eight characters
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWSX-")
        );

        // empty callsign
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT-020103+0030-1181230--AAAA")
        );

        // location list starts with `+`
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT+020103+0030-1181230-KRAH/NWS-")
        );

        // truncated before the callsign
        assert_eq!(
            Err(MessageDecodeErr::Malformed),
            check_header("ZCZC-WXR-RWT-020103+0030-1181230-KRAH")
        );
    }

    #[test]
    fn test_check_header_ranges() {
        assert_eq!(
            Err(MessageDecodeErr::InvalidPurgeTime),
            check_header("ZCZC-WXR-RWT-020103+0060-1181230-KRAH/NWS-")
        );
        assert_eq!(
            Err(MessageDecodeErr::InvalidIssueTime),
            check_header("ZCZC-WXR-RWT-020103+0030-0001230-KRAH/NWS-")
        );
        assert_eq!(
            Err(MessageDecodeErr::InvalidIssueTime),
            check_header("ZCZC-WXR-RWT-020103+0030-3671230-KRAH/NWS-")
        );
        assert_eq!(
            Err(MessageDecodeErr::InvalidIssueTime),
            check_header("ZCZC-WXR-RWT-020103+0030-1182430-KRAH/NWS-")
        );
        assert_eq!(
            Err(MessageDecodeErr::InvalidIssueTime),
            check_header("ZCZC-WXR-RWT-020103+0030-1181260-KRAH/NWS-")
        );
        assert!(check_header("ZCZC-WXR-RWT-020103+0600-3662359-KRAH/NWS-").is_ok());

        // 31 locations are fine, 32 are not
        let mut hdr = String::from("ZCZC-WXR-RWT");
        for i in 0..31 {
            hdr.push_str(&format!("-{:06}", i));
        }
        hdr.push_str("+0030-1181230-KRAH/NWS-");
        assert!(check_header(&hdr).is_ok());

        let mut hdr = String::from("ZCZC-WXR-RWT");
        for i in 0..32 {
            hdr.push_str(&format!("-{:06}", i));
        }
        hdr.push_str("+0030-1181230-KRAH/NWS-");
        assert_eq!(Err(MessageDecodeErr::TooManyLocations), check_header(&hdr));

        let mut hdr = String::from("ZCZC-WXR-RWT-000000");
        for i in 1..32 {
            hdr.push_str(&format!("+{:06}", i));
        }
        hdr.push_str("+0030-1181230-KRAH/NWS-");
        assert_eq!(Err(MessageDecodeErr::TooManyLocations), check_header(&hdr));
    }

    #[test]
    #[cfg(feature = "chrono")]
    fn test_calculate_issue_time() {
        let d = calculate_issue_time((83, 2, 53), (2021, 1)).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2021, 3, 24, 2, 53, 0).unwrap());

        // close to the current year
        let d = calculate_issue_time((1, 10, 00), (2021, 1)).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2021, 1, 1, 10, 0, 0).unwrap());

        // bumps to next year
        let d = calculate_issue_time((1, 10, 00), (2021, 365)).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2022, 1, 1, 10, 0, 0).unwrap());

        // reverts to previous year, with leap year support
        let d = calculate_issue_time((366, 10, 00), (2021, 1)).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2020, 12, 31, 10, 0, 0).unwrap());

        // but not if the year we propagate into is not a leap year
        calculate_issue_time((366, 10, 00), (1971, 364)).expect_err("should not succeed");
    }

    #[test]
    fn test_message() {
        const THREE_LOCATIONS: &str = "ZCZC-WXR-RWT-012345-567890-888990+0351-3662322-NOCALL00-@@@";

        let msg = ValidatedMessage::with_agreement(THREE_LOCATIONS, 3).expect("bad msg");

        assert_eq!(msg.as_str(), &THREE_LOCATIONS[0..56]);
        assert_eq!(msg.originator_str(), "WXR");
        assert_eq!(Originator::WeatherService, msg.originator());
        assert_eq!(msg.event_str(), "RWT");
        assert_eq!(msg.significance(), SignificanceLevel::Test);
        assert_eq!(msg.purge_time_str(), "0351");
        assert_eq!(msg.valid_duration_fields(), (3, 51));
        assert_eq!(msg.issue_time_str(), "3662322");
        assert_eq!(msg.issue_daytime_fields(), (366, 23, 22));
        assert_eq!(msg.callsign(), "NOCALL00");
        assert_eq!(msg.agreeing_captures(), 3);

        let loc: Vec<&str> = msg.location_str_iter().collect();
        assert_eq!(loc.as_slice(), &["012345", "567890", "888990"]);

        #[cfg(feature = "chrono")]
        {
            assert_eq!(
                Utc.with_ymd_and_hms(2020, 12, 31, 23, 22, 0).unwrap(),
                msg.issue_datetime(&Utc.with_ymd_and_hms(2020, 12, 31, 11, 30, 34).unwrap())
                    .unwrap()
            );
            assert_eq!(
                msg.valid_duration(),
                Duration::hours(3) + Duration::minutes(51)
            );
            assert!(!msg.is_expired_at(&Utc.with_ymd_and_hms(2021, 1, 1, 3, 13, 0).unwrap()));
            assert!(msg.is_expired_at(&Utc.with_ymd_and_hms(2021, 1, 1, 3, 13, 1).unwrap()));
        }

        assert_eq!(&THREE_LOCATIONS[0..56], &format!("{}", msg));
        assert_eq!(String::from(msg), &THREE_LOCATIONS[0..56]);
    }

    #[test]
    fn test_message_plus_locations() {
        let msg = ValidatedMessage::new("ZCZC-WXR-RWT-020103+020105+0030-1181230-KRAH/NWS-")
            .expect("bad msg");
        let loc: Vec<&str> = msg.location_str_iter().collect();
        assert_eq!(loc.as_slice(), &["020103", "020105"]);
        assert_eq!(msg.purge_time_str(), "0030");
        assert_eq!(msg.issue_time_str(), "1181230");
        assert_eq!(msg.callsign(), "KRAH/NWS");
        assert_eq!(Originator::NationalWeatherService, msg.originator());

        let msg = ValidatedMessage::new("ZCZC-CIV-EVI-020103-020105+020107+0100-1181230-K-")
            .expect("bad msg");
        let loc: Vec<&str> = msg.location_str_iter().collect();
        assert_eq!(loc.as_slice(), &["020103", "020105", "020107"]);
        assert_eq!(msg.valid_duration_fields(), (1, 0));
        assert_eq!(msg.callsign(), "K");
        assert_eq!(SignificanceLevel::Unknown, msg.significance());
    }

    #[test]
    fn test_not_ascii() {
        assert_eq!(
            Err(MessageDecodeErr::NotAscii),
            ValidatedMessage::new("ZCZC-WXR-RWT-020103+0030-1181230-KRAH/NWS-\u{00e9}")
        );
    }
}
