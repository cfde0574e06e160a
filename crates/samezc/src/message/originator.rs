//! Originator code

use std::fmt;

use strum::EnumMessage;

/// SAME message originator code
///
/// See [ValidatedMessage::originator()](crate::ValidatedMessage::originator).
/// Originator codes are looked up from their SAME string
/// representations with [`from_code()`](Originator::from_code).
/// Displaying them shows a human-readable string.
///
/// The Weather Service variants are refined by the sending
/// station's callsign, which must be supplied too.
///
/// ```
/// use samezc::Originator;
///
/// let orig = Originator::from_code("CIV");
/// assert_eq!(Originator::CivilAuthority, orig);
/// assert_eq!("CIV", orig.as_str());
/// assert_eq!("Civil authorities", &format!("{}", orig));
///
/// assert_eq!(Originator::Unknown, Originator::from_code("ZZZ"));
///
/// let orig = Originator::from(("WXR", "KRAH/NWS"));
/// assert_eq!(Originator::NationalWeatherService, orig);
/// assert_eq!("WXR", orig.as_str());
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumString,
)]
pub enum Originator {
    /// An unrecognized originator code
    ///
    /// Per NWSI 10-172, receivers should accept any originator code.
    #[strum(serialize = "OOO", detailed_message = "Unknown Originator")]
    Unknown,

    /// Primary Entry Point station for national activations
    #[strum(serialize = "PEP", detailed_message = "Primary Entry Point System")]
    PrimaryEntryPoint,

    /// Civil authorities
    #[strum(serialize = "CIV", detailed_message = "Civil authorities")]
    CivilAuthority,

    /// National Weather Service or Environment Canada
    #[strum(serialize = "WXR", detailed_message = "Weather Service")]
    WeatherService,

    /// National Weather Service, by callsign
    #[strum(disabled, serialize = "WXR")]
    NationalWeatherService,

    /// Environment Canada, by callsign
    #[strum(disabled, serialize = "WXR")]
    EnvironmentCanada,

    /// EAS participant (usu. broadcast station)
    #[strum(
        serialize = "EAS",
        detailed_message = "Broadcast station or cable system"
    )]
    BroadcastStation,
}

impl Originator {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        match self {
            Originator::NationalWeatherService => "National Weather Service",
            Originator::EnvironmentCanada => "Environment Canada",
            _ => self.get_detailed_message().unwrap_or("Unknown Originator"),
        }
    }

    /// SAME string representation
    ///
    /// Returns the three-character SAME code for this
    /// `Originator`
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Originator from its SAME code
    ///
    /// Unrecognized codes are [`Originator::Unknown`]. The
    /// Weather Service is never refined without a callsign.
    pub fn from_code(code: &str) -> Originator {
        code.parse().unwrap_or(Originator::Unknown)
    }
}

impl From<(&str, &str)> for Originator {
    fn from(orig_and_call: (&str, &str)) -> Originator {
        let (orig, call) = orig_and_call;
        match Originator::from_code(orig) {
            Originator::WeatherService if call.ends_with("/NWS") => {
                Originator::NationalWeatherService
            }
            Originator::WeatherService if call.starts_with("EC/") => {
                Originator::EnvironmentCanada
            }
            other => other,
        }
    }
}

impl AsRef<str> for Originator {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Originator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_originator() {
        assert_eq!(Originator::PrimaryEntryPoint, Originator::from_code("PEP"));
        assert_eq!(Originator::BroadcastStation, Originator::from_code("EAS"));
        assert_eq!(Originator::WeatherService, Originator::from(("WXR", "KLOX")));
        assert_eq!(
            Originator::EnvironmentCanada,
            Originator::from(("WXR", "EC/GC/CA"))
        );
        assert_eq!(Originator::CivilAuthority, Originator::from(("CIV", "KRAH/NWS")));

        // disabled variants do not parse, but they do serialize
        assert_eq!(Originator::WeatherService, Originator::from_code("WXR"));
        assert_eq!("WXR", Originator::EnvironmentCanada.as_str());
        assert_eq!("Environment Canada", Originator::EnvironmentCanada.as_display_str());

        // unknown and malformed codes
        assert_eq!(Originator::Unknown, Originator::from_code("XYZ"));
        assert_eq!(Originator::Unknown, Originator::from_code(""));
        assert_eq!(Originator::Unknown, Originator::from_code("wxr"));
        assert_eq!(Originator::Unknown, Originator::from(("ZZZ", "KRAH/NWS")));

        // parsing still goes through the derived table
        assert_eq!(Ok(Originator::CivilAuthority), "CIV".parse::<Originator>());
        assert!(Originator::try_from("ZZZ").is_err());
    }
}
