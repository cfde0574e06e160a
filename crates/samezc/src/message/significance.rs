//! Significance level

use std::fmt;

use strum::EnumMessage;

/// SAME message significance level
///
/// Three-letter SAME event codes often use the last letter to
/// indicate *significance* or severity.
///
/// | Code    | Significance                                      |
/// |---------|---------------------------------------------------|
/// | `xxT`   | [test](crate::SignificanceLevel::Test)            |
/// | `xxM`   | [message](crate::SignificanceLevel::Message)      |
/// | `xxS`   | [statement](crate::SignificanceLevel::Statement)  |
/// | `xxE`   | [emergency](crate::SignificanceLevel::Emergency)  |
/// | `xxA`   | [watch](crate::SignificanceLevel::Watch)          |
/// | `xxW`   | [warning](crate::SignificanceLevel::Warning)      |
///
/// ```
/// use samezc::SignificanceLevel;
///
/// assert_eq!(SignificanceLevel::Watch, SignificanceLevel::from_code("A"));
/// assert_eq!("Test", format!("{}", SignificanceLevel::Test));
/// assert_eq!("T", format!("{:#}", SignificanceLevel::Test));
/// ```
///
/// Significance levels are `Ord`. Unrecognized levels are
/// [`SignificanceLevel::Unknown`], which sorts above a warning.
///
/// ```
/// # use samezc::SignificanceLevel;
/// assert!(SignificanceLevel::Test < SignificanceLevel::Warning);
/// assert!(SignificanceLevel::from_code("R") >= SignificanceLevel::Warning);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
)]
#[repr(u8)]
pub enum SignificanceLevel {
    /// Test
    #[strum(serialize = "T", detailed_message = "Test")]
    Test,

    /// Message
    #[strum(serialize = "M", detailed_message = "Message")]
    Message,

    /// Statement
    ///
    /// Follow up information to a warning, watch, or emergency
    #[strum(serialize = "S", detailed_message = "Statement")]
    Statement,

    /// Emergency
    #[strum(serialize = "E", detailed_message = "Emergency")]
    Emergency,

    /// Watch
    #[strum(serialize = "A", detailed_message = "Watch")]
    Watch,

    /// Warning
    #[strum(serialize = "W", detailed_message = "Warning")]
    Warning,

    /// Unknown significance level
    ///
    /// Clients are strongly advised to treat unknown-significance
    /// messages as [`SignificanceLevel::Warning`].
    #[default]
    #[strum(serialize = "", detailed_message = "Warning")]
    Unknown,
}

impl SignificanceLevel {
    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().unwrap_or("Warning")
    }

    /// SAME string representation
    ///
    /// Returns the one-character SAME code for this
    /// `SignificanceLevel`.
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Significance level from its one-character SAME code
    ///
    /// Unrecognized codes are [`SignificanceLevel::Unknown`].
    pub fn from_code(code: &str) -> SignificanceLevel {
        code.parse().unwrap_or_default()
    }
}

impl AsRef<str> for SignificanceLevel {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for SignificanceLevel {
    /// Printable string
    ///
    /// * The normal form is a human-readable string like "`Statement`"
    /// * The alternate form is a one-character string like "`S`"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(SignificanceLevel::Test, SignificanceLevel::from_code("T"));
        assert_eq!(SignificanceLevel::Warning, SignificanceLevel::from_code("W"));
        assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from_code("Q"));
        assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from_code("w"));
        assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from_code(""));

        assert_eq!("A", SignificanceLevel::Watch.as_code_str());
        assert_eq!(Ok(SignificanceLevel::Emergency), "E".parse::<SignificanceLevel>());
        assert!(SignificanceLevel::try_from("Q").is_err());
    }
}
