//! ISO 3166-1 alpha-2 country codes.

use std::fmt;

/// Error returned when parsing an invalid country code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid country code: {reason}")]
pub struct InvalidCountryCode {
    reason: &'static str,
}

/// A two-letter ISO 3166-1 alpha-2 country code, stored uppercase.
///
/// # Examples
///
/// ```
/// use station_builder::domain::CountryCode;
///
/// assert_eq!(CountryCode::parse("de").unwrap().as_str(), "DE");
/// assert!(CountryCode::parse("DEU").is_err());
/// assert!(CountryCode::parse("D1").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Germany, the country the static bounding boxes approximate.
    pub const DE: CountryCode = CountryCode(*b"DE");

    /// Parse a country code, accepting either case.
    pub fn parse(s: &str) -> Result<Self, InvalidCountryCode> {
        let bytes = s.trim().as_bytes();

        if bytes.len() != 2 {
            return Err(InvalidCountryCode {
                reason: "must be exactly 2 characters",
            });
        }

        if !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(InvalidCountryCode {
                reason: "must be ASCII letters",
            });
        }

        Ok(CountryCode([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.as_str())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
