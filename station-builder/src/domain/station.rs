//! Station identifier and station record types.

use std::fmt;

use super::coordinate::Coordinate;
use super::country::CountryCode;

/// Width of a normalized station ID.
pub const STATION_ID_WIDTH: usize = 9;

/// Largest station ID that fits the fixed width.
const MAX_STATION_ID: u64 = 999_999_999;

/// Error returned when parsing an invalid station ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station ID: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A provider station ID, normalized to 9 zero-padded digits.
///
/// The suggestion endpoint hands out IDs of varying width ("8000105",
/// "000720001"). Normalizing to a fixed width makes string order equal
/// numeric order, so the store can sort IDs as text.
///
/// # Examples
///
/// ```
/// use station_builder::domain::StationId;
///
/// let id = StationId::parse("8000105").unwrap();
/// assert_eq!(id.as_str(), "008000105");
/// assert_eq!(id.next().unwrap().as_str(), "008000106");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("80a0105").is_err());
/// assert!(StationId::parse("1234567890").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    /// Parse a station ID from a string of ASCII digits.
    ///
    /// Surrounding whitespace is ignored. Inputs shorter than 9 digits are
    /// left-padded with zeros.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidStationId {
                reason: "must contain only ASCII digits",
            });
        }

        if s.len() > STATION_ID_WIDTH {
            return Err(InvalidStationId {
                reason: "must be at most 9 digits",
            });
        }

        Ok(StationId(format!("{:0>width$}", s, width = STATION_ID_WIDTH)))
    }

    /// Build a station ID from its numeric value.
    pub fn from_number(n: u64) -> Result<Self, InvalidStationId> {
        if n > MAX_STATION_ID {
            return Err(InvalidStationId {
                reason: "must be at most 9 digits",
            });
        }
        Ok(StationId(format!("{:0>width$}", n, width = STATION_ID_WIDTH)))
    }

    /// Returns the zero-padded ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the ID.
    pub fn value(&self) -> u64 {
        self.0
            .bytes()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'))
    }

    /// The numerically following ID, or `None` past `999999999`.
    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.value() + 1).ok()
    }

    /// The numerically preceding ID, or `None` below `000000000`.
    pub fn prev(&self) -> Option<Self> {
        self.value()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station as discovered through the suggestion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    /// HTML-entity-decoded display name.
    pub name: String,
    pub lat: Coordinate,
    pub lng: Coordinate,
    /// `None` until a backfill or a country-aware discovery resolves it.
    pub country: Option<CountryCode>,
}

/// A station row read back from the store.
///
/// Coordinates are stored as `REAL`, so they come back as plain degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredStation {
    pub id: StationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub country: Option<CountryCode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pads_short_ids() {
        assert_eq!(StationId::parse("8000105").unwrap().as_str(), "008000105");
        assert_eq!(StationId::parse("0").unwrap().as_str(), "000000000");
        assert_eq!(StationId::parse("000720001").unwrap().as_str(), "000720001");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(StationId::parse(" 100010 ").unwrap().as_str(), "000100010");
    }

    #[test]
    fn reject_invalid() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("   ").is_err());
        assert!(StationId::parse("-1").is_err());
        assert!(StationId::parse("12a").is_err());
        assert!(StationId::parse("1234567890").is_err());
    }

    #[test]
    fn next_and_prev() {
        let id = StationId::parse("000100009").unwrap();
        assert_eq!(id.next().unwrap().as_str(), "000100010");
        assert_eq!(id.prev().unwrap().as_str(), "000100008");
    }

    #[test]
    fn bounds() {
        assert!(StationId::parse("000000000").unwrap().prev().is_none());
        assert!(StationId::parse("999999999").unwrap().next().is_none());
        assert!(StationId::from_number(1_000_000_000).is_err());
    }

    #[test]
    fn value_roundtrip() {
        let id = StationId::parse("008000105").unwrap();
        assert_eq!(id.value(), 8_000_105);
        assert_eq!(StationId::from_number(id.value()).unwrap(), id);
    }

    #[test]
    fn text_order_matches_numeric_order() {
        let a = StationId::parse("99").unwrap();
        let b = StationId::parse("100").unwrap();
        assert!(a < b);
        assert!(a.value() < b.value());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::parse("720001").unwrap();
        assert_eq!(id.to_string(), "000720001");
        assert_eq!(format!("{:?}", id), "StationId(000720001)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any value in range survives a trip through the padded form.
        #[test]
        fn number_roundtrip(n in 0u64..=999_999_999) {
            let id = StationId::from_number(n).unwrap();
            prop_assert_eq!(id.as_str().len(), STATION_ID_WIDTH);
            prop_assert_eq!(id.value(), n);
            prop_assert_eq!(StationId::parse(id.as_str()).unwrap(), id);
        }

        /// Ordering of normalized IDs is numeric ordering.
        #[test]
        fn order_is_numeric(a in 0u64..=999_999_999, b in 0u64..=999_999_999) {
            let ia = StationId::from_number(a).unwrap();
            let ib = StationId::from_number(b).unwrap();
            prop_assert_eq!(ia.cmp(&ib), a.cmp(&b));
        }
    }
}
