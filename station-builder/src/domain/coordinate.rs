//! Fixed-point coordinate decoding.
//!
//! The suggestion endpoint encodes latitude and longitude as signed integer
//! strings holding degrees × 10^6, with no decimal point and no guaranteed
//! zero-padding: `"49872503"` is 49.872503°, `"-87740"` is -0.087740°.

use std::fmt;

/// Number of implied decimal digits in the raw encoding.
const DECIMALS: usize = 6;

/// Error returned when a raw coordinate is not a signed integer string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {raw:?}: {reason}")]
pub struct InvalidCoordinate {
    raw: String,
    reason: &'static str,
}

/// A decimal-degree coordinate decoded from the fixed-point encoding.
///
/// Keeps the decimal text exactly as decoded (always six fractional digits)
/// alongside its numeric value.
///
/// # Examples
///
/// ```
/// use station_builder::domain::Coordinate;
///
/// assert_eq!(Coordinate::from_fixed_point("49872503").unwrap().as_str(), "49.872503");
/// assert_eq!(Coordinate::from_fixed_point("-87740").unwrap().as_str(), "-0.087740");
/// assert_eq!(Coordinate::from_fixed_point("5").unwrap().as_str(), "0.000005");
/// ```
#[derive(Clone, PartialEq)]
pub struct Coordinate {
    text: String,
    degrees: f64,
}

impl Coordinate {
    /// Decode a raw fixed-point string.
    ///
    /// The sign is kept apart from the magnitude, the magnitude is padded to
    /// at least six digits, and the decimal point goes six digits from the
    /// right. An empty integer part becomes `"0"`.
    pub fn from_fixed_point(raw: &str) -> Result<Self, InvalidCoordinate> {
        let trimmed = raw.trim();
        let (negative, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        if magnitude.is_empty() {
            return Err(InvalidCoordinate {
                raw: raw.to_string(),
                reason: "missing digits",
            });
        }
        if !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidCoordinate {
                raw: raw.to_string(),
                reason: "must be a signed integer",
            });
        }

        let padded = format!("{:0>width$}", magnitude, width = DECIMALS);
        let (int_part, frac_part) = padded.split_at(padded.len() - DECIMALS);
        let int_part = if int_part.is_empty() { "0" } else { int_part };
        let sign = if negative { "-" } else { "" };

        let text = format!("{sign}{int_part}.{frac_part}");
        let degrees = text.parse::<f64>().map_err(|_| InvalidCoordinate {
            raw: raw.to_string(),
            reason: "out of range",
        })?;

        Ok(Self { text, degrees })
    }

    /// The decimal-degree text, e.g. `"49.872503"`.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The coordinate in degrees.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Re-encode as a fixed-point integer string.
    ///
    /// Leading zeros of the magnitude are dropped, so this is the canonical
    /// form of the raw value `from_fixed_point` accepted.
    pub fn to_fixed_point(&self) -> String {
        let (sign, magnitude) = match self.text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", self.text.as_str()),
        };
        let digits: String = magnitude.chars().filter(|c| *c != '.').collect();
        let digits = digits.trim_start_matches('0');
        let digits = if digits.is_empty() { "0" } else { digits };
        format!("{sign}{digits}")
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({})", self.text)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> String {
        Coordinate::from_fixed_point(raw).unwrap().as_str().to_string()
    }

    #[test]
    fn full_width_values() {
        assert_eq!(decode("49872503"), "49.872503");
        assert_eq!(decode("8624521"), "8.624521");
        assert_eq!(decode("-3703790"), "-3.703790");
    }

    #[test]
    fn short_magnitudes_get_zero_integer_part() {
        assert_eq!(decode("498758"), "0.498758");
        assert_eq!(decode("87740"), "0.087740");
        assert_eq!(decode("0"), "0.000000");
    }

    #[test]
    fn negative_padding_applies_to_magnitude() {
        assert_eq!(decode("-87740"), "-0.087740");
        assert_eq!(decode("-5"), "-0.000005");
        assert_ne!(decode("-87740"), "-0.87740");
    }

    #[test]
    fn degrees_match_text() {
        let c = Coordinate::from_fixed_point("-87740").unwrap();
        assert_eq!(c.degrees(), -0.08774);
        let c = Coordinate::from_fixed_point("49872503").unwrap();
        assert_eq!(c.degrees(), 49.872503);
    }

    #[test]
    fn reject_malformed() {
        assert!(Coordinate::from_fixed_point("").is_err());
        assert!(Coordinate::from_fixed_point("-").is_err());
        assert!(Coordinate::from_fixed_point("49.87").is_err());
        assert!(Coordinate::from_fixed_point("+4987").is_err());
        assert!(Coordinate::from_fixed_point("12x4").is_err());
    }

    #[test]
    fn reencode() {
        assert_eq!(Coordinate::from_fixed_point("-87740").unwrap().to_fixed_point(), "-87740");
        assert_eq!(Coordinate::from_fixed_point("00498758").unwrap().to_fixed_point(), "498758");
        assert_eq!(Coordinate::from_fixed_point("0").unwrap().to_fixed_point(), "0");
    }
}
