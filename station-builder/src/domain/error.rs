//! Domain error types.
//!
//! These errors represent validation failures of provider data in the
//! domain layer. They are distinct from network and storage errors.

use super::{InvalidCoordinate, InvalidCountryCode, InvalidPrefix, InvalidStationId};

/// Domain-level validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    StationId(#[from] InvalidStationId),

    #[error(transparent)]
    Coordinate(#[from] InvalidCoordinate),

    #[error(transparent)]
    CountryCode(#[from] InvalidCountryCode),

    #[error(transparent)]
    Prefix(#[from] InvalidPrefix),

    /// A suggestion is missing a field every station needs
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryCode, StationId};

    #[test]
    fn error_display() {
        let err = DomainError::MissingField("extId");
        assert_eq!(err.to_string(), "missing field: extId");

        let err: DomainError = StationId::parse("").unwrap_err().into();
        assert_eq!(err.to_string(), "invalid station ID: must not be empty");

        let err: DomainError = CountryCode::parse("DEU").unwrap_err().into();
        assert_eq!(
            err.to_string(),
            "invalid country code: must be exactly 2 characters"
        );
    }
}
