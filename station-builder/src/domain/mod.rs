//! Domain types for the station database.
//!
//! Provider data is validated once, at the edge, into these types. Code that
//! receives a `StationId`, `Coordinate` or `CountryCode` can trust its shape.

mod coordinate;
mod country;
mod error;
mod prefix;
mod station;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use country::{CountryCode, InvalidCountryCode};
pub use error::DomainError;
pub use prefix::{InvalidPrefix, PREFIX_ALPHABET, next_prefix};
pub use station::{InvalidStationId, STATION_ID_WIDTH, Station, StationId, StoredStation};
