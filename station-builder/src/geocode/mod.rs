//! Country lookup for station coordinates.
//!
//! A [`Resolver`] polls several [`CountryService`]s and accepts a country
//! once two of them agree. Offline lookups are cheap but unreliable near
//! borders; online services are accurate but rate limited.

mod error;
mod geonames;
mod labels;
mod local;
mod nominatim;
mod rate_limit;
mod region;
mod resolver;

pub use error::GeocodeError;
pub use geonames::{GeoNamesService, parse_geonames};
pub use labels::{CountryLabels, HeadlessPrompt, LabelPrompt, TerminalPrompt};
pub use local::LocalGeocoder;
pub use nominatim::{NominatimPlace, NominatimService, parse_nominatim};
pub use rate_limit::RateLimiter;
pub use region::{BoundingBox, GERMANY_BOXES, in_germany_boxes};
pub use resolver::{QUORUM, Resolver};

pub mod limits {
    //! Default hourly request budgets.
    pub use super::geonames::DEFAULT_HOURLY_LIMIT as GEONAMES_HOURLY;
    pub use super::nominatim::DEFAULT_HOURLY_LIMIT as NOMINATIM_HOURLY;
}

use futures::future::BoxFuture;

use crate::domain::CountryCode;

/// What one service says about a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// An ISO alpha-2 code.
    Code(CountryCode),
    /// A free-text country name that still needs mapping to a code.
    Label(String),
    /// The service knows nothing about the point.
    NotFound,
    /// The service refused for now; try again after a cooldown.
    RateLimited,
}

/// Which pool a service is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Local,
    Online,
}

/// A single reverse-geocoding source.
///
/// Lookups take `&mut self` so services can keep their own request budget.
pub trait CountryService: Send {
    fn name(&self) -> &'static str;

    fn kind(&self) -> ServiceKind;

    fn lookup(&mut self, lat: f64, lng: f64) -> BoxFuture<'_, Result<Lookup, GeocodeError>>;
}
