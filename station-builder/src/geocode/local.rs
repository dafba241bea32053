//! Offline country lookup.

use futures::FutureExt;
use futures::future::BoxFuture;
use geo::{HaversineDistance, Point};
use reverse_geocoder::ReverseGeocoder;
use tracing::debug;

use crate::domain::CountryCode;

use super::error::GeocodeError;
use super::{CountryService, Lookup, ServiceKind};

/// Points farther than this from the nearest known place get no vote.
const MAX_NEAREST_METRES: f64 = 100_000.0;

/// Country of the nearest populated place in the bundled GeoNames dataset.
///
/// Fast and free, but a station right at a border can be closer to a town
/// on the other side, so this only ever casts one vote.
pub struct LocalGeocoder {
    places: ReverseGeocoder,
    max_distance: f64,
}

impl LocalGeocoder {
    /// Build the k-d tree over the bundled places. Takes a moment; build once.
    pub fn new() -> Self {
        Self {
            places: ReverseGeocoder::new(),
            max_distance: MAX_NEAREST_METRES,
        }
    }

    /// Synchronous lookup.
    pub fn locate(&self, lat: f64, lng: f64) -> Lookup {
        let nearest = self.places.search((lat, lng)).record;
        let distance =
            Point::new(lng, lat).haversine_distance(&Point::new(nearest.lon, nearest.lat));
        if distance > self.max_distance {
            debug!(lat, lng, nearest = %nearest.name, distance, "no place nearby");
            return Lookup::NotFound;
        }

        CountryCode::parse(&nearest.cc).map_or(Lookup::NotFound, Lookup::Code)
    }
}

impl Default for LocalGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CountryService for LocalGeocoder {
    fn name(&self) -> &'static str {
        "local"
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::Local
    }

    fn lookup(&mut self, lat: f64, lng: f64) -> BoxFuture<'_, Result<Lookup, GeocodeError>> {
        let result = self.locate(lat, lng);
        async move { Ok(result) }.boxed()
    }
}
