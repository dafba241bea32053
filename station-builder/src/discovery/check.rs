//! Re-resolution of stored countries.

use tracing::{debug, warn};

use crate::domain::{CountryCode, StationId};
use crate::geocode::{Resolver, in_germany_boxes};
use crate::store::StationStore;

use super::error::DiscoveryError;
use super::runner::{Step, Strategy};

/// Walks the stations that already have a country and resolves each one
/// again, one per step. Nothing is written; disagreements are logged and
/// counted.
///
/// Like the backfill, the checkpoint only lives for the run.
pub struct CountryCheck<'a> {
    store: &'a StationStore,
    resolver: &'a mut Resolver,
    checked: u64,
    mismatched: u64,
}

impl<'a> CountryCheck<'a> {
    pub fn new(store: &'a StationStore, resolver: &'a mut Resolver) -> Self {
        Self {
            store,
            resolver,
            checked: 0,
            mismatched: 0,
        }
    }

    /// Stations whose fresh resolution was conclusive.
    pub fn checked(&self) -> u64 {
        self.checked
    }

    /// Stations whose stored country disagrees with the fresh resolution.
    pub fn mismatched(&self) -> u64 {
        self.mismatched
    }
}

impl Strategy for CountryCheck<'_> {
    async fn step(&mut self, checkpoint: &str) -> Result<Step, DiscoveryError> {
        let after = if checkpoint.is_empty() {
            None
        } else {
            Some(
                StationId::parse(checkpoint)
                    .map_err(|e| DiscoveryError::checkpoint(checkpoint, e))?,
            )
        };

        let Some(station) = self.store.next_with_country(after.as_ref())? else {
            return Ok(Step::Exhausted);
        };

        let agrees = if in_germany_boxes(station.lat, station.lng) {
            let agrees = station.country == Some(CountryCode::DE);
            if !agrees {
                warn!(station_id = %station.id, stored = ?station.country, "station inside the German boxes stored elsewhere");
            }
            Some(agrees)
        } else {
            self.resolver.check(&station).await
        };

        match agrees {
            Some(agrees) => {
                self.checked += 1;
                if !agrees {
                    self.mismatched += 1;
                }
            }
            None => debug!(station_id = %station.id, "check inconclusive"),
        }

        Ok(Step::Advanced {
            checkpoint: station.id.to_string(),
            stored: 0,
        })
    }
}
