//! Country backfill over stored stations.

use tracing::{debug, info};

use crate::domain::{CountryCode, StationId};
use crate::geocode::{Resolver, in_germany_boxes};
use crate::store::StationStore;

use super::error::DiscoveryError;
use super::runner::{Step, Strategy};

/// Attaches a country to stored stations that lack one, one per step.
///
/// The checkpoint is the last station looked at, and only lives for the
/// run: stations left unresolved are retried by the next run. Points in the
/// static German boxes are settled without any lookup.
pub struct CountryBackfill<'a> {
    store: &'a StationStore,
    resolver: &'a mut Resolver,
    interactive: bool,
}

impl<'a> CountryBackfill<'a> {
    pub fn new(store: &'a StationStore, resolver: &'a mut Resolver, interactive: bool) -> Self {
        Self {
            store,
            resolver,
            interactive,
        }
    }
}

impl Strategy for CountryBackfill<'_> {
    async fn step(&mut self, checkpoint: &str) -> Result<Step, DiscoveryError> {
        let after = if checkpoint.is_empty() {
            None
        } else {
            Some(
                StationId::parse(checkpoint)
                    .map_err(|e| DiscoveryError::checkpoint(checkpoint, e))?,
            )
        };

        let Some(station) = self.store.next_without_country(after.as_ref())? else {
            return Ok(Step::Exhausted);
        };

        let country = if in_germany_boxes(station.lat, station.lng) {
            Some(CountryCode::DE)
        } else {
            self.resolver
                .resolve(station.lat, station.lng, self.interactive)
                .await
        };

        let updated = match country {
            Some(code) => {
                let changed = self.store.backfill_country(&station.id, code)?;
                info!(station_id = %station.id, name = %station.name, country = %code, "country set");
                usize::from(changed)
            }
            None => {
                debug!(station_id = %station.id, name = %station.name, "country unresolved");
                0
            }
        };

        Ok(Step::Advanced {
            checkpoint: station.id.to_string(),
            stored: updated,
        })
    }
}
