//! Discovery by enumerating search prefixes.

use tracing::{debug, info};

use crate::domain::next_prefix;
use crate::geocode::Resolver;
use crate::store::StationStore;
use crate::suggest::SuggestionSource;

use super::error::DiscoveryError;
use super::runner::{Step, Strategy};

/// Ledger name for this strategy.
pub const PREFIX_LEDGER: &str = "last_partial_city";

/// Sends every prefix, in odometer order, to the suggestion endpoint and
/// stores whatever comes back.
///
/// With a resolver attached, each new station's country is resolved before
/// it is stored.
pub struct PrefixWalk<'a, S> {
    source: &'a S,
    store: &'a StationStore,
    resolver: Option<&'a mut Resolver>,
    interactive: bool,
}

impl<'a, S: SuggestionSource> PrefixWalk<'a, S> {
    pub fn new(source: &'a S, store: &'a StationStore) -> Self {
        Self {
            source,
            store,
            resolver: None,
            interactive: false,
        }
    }

    pub fn with_resolver(mut self, resolver: &'a mut Resolver, interactive: bool) -> Self {
        self.resolver = Some(resolver);
        self.interactive = interactive;
        self
    }
}

impl<S: SuggestionSource> Strategy for PrefixWalk<'_, S> {
    async fn step(&mut self, checkpoint: &str) -> Result<Step, DiscoveryError> {
        let prefix =
            next_prefix(checkpoint).map_err(|e| DiscoveryError::checkpoint(checkpoint, e))?;

        let mut stations = self.source.suggest(&prefix).await;
        if let Some(resolver) = self.resolver.as_deref_mut() {
            for station in &mut stations {
                if station.country.is_some() || self.store.get(&station.id)?.is_some() {
                    continue;
                }
                station.country = resolver
                    .resolve(station.lat.degrees(), station.lng.degrees(), self.interactive)
                    .await;
            }
        }

        let stored = self.store.store(&stations)?;
        if stored > 0 {
            info!(prefix = %prefix, found = stations.len(), stored, "new stations");
        } else {
            debug!(prefix = %prefix, found = stations.len(), "no new stations");
        }

        Ok(Step::Advanced {
            checkpoint: prefix,
            stored,
        })
    }
}
