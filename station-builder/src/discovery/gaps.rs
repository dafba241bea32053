//! Discovery by walking the numeric neighbourhood of known IDs.
//!
//! IDs are handed out in locally contiguous blocks, so the numbers next to
//! a known station are good candidates even when no prefix search ever
//! surfaced them. Each step takes the first stored ID past the checkpoint
//! (the anchor) and the one after it (the upper bound), walks down from
//! the anchor and up towards the bound, and stops each walk at the first
//! ID the endpoint does not know.

use tracing::{debug, info};

use crate::domain::{Station, StationId};
use crate::store::StationStore;
use crate::suggest::SuggestionSource;

use super::error::DiscoveryError;
use super::runner::{Step, Strategy};

/// Ledger name for this strategy.
pub const GAP_LEDGER: &str = "last_station_id";

pub struct GapWalk<'a, S> {
    source: &'a S,
    store: &'a StationStore,
}

impl<'a, S: SuggestionSource> GapWalk<'a, S> {
    pub fn new(source: &'a S, store: &'a StationStore) -> Self {
        Self { source, store }
    }

    /// The station carrying exactly `id`, if the endpoint returns only it.
    async fn fetch_exact(&self, id: &StationId) -> Option<Station> {
        let mut found = self.source.suggest(id.as_str()).await;
        if found.len() != 1 {
            debug!(station_id = %id, matches = found.len(), "not a single match");
            return None;
        }
        found.pop().filter(|s| s.id == *id)
    }

    /// Walk down from `anchor`, staying above `floor`.
    async fn walk_down(&self, anchor: &StationId, floor: Option<&StationId>) -> Vec<Station> {
        let mut found = Vec::new();
        let mut candidate = anchor.prev();
        while let Some(id) = candidate
            && floor.is_none_or(|f| id > *f)
        {
            let Some(station) = self.fetch_exact(&id).await else {
                break;
            };
            found.push(station);
            candidate = id.prev();
        }
        found
    }

    /// Walk up from `anchor` towards `upper`.
    ///
    /// Returns the stations found and the highest ID reached: `upper` when
    /// the walk closed the gap, else the last valid ID (or the anchor).
    async fn walk_up(&self, anchor: &StationId, upper: &StationId) -> (Vec<Station>, StationId) {
        let mut found = Vec::new();
        let mut reached = anchor.clone();
        let mut candidate = anchor.next();
        while let Some(id) = candidate {
            if id == *upper {
                reached = id;
                break;
            }
            let Some(station) = self.fetch_exact(&id).await else {
                break;
            };
            found.push(station);
            candidate = id.next();
            reached = id;
        }
        (found, reached)
    }
}

impl<S: SuggestionSource> Strategy for GapWalk<'_, S> {
    async fn step(&mut self, checkpoint: &str) -> Result<Step, DiscoveryError> {
        let last = parse_checkpoint(checkpoint)?;

        let ahead = self.store.ids_after(last.as_ref(), 2)?;
        let [anchor, upper] = ahead.as_slice() else {
            debug!(checkpoint, known = ahead.len(), "no gap left to walk");
            return Ok(Step::Exhausted);
        };

        let mut batch = self.walk_down(anchor, last.as_ref()).await;
        let (up, reached) = self.walk_up(anchor, upper).await;
        batch.extend(up);

        // Written only now, so a dropped step leaves nothing behind.
        let stored = self.store.store(&batch)?;
        info!(
            anchor = %anchor,
            upper = %upper,
            reached = %reached,
            found = batch.len(),
            stored,
            "walked gap"
        );

        Ok(Step::Advanced {
            checkpoint: reached.to_string(),
            stored,
        })
    }
}

/// An empty checkpoint means "before the first ID".
fn parse_checkpoint(checkpoint: &str) -> Result<Option<StationId>, DiscoveryError> {
    if checkpoint.trim().is_empty() {
        return Ok(None);
    }
    StationId::parse(checkpoint)
        .map(Some)
        .map_err(|e| DiscoveryError::checkpoint(checkpoint, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_parsing() {
        assert_eq!(parse_checkpoint("").unwrap(), None);
        assert_eq!(
            parse_checkpoint("100005").unwrap(),
            Some(StationId::parse("000100005").unwrap())
        );
        assert!(parse_checkpoint("hrb").is_err());
    }
}
