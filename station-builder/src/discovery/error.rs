//! Discovery error types.

use crate::domain::DomainError;
use crate::geocode::GeocodeError;
use crate::ledger::LedgerError;
use crate::store::StoreError;
use crate::suggest::SuggestError;

/// Errors that end a discovery run.
///
/// Provider failures never show up here: they are absorbed by the
/// suggestion client and the resolver. What remains is storage trouble,
/// an unreadable checkpoint and failures setting a session up.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The stored checkpoint does not fit the strategy
    #[error("unusable checkpoint {checkpoint:?}: {source}")]
    Checkpoint {
        checkpoint: String,
        source: DomainError,
    },

    #[error("failed to set up suggestion client: {0}")]
    Suggest(#[from] SuggestError),

    #[error("failed to set up geocoding: {0}")]
    Geocode(#[from] GeocodeError),
}

impl DiscoveryError {
    pub(crate) fn checkpoint(checkpoint: &str, source: impl Into<DomainError>) -> Self {
        Self::Checkpoint {
            checkpoint: checkpoint.to_string(),
            source: source.into(),
        }
    }
}
