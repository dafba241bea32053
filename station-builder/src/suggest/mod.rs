//! Station suggestion endpoint client.
//!
//! Wraps the journey planner's "suggest stations by text prefix or ID"
//! endpoint. Every failure mode of the endpoint (HTTP errors, blocked
//! requests, non-JSON bodies) collapses into "no stations", which the
//! discovery strategies treat as an invalid unit of work.

mod client;
mod convert;
mod error;
mod types;

use std::future::Future;

use crate::domain::Station;

pub use client::{DEFAULT_USER_AGENT, Pacing, SuggestClient, SuggestClientConfig};
pub use convert::{convert_suggestion, decode_entities, parse_suggestions, strip_wrapper};
pub use error::SuggestError;
pub use types::{SuggestionDto, SuggestionsResponse};

/// Source of station suggestions.
///
/// Implementations never fail: errors are logged and reported as an empty
/// sequence.
pub trait SuggestionSource {
    /// Suggest stations for a free-text prefix or a 9-digit station ID.
    ///
    /// For an ID query, only a station carrying exactly that ID is returned.
    fn suggest(&self, query: &str) -> impl Future<Output = Vec<Station>>;
}
