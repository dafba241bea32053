//! Suggestion endpoint response DTOs.
//!
//! These map directly to the JSON payload inside the `SLs.sls=...;` wrapper.
//! Every field is optional because the endpoint is an unreliable oracle and
//! a single malformed entry must not sink the whole response.

use serde::Deserialize;

/// The unwrapped suggestion payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<SuggestionDto>,
}

/// One suggested location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionDto {
    /// Display name, HTML-entity-encoded.
    pub value: Option<String>,

    /// Provider station ID.
    pub ext_id: Option<String>,

    /// Opaque location handle; not used for discovery.
    pub id: Option<String>,

    /// Latitude as degrees × 10^6.
    pub ycoord: Option<String>,

    /// Longitude as degrees × 10^6.
    pub xcoord: Option<String>,
}
