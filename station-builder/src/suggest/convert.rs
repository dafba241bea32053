//! Conversion from suggestion DTOs to domain stations.

use scraper::Html;
use tracing::warn;

use crate::domain::{Coordinate, DomainError, Station, StationId};

use super::error::SuggestError;
use super::types::{SuggestionDto, SuggestionsResponse};

/// JavaScript the endpoint wraps around its JSON payload.
const WRAPPER_PREFIX: &str = "SLs.sls=";
const WRAPPER_SUFFIX: &str = ";SLs.showSuggestion();";

/// Strip the JavaScript wrapper, if present, leaving the JSON payload.
pub fn strip_wrapper(body: &str) -> &str {
    let body = body.trim();
    let body = body.strip_prefix(WRAPPER_PREFIX).unwrap_or(body);
    body.strip_suffix(WRAPPER_SUFFIX).unwrap_or(body)
}

/// Parse a raw response body into stations.
///
/// Entries that fail validation are skipped with a warning. When `query` is
/// a numeric station ID, only suggestions carrying exactly that ID survive:
/// the endpoint also returns unrelated stations near the queried one.
pub fn parse_suggestions(body: &str, query: &str) -> Result<Vec<Station>, SuggestError> {
    let payload = strip_wrapper(body);
    let response: SuggestionsResponse =
        serde_json::from_str(payload).map_err(|e| SuggestError::Json {
            message: e.to_string(),
            body: Some(payload.chars().take(500).collect()),
        })?;

    let stations = response
        .suggestions
        .iter()
        .filter_map(|dto| match convert_suggestion(dto) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!(error = %e, "skipping malformed suggestion");
                None
            }
        })
        .collect();

    Ok(retain_queried_id(stations, query))
}

/// Convert a single suggestion into a station.
pub fn convert_suggestion(dto: &SuggestionDto) -> Result<Station, DomainError> {
    let name = dto.value.as_deref().ok_or(DomainError::MissingField("value"))?;
    let ext_id = dto.ext_id.as_deref().ok_or(DomainError::MissingField("extId"))?;
    let ycoord = dto.ycoord.as_deref().ok_or(DomainError::MissingField("ycoord"))?;
    let xcoord = dto.xcoord.as_deref().ok_or(DomainError::MissingField("xcoord"))?;

    Ok(Station {
        id: StationId::parse(ext_id)?,
        name: decode_entities(name),
        lat: Coordinate::from_fixed_point(ycoord)?,
        lng: Coordinate::from_fixed_point(xcoord)?,
        country: None,
    })
}

/// Decode HTML entities in a station name (`&#252;` → `ü`).
pub fn decode_entities(name: &str) -> String {
    let fragment = Html::parse_fragment(name);
    let decoded: String = fragment.root_element().text().collect();
    decoded.trim().to_string()
}

/// If `query` is a station ID, keep only stations with that exact ID.
fn retain_queried_id(stations: Vec<Station>, query: &str) -> Vec<Station> {
    let is_numeric = !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit());
    if !is_numeric {
        return stations;
    }

    match StationId::parse(query) {
        Ok(wanted) => stations.into_iter().filter(|s| s.id == wanted).collect(),
        // A numeric query too long to be an ID can't match anything.
        Err(_) => Vec::new(),
    }
}
