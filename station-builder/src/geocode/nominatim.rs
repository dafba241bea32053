//! OpenStreetMap Nominatim search (JSON).

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;

use super::error::GeocodeError;
use super::rate_limit::RateLimiter;
use super::{CountryService, Lookup, ServiceKind};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search.php";

/// Well below Nominatim's one-request-per-second ceiling.
pub const DEFAULT_HOURLY_LIMIT: usize = 3000;

/// Nominatim's usage policy allows one request per second.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

const SERVICE: &str = "nominatim";

/// One search hit. Only the display address is used.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub display_name: Option<String>,
}

/// Reverse geocoding through a Nominatim coordinate search.
///
/// Returns the country as a free-text label (the last component of the
/// display address, in whatever language the server picks), which the
/// resolver maps to a code through the label cache.
pub struct NominatimService {
    http: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl NominatimService {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        hourly_limit: usize,
    ) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            limiter: RateLimiter::per_hour(hourly_limit).with_min_interval(MIN_INTERVAL),
        })
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch(&self, lat: f64, lng: f64) -> Result<Lookup, GeocodeError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", format!("{lat} {lng}")), ("format", "jsonv2".to_string())])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(Lookup::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        parse_nominatim(&body)
    }
}

impl CountryService for NominatimService {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::Online
    }

    fn lookup(&mut self, lat: f64, lng: f64) -> BoxFuture<'_, Result<Lookup, GeocodeError>> {
        async move {
            if !self.limiter.acquire().await {
                return Ok(Lookup::RateLimited);
            }
            self.fetch(lat, lng).await
        }
        .boxed()
    }
}

/// Extract the country label from a `jsonv2` search response.
pub fn parse_nominatim(body: &str) -> Result<Lookup, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Shape {
            service: SERVICE,
            message: e.to_string(),
        })?;

    let Some(first) = places.first() else {
        return Ok(Lookup::NotFound);
    };

    let address = first
        .display_name
        .as_deref()
        .ok_or_else(|| GeocodeError::Shape {
            service: SERVICE,
            message: "missing display_name".to_string(),
        })?;

    let country = address.rsplit(',').next().unwrap_or_default().trim();
    if country.is_empty() {
        return Err(GeocodeError::Shape {
            service: SERVICE,
            message: format!("no country in {address:?}"),
        });
    }

    Ok(Lookup::Label(country.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_address_component() {
        let body = r#"[{"place_id":123,"display_name":"Hauptbahnhof, Gutleutviertel, Frankfurt am Main, Hessen, 60329, Deutschland","category":"railway"}]"#;
        assert_eq!(
            parse_nominatim(body).unwrap(),
            Lookup::Label("Deutschland".to_string())
        );
    }

    #[test]
    fn single_component_address() {
        let body = r#"[{"display_name":"Österreich"}]"#;
        assert_eq!(
            parse_nominatim(body).unwrap(),
            Lookup::Label("Österreich".to_string())
        );
    }

    #[test]
    fn empty_result_is_not_found() {
        assert_eq!(parse_nominatim("[]").unwrap(), Lookup::NotFound);
    }

    #[test]
    fn unexpected_shapes_are_errors() {
        assert!(parse_nominatim(r#"{"error":"Unable to geocode"}"#).is_err());
        assert!(parse_nominatim(r#"[{"lat":"50.1"}]"#).is_err());
        assert!(parse_nominatim(r#"[{"display_name":"Frankfurt, "}]"#).is_err());
        assert!(parse_nominatim("<html>").is_err());
    }

    #[tokio::test]
    async fn spent_budget_skips_request() {
        let mut service = NominatimService::new("test", Duration::from_secs(1), 0)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        assert_eq!(service.kind(), ServiceKind::Online);
        assert_eq!(service.lookup(50.0, 8.0).await.unwrap(), Lookup::RateLimited);
    }

    #[tokio::test(start_paused = true)]
    async fn lookups_are_a_second_apart() {
        let mut service = NominatimService::new("test", Duration::from_secs(1), 10)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        let start = tokio::time::Instant::now();
        let _ = service.lookup(50.0, 8.0).await;
        let _ = service.lookup(50.0, 8.0).await;
        assert!(start.elapsed() >= MIN_INTERVAL);
    }
}
