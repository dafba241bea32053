//! GeoNames nearby-place lookup (XML).

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use scraper::{Html, Selector};

use crate::domain::CountryCode;

use super::error::GeocodeError;
use super::rate_limit::RateLimiter;
use super::{CountryService, Lookup, ServiceKind};

const DEFAULT_BASE_URL: &str = "https://www.geonames.org/findNearbyPlaceName";

/// GeoNames allows 1000 requests per hour per IP.
pub const DEFAULT_HOURLY_LIMIT: usize = 1000;

/// GeoNames status codes that mean a credit limit was hit.
const LIMIT_STATUS_CODES: [&str; 3] = ["18", "19", "20"];

const SERVICE: &str = "geonames";

/// Reverse geocoding through GeoNames' `findNearbyPlaceName`.
pub struct GeoNamesService {
    http: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
}

impl GeoNamesService {
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
            limiter: RateLimiter::per_hour(hourly_limit),
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
            .query(&[("lat", lat.to_string()), ("lng", lng.to_string())])
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
        parse_geonames(&body)
    }
}

impl CountryService for GeoNamesService {
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

/// Extract the country from a `findNearbyPlaceName` document.
///
/// ```xml
/// <geonames>
///   <geoname><name>Frankfurt am Main</name><countryCode>DE</countryCode></geoname>
/// </geonames>
/// ```
///
/// The document is read with the HTML5 parser, which is lenient enough for
/// these small responses but not an XML parser:
///
/// - element names are folded to lower case, so selectors are lower case;
/// - `<status .../>` and other self-closing tags stay open, so later
///   siblings end up nested inside them. Attributes still parse, and every
///   lookup below matches descendants, so the nesting does not matter.
pub fn parse_geonames(body: &str) -> Result<Lookup, GeocodeError> {
    let document = Html::parse_document(body);

    // Checked first: an error document may still carry a geoname.
    let status = selector("status")?;
    if let Some(value) = document
        .select(&status)
        .next()
        .and_then(|el| el.value().attr("value"))
    {
        if LIMIT_STATUS_CODES.contains(&value) {
            return Ok(Lookup::RateLimited);
        }
        return Err(GeocodeError::Shape {
            service: SERVICE,
            message: format!("status {value}"),
        });
    }

    let geoname = selector("geoname")?;
    let Some(place) = document.select(&geoname).next() else {
        return Ok(Lookup::NotFound);
    };

    let country_code = selector("countrycode")?;
    let raw = place
        .select(&country_code)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| GeocodeError::Shape {
            service: SERVICE,
            message: "missing countryCode".to_string(),
        })?;

    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Lookup::NotFound);
    }

    Ok(match CountryCode::parse(raw) {
        Ok(code) => Lookup::Code(code),
        Err(_) => Lookup::Label(raw.to_string()),
    })
}

fn selector(css: &'static str) -> Result<Selector, GeocodeError> {
    Selector::parse(css).map_err(|e| GeocodeError::Shape {
        service: SERVICE,
        message: format!("bad selector {css}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRANKFURT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<geonames>
<geoname>
<toponymName>Frankfurt am Main</toponymName>
<name>Frankfurt am Main</name>
<lat>50.11552</lat>
<lng>8.68417</lng>
<geonameId>2925533</geonameId>
<countryCode>DE</countryCode>
<countryName>Germany</countryName>
<fcl>P</fcl>
<fcode>PPLA2</fcode>
<distance>1.62826</distance>
</geoname>
</geonames>"#;

    #[test]
    fn parses_country_code() {
        let lookup = parse_geonames(FRANKFURT).unwrap();
        assert_eq!(lookup, Lookup::Code(CountryCode::DE));
    }

    #[test]
    fn no_place_is_not_found() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?><geonames></geonames>"#;
        assert_eq!(parse_geonames(body).unwrap(), Lookup::NotFound);
    }

    #[test]
    fn credit_limit_is_rate_limited() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?><geonames><status message="the hourly limit of 1000 credits has been exceeded." value="19"/></geonames>"#;
        assert_eq!(parse_geonames(body).unwrap(), Lookup::RateLimited);
    }

    #[test]
    fn status_wins_over_a_following_geoname() {
        let body = r#"<geonames><status message="daily limit exceeded" value="18"/><geoname><countryCode>DE</countryCode></geoname></geonames>"#;
        assert_eq!(parse_geonames(body).unwrap(), Lookup::RateLimited);
    }

    #[test]
    fn self_closing_sibling_does_not_hide_the_code() {
        let body = "<geonames><geoname><adminCode1/><countryCode>AT</countryCode><countryName>Austria</countryName></geoname></geonames>";
        assert_eq!(
            parse_geonames(body).unwrap(),
            Lookup::Code(CountryCode::parse("AT").unwrap())
        );
    }

    #[test]
    fn other_status_is_shape_error() {
        let body = r#"<geonames><status message="invalid lat/lng" value="14"/></geonames>"#;
        assert!(matches!(
            parse_geonames(body),
            Err(GeocodeError::Shape { .. })
        ));
    }

    #[test]
    fn missing_country_code_is_shape_error() {
        let body = "<geonames><geoname><name>Somewhere</name></geoname></geonames>";
        assert!(parse_geonames(body).is_err());
    }

    #[test]
    fn non_code_value_is_a_label() {
        let body = "<geonames><geoname><countryCode>Germany</countryCode></geoname></geonames>";
        assert_eq!(
            parse_geonames(body).unwrap(),
            Lookup::Label("Germany".to_string())
        );
    }

    #[tokio::test]
    async fn spent_budget_skips_request() {
        let mut service = GeoNamesService::new("test", Duration::from_secs(1), 0)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/");
        assert_eq!(service.lookup(50.0, 8.0).await.unwrap(), Lookup::RateLimited);
    }
}
