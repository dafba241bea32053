//! Quorum resolution over several country services.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::domain::{CountryCode, StoredStation};

use super::error::GeocodeError;
use super::geonames::GeoNamesService;
use super::labels::{CountryLabels, HeadlessPrompt, LabelPrompt};
use super::local::LocalGeocoder;
use super::nominatim::NominatimService;
use super::{CountryService, Lookup, ServiceKind};

/// Votes needed before a country is accepted.
pub const QUORUM: usize = 2;

/// Reconciles several unreliable country services into one answer.
///
/// Services sit in two pools, local and online. Each resolution draws
/// services at random without replacement, one from each pool per round
/// (online first), until two votes agree or both pools run dry.
///
/// A rate-limited service suspends the whole resolution for the cool-down
/// and is then asked once more. Guessing is never an option: an answer
/// nobody agrees on is `None`.
pub struct Resolver {
    local: Vec<Box<dyn CountryService>>,
    online: Vec<Box<dyn CountryService>>,
    labels: CountryLabels,
    prompt: Box<dyn LabelPrompt>,
    cooldown: Duration,
    rng: StdRng,
}

impl Resolver {
    /// An empty resolver. Add services with [`Resolver::with_service`].
    pub fn new(labels: CountryLabels, cooldown: Duration) -> Self {
        Self {
            local: Vec::new(),
            online: Vec::new(),
            labels,
            prompt: Box::new(HeadlessPrompt),
            cooldown,
            rng: StdRng::from_entropy(),
        }
    }

    /// The production line-up: offline boxes, GeoNames and Nominatim.
    pub fn standard(config: &BuilderConfig, labels: CountryLabels) -> Result<Self, GeocodeError> {
        let geonames =
            GeoNamesService::new(&config.user_agent, config.timeout, config.geonames_hourly)?;
        let nominatim =
            NominatimService::new(&config.user_agent, config.timeout, config.nominatim_hourly)?;

        Ok(Self::new(labels, config.cooldown)
            .with_service(LocalGeocoder::new())
            .with_service(geonames)
            .with_service(nominatim))
    }

    /// Add a service to the pool matching its kind.
    pub fn with_service(mut self, service: impl CountryService + 'static) -> Self {
        match service.kind() {
            ServiceKind::Local => self.local.push(Box::new(service)),
            ServiceKind::Online => self.online.push(Box::new(service)),
        }
        self
    }

    /// Who to ask about unknown country labels.
    pub fn with_prompt(mut self, prompt: impl LabelPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Fix the draw order (for testing).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn labels(&self) -> &CountryLabels {
        &self.labels
    }

    /// Resolve the country of a coordinate.
    ///
    /// `allow_interactive` lets an unknown label reach the prompt; without
    /// it such a vote is simply lost.
    pub async fn resolve(
        &mut self,
        lat: f64,
        lng: f64,
        allow_interactive: bool,
    ) -> Option<CountryCode> {
        let mut tally: BTreeMap<CountryCode, usize> = BTreeMap::new();

        for (kind, index) in self.draw_order() {
            let cooldown = self.cooldown;
            let service = match kind {
                ServiceKind::Local => self.local[index].as_mut(),
                ServiceKind::Online => self.online[index].as_mut(),
            };
            let name = service.name();

            let Some(lookup) = poll(service, cooldown, lat, lng).await else {
                continue;
            };
            let Some(code) = self.to_code(lookup, allow_interactive) else {
                debug!(service = name, lat, lng, "no usable vote");
                continue;
            };

            debug!(service = name, country = %code, "vote");
            let votes = tally.entry(code).or_default();
            *votes += 1;
            if *votes >= QUORUM {
                return Some(code);
            }
        }

        debug!(lat, lng, votes = ?tally, "no quorum");
        None
    }

    /// Re-resolve a stored station and compare with its stored country.
    ///
    /// `None` when the fresh resolution is inconclusive.
    pub async fn check(&mut self, station: &StoredStation) -> Option<bool> {
        let fresh = self.resolve(station.lat, station.lng, false).await?;
        let agrees = station.country == Some(fresh);
        if !agrees {
            info!(
                station_id = %station.id,
                stored = ?station.country,
                resolved = %fresh,
                "stored country disagrees"
            );
        }
        Some(agrees)
    }

    /// Shuffled pools, interleaved online-first.
    fn draw_order(&mut self) -> Vec<(ServiceKind, usize)> {
        let mut online: Vec<usize> = (0..self.online.len()).collect();
        let mut local: Vec<usize> = (0..self.local.len()).collect();
        online.shuffle(&mut self.rng);
        local.shuffle(&mut self.rng);

        let rounds = online.len().max(local.len());
        let mut order = Vec::with_capacity(online.len() + local.len());
        for round in 0..rounds {
            if let Some(&i) = online.get(round) {
                order.push((ServiceKind::Online, i));
            }
            if let Some(&i) = local.get(round) {
                order.push((ServiceKind::Local, i));
            }
        }
        order
    }

    fn to_code(&mut self, lookup: Lookup, allow_interactive: bool) -> Option<CountryCode> {
        match lookup {
            Lookup::Code(code) => Some(code),
            Lookup::Label(label) => self.resolve_label(&label, allow_interactive),
            Lookup::NotFound | Lookup::RateLimited => None,
        }
    }

    fn resolve_label(&mut self, label: &str, allow_interactive: bool) -> Option<CountryCode> {
        if let Some(code) = self.labels.get(label) {
            return Some(code);
        }
        if !allow_interactive {
            debug!(label, "unknown country label");
            return None;
        }

        let code = self.prompt.ask(label)?;
        if let Err(e) = self.labels.insert(label, code) {
            warn!(label, error = %e, "failed to persist country label");
        }
        Some(code)
    }
}

/// Ask one service, sitting out one cool-down if it is rate limited.
async fn poll(
    service: &mut dyn CountryService,
    cooldown: Duration,
    lat: f64,
    lng: f64,
) -> Option<Lookup> {
    for attempt in 0..2 {
        match service.lookup(lat, lng).await {
            Ok(Lookup::RateLimited) if attempt == 0 => {
                warn!(
                    service = service.name(),
                    cooldown_secs = cooldown.as_secs(),
                    "rate limited, cooling down"
                );
                tokio::time::sleep(cooldown).await;
            }
            Ok(Lookup::RateLimited) => {
                warn!(service = service.name(), "still rate limited after cool-down");
                return None;
            }
            Ok(lookup) => return Some(lookup),
            Err(e) => {
                warn!(service = service.name(), error = %e, "lookup failed");
                return None;
            }
        }
    }
    None
}
