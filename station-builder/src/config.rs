//! Run configuration for the station builder.

use std::path::PathBuf;
use std::time::Duration;

use crate::geocode::limits;
use crate::suggest::{DEFAULT_USER_AGENT, Pacing, SuggestClientConfig};

/// File holding the country label cache, under the data directory.
pub const COUNTRY_LABELS_FILE: &str = "country_codes.json";

/// Everything a discovery run needs to know.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Directory for checkpoint files and the country label cache.
    pub data_dir: PathBuf,

    /// SQLite database file.
    pub database_path: PathBuf,

    /// Wall-clock budget for one run.
    pub time_budget: Duration,

    /// Stop after this many steps, whatever the time budget says.
    pub max_steps: Option<u64>,

    /// Politeness delay before every suggestion request.
    pub pacing: Pacing,

    /// How long to suspend resolution after a rate-limit hit.
    pub cooldown: Duration,

    /// GeoNames requests allowed per rolling hour.
    pub geonames_hourly: usize,

    /// Nominatim requests allowed per rolling hour.
    pub nominatim_hourly: usize,

    pub user_agent: String,

    /// Per-request timeout for every HTTP call.
    pub timeout: Duration,

    /// Ask on the terminal for unknown country labels.
    pub interactive: bool,

    /// Resolve countries during prefix discovery, before storing.
    pub with_country: bool,
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("./database_builder"),
            database_path: PathBuf::from("./stations/stations.db"),
            time_budget: Duration::from_secs(15 * 60),
            max_steps: None,
            pacing: Pacing::default(),
            cooldown: Duration::from_secs(60 * 60),
            geonames_hourly: limits::GEONAMES_HOURLY,
            nominatim_hourly: limits::NOMINATIM_HOURLY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            interactive: false,
            with_country: false,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_max_steps(mut self, steps: Option<u64>) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_country(mut self, with_country: bool) -> Self {
        self.with_country = with_country;
        self
    }

    /// Path of the country label cache.
    pub fn labels_path(&self) -> PathBuf {
        self.data_dir.join(COUNTRY_LABELS_FILE)
    }

    /// Settings for the suggestion client.
    pub fn suggest_config(&self) -> SuggestClientConfig {
        SuggestClientConfig::new()
            .with_pacing(self.pacing)
            .with_timeout(self.timeout.as_secs())
            .with_user_agent(self.user_agent.clone())
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BuilderConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./database_builder"));
        assert_eq!(config.database_path, PathBuf::from("./stations/stations.db"));
        assert_eq!(config.time_budget, Duration::from_secs(900));
        assert_eq!(config.max_steps, None);
        assert_eq!(config.cooldown, Duration::from_secs(3600));
        assert_eq!(config.geonames_hourly, 1000);
        assert_eq!(config.nominatim_hourly, 3000);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.interactive);
        assert!(!config.with_country);
    }

    #[test]
    fn builder() {
        let config = BuilderConfig::new()
            .with_data_dir("/tmp/builder")
            .with_database("/tmp/builder/s.db")
            .with_time_budget(Duration::from_secs(60))
            .with_max_steps(Some(5))
            .with_pacing(Pacing::none())
            .with_cooldown(Duration::from_secs(10))
            .with_interactive(true)
            .with_country(true);

        assert_eq!(config.labels_path(), PathBuf::from("/tmp/builder/country_codes.json"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/builder/s.db"));
        assert_eq!(config.time_budget, Duration::from_secs(60));
        assert_eq!(config.max_steps, Some(5));
        assert_eq!(config.cooldown, Duration::from_secs(10));
        assert!(config.interactive);
        assert!(config.with_country);
    }

    #[test]
    fn suggest_config_carries_pacing_and_timeout() {
        let config = BuilderConfig::new().with_pacing(Pacing::none());
        let suggest = config.suggest_config();
        assert_eq!(suggest.pacing, Pacing::none());
        assert_eq!(suggest.timeout_secs, 30);
        assert_eq!(suggest.user_agent, config.user_agent);
    }
}
