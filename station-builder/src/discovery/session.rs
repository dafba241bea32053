//! One discovery run, from loading the checkpoint to saving it again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::info;

use crate::config::BuilderConfig;
use crate::geocode::{CountryLabels, Resolver, TerminalPrompt};
use crate::ledger::ProgressLedger;
use crate::store::StationStore;
use crate::suggest::{SuggestClient, SuggestionSource};

use super::backfill::CountryBackfill;
use super::check::CountryCheck;
use super::error::DiscoveryError;
use super::gaps::{GAP_LEDGER, GapWalk};
use super::prefix::{PREFIX_LEDGER, PrefixWalk};
use super::runner::{RunReport, Runner};

/// Which strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Prefix enumeration.
    City,
    /// Numeric-ID gap walking.
    Id,
    /// Country backfill.
    AddCountry,
    /// Re-resolution of stored countries.
    Check,
}

impl Mode {
    /// Names accepted on the command line.
    pub const NAMES: [&'static str; 4] = ["city", "id", "addCountry", "check"];

    /// The ledger entry holding this mode's checkpoint, if it keeps one.
    pub fn ledger_key(self) -> Option<&'static str> {
        match self {
            Mode::City => Some(PREFIX_LEDGER),
            Mode::Id => Some(GAP_LEDGER),
            Mode::AddCountry | Mode::Check => None,
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(Mode::City),
            "id" => Ok(Mode::Id),
            "addCountry" => Ok(Mode::AddCountry),
            "check" => Ok(Mode::Check),
            other => Err(format!(
                "unknown mode {other:?}, expected one of {}",
                Mode::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::City => "city",
            Mode::Id => "id",
            Mode::AddCountry => "addCountry",
            Mode::Check => "check",
        };
        f.write_str(name)
    }
}

/// Snapshot of discovery progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub taken_at: DateTime<Local>,
    pub city_checkpoint: String,
    pub id_checkpoint: String,
    pub stations: u64,
    pub with_country: u64,
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]", self.taken_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "last prefix:     {:?}", self.city_checkpoint)?;
        writeln!(f, "last station ID: {:?}", self.id_checkpoint)?;
        writeln!(f, "stations:        {}", self.stations)?;
        write!(f, "with country:    {}", self.with_country)
    }
}

/// Everything one run owns: config, clients, store, ledger and resolver.
///
/// Created per run and dropped at its end, which also closes the database.
pub struct Session<S> {
    config: BuilderConfig,
    source: S,
    store: StationStore,
    ledger: ProgressLedger,
    resolver: Resolver,
}

impl Session<SuggestClient> {
    /// Open a session against the real endpoints.
    pub fn open(config: BuilderConfig) -> Result<Self, DiscoveryError> {
        let source = SuggestClient::new(config.suggest_config())?;
        let store = StationStore::open(&config.database_path)?;
        let ledger = ProgressLedger::new(&config.data_dir);

        let labels = CountryLabels::load(config.labels_path())?;
        let mut resolver = Resolver::standard(&config, labels)?;
        if config.interactive {
            resolver = resolver.with_prompt(TerminalPrompt::stdio());
        }

        Ok(Self::new(config, source, store, ledger, resolver))
    }
}

impl<S: SuggestionSource> Session<S> {
    pub fn new(
        config: BuilderConfig,
        source: S,
        store: StationStore,
        ledger: ProgressLedger,
        resolver: Resolver,
    ) -> Self {
        Self {
            config,
            source,
            store,
            ledger,
            resolver,
        }
    }

    pub fn store(&self) -> &StationStore {
        &self.store
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Current checkpoints and counts.
    pub fn monitor(&self) -> Result<Monitor, DiscoveryError> {
        Ok(Monitor {
            taken_at: Local::now(),
            city_checkpoint: self.ledger.load(PREFIX_LEDGER)?,
            id_checkpoint: self.ledger.load(GAP_LEDGER)?,
            stations: self.store.count()?,
            with_country: self.store.count_with_country()?,
        })
    }

    /// Run `mode` until its budget, step cap or work runs out, or until
    /// `interrupt` turns `true`.
    ///
    /// The checkpoint of the last completed step is saved however the run
    /// ended. A failed step shows up in the report, not as an `Err`.
    pub async fn run(
        &mut self,
        mode: Mode,
        interrupt: watch::Receiver<bool>,
    ) -> Result<RunReport, DiscoveryError> {
        let key = mode.ledger_key();
        let start = match key {
            Some(key) => self.ledger.load(key)?,
            None => String::new(),
        };
        info!(mode = %mode, checkpoint = %start, "starting run");

        let mut runner = Runner::new(self.config.time_budget, interrupt)
            .with_max_steps(self.config.max_steps);
        let interactive = self.config.interactive;

        let report = match mode {
            Mode::City => {
                let mut walk = PrefixWalk::new(&self.source, &self.store);
                if self.config.with_country {
                    walk = walk.with_resolver(&mut self.resolver, interactive);
                }
                runner.run(&mut walk, start).await
            }
            Mode::Id => {
                let mut walk = GapWalk::new(&self.source, &self.store);
                runner.run(&mut walk, start).await
            }
            Mode::AddCountry => {
                let mut backfill = CountryBackfill::new(&self.store, &mut self.resolver, interactive);
                runner.run(&mut backfill, start).await
            }
            Mode::Check => {
                let mut check = CountryCheck::new(&self.store, &mut self.resolver);
                let report = runner.run(&mut check, start).await;
                info!(
                    checked = check.checked(),
                    mismatched = check.mismatched(),
                    "country check finished"
                );
                report
            }
        };

        if let Some(key) = key {
            self.ledger.save(key, &report.checkpoint)?;
        }
        Ok(report)
    }
}
