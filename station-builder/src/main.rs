use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use station_builder::config::BuilderConfig;
use station_builder::discovery::{Mode, Session};

#[derive(Parser)]
#[command(name = "station-builder")]
#[command(about = "Builds a railway station database by querying a station suggestion endpoint")]
#[command(version)]
struct Cli {
    /// Strategy to run: city, id, addCountry or check
    mode: Option<String>,

    #[arg(long, help = "Wall-clock budget in seconds [default: 900]")]
    budget_secs: Option<u64>,

    #[arg(long, help = "Stop after this many steps")]
    max_steps: Option<u64>,

    #[arg(long, help = "Directory for checkpoints and the country label cache")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "SQLite database file")]
    database: Option<PathBuf>,

    #[arg(long, help = "Ask on the terminal for unknown country labels")]
    interactive: bool,

    #[arg(long, help = "Resolve countries during prefix discovery")]
    with_country: bool,

    #[arg(long, help = "Seconds to pause after a rate-limit hit [default: 3600]")]
    cooldown_secs: Option<u64>,
}

impl Cli {
    fn config(&self) -> BuilderConfig {
        let mut config = BuilderConfig::new()
            .with_max_steps(self.max_steps)
            .with_interactive(self.interactive)
            .with_country(self.with_country);
        if let Some(secs) = self.budget_secs {
            config = config.with_time_budget(Duration::from_secs(secs));
        }
        if let Some(secs) = self.cooldown_secs {
            config = config.with_cooldown(Duration::from_secs(secs));
        }
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(path) = &self.database {
            config = config.with_database(path);
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("station_builder=info")),
        )
        .init();

    let cli = Cli::parse();
    let parsed = match cli.mode.as_deref() {
        Some(name) => name.parse::<Mode>(),
        None => Err("no mode given".to_string()),
    };
    let mode = match parsed {
        Ok(mode) => mode,
        Err(e) => {
            println!("{e}");
            println!("usage: station-builder <{}> [OPTIONS]", Mode::NAMES.join("|"));
            return ExitCode::SUCCESS;
        }
    };

    let mut session = match Session::open(cli.config()) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "failed to open session");
            return ExitCode::FAILURE;
        }
    };

    match session.monitor() {
        Ok(monitor) => println!("{monitor}"),
        Err(e) => warn!(error = %e, "could not read progress"),
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, finishing up");
            let _ = stop_tx.send(true);
        }
    });

    let code = match session.run(mode, stop_rx).await {
        Ok(report) => {
            println!("{mode}: {report}");
            if report.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    };

    match session.monitor() {
        Ok(monitor) => println!("{monitor}"),
        Err(e) => warn!(error = %e, "could not read progress"),
    }
    code
}
