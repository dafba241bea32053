//! Station discovery.
//!
//! Four resumable strategies share one [`Runner`]:
//!
//! - [`PrefixWalk`] enumerates search prefixes in odometer order,
//! - [`GapWalk`] walks the numeric neighbourhood of known station IDs,
//! - [`CountryBackfill`] attaches countries to stored stations,
//! - [`CountryCheck`] re-resolves stored countries and reports disagreements.
//!
//! A [`Session`] wires a strategy to the store, the ledger and the
//! providers for one run.

mod backfill;
mod check;
mod error;
mod gaps;
mod prefix;
mod runner;
mod session;

pub use backfill::CountryBackfill;
pub use check::CountryCheck;
pub use error::DiscoveryError;
pub use gaps::{GAP_LEDGER, GapWalk};
pub use prefix::{PREFIX_LEDGER, PrefixWalk};
pub use runner::{Outcome, RunReport, Runner, Step, Strategy};
pub use session::{Mode, Monitor, Session};
