//! Station database builder.
//!
//! Discovers railway stations by probing a journey planner's suggestion
//! endpoint, stores them in SQLite, and attaches a country to each one by
//! reconciling several reverse-geocoding services. Every strategy is
//! resumable: progress is checkpointed after each completed unit of work.

pub mod config;
pub mod discovery;
pub mod domain;
pub mod geocode;
pub mod ledger;
pub mod store;
pub mod suggest;
