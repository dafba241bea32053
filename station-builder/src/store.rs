//! SQLite-backed station store.
//!
//! Append-only and deduplicating: a station ID, once stored, is never
//! inserted again. The only mutation of an existing row is attaching a
//! country code to a row that has none.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::domain::{CountryCode, Station, StationId, StoredStation};

/// Errors from the station store.
///
/// These are the only errors allowed to abort a discovery run.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt row {station_id:?}: {reason}")]
    Corrupt { station_id: String, reason: String },
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stations (
        station_id TEXT PRIMARY KEY,
        name       TEXT NOT NULL,
        lat        REAL NOT NULL,
        lng        REAL NOT NULL,
        country    TEXT NULL
    )";

/// Persistent set of discovered stations, keyed by station ID.
pub struct StationStore {
    conn: Connection,
}

impl StationStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Self::with_connection(Connection::open(path)?)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    /// Insert the stations whose IDs are not stored yet.
    ///
    /// A batch of already-known IDs is a no-op. The batch is written in a
    /// single transaction. Returns the number of rows inserted.
    pub fn store(&self, stations: &[Station]) -> Result<usize, StoreError> {
        if stations.is_empty() {
            return Ok(0);
        }

        let mut known = self.all_ids()?;
        let fresh: Vec<&Station> = stations
            .iter()
            .filter(|s| known.insert(s.id.as_str().to_string()))
            .collect();

        if fresh.is_empty() {
            debug!(batch = stations.len(), "batch holds only known stations");
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO stations (station_id, name, lat, lng, country)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for station in &fresh {
                insert.execute(params![
                    station.id.as_str(),
                    station.name,
                    station.lat.degrees(),
                    station.lng.degrees(),
                    station.country.as_ref().map(|c| c.as_str()),
                ])?;
            }
        }
        tx.commit()?;

        debug!(batch = stations.len(), inserted = fresh.len(), "stored stations");
        Ok(fresh.len())
    }

    /// Attach a country to a station that has none.
    ///
    /// Returns `false` when the station is unknown or already has a country;
    /// an existing country is never overwritten.
    pub fn backfill_country(&self, id: &StationId, code: CountryCode) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE stations SET country = ?1 WHERE station_id = ?2 AND country IS NULL",
            params![code.as_str(), id.as_str()],
        )?;
        Ok(changed > 0)
    }

    /// Number of stored stations.
    pub fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stations", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Number of stored stations with a country code.
    pub fn count_with_country(&self) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM stations WHERE country IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    /// Up to `limit` stored IDs strictly greater than `after`, ascending.
    ///
    /// `None` starts from the lowest stored ID.
    pub fn ids_after(
        &self,
        after: Option<&StationId>,
        limit: usize,
    ) -> Result<Vec<StationId>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT station_id FROM stations WHERE station_id > ?1
             ORDER BY station_id ASC LIMIT ?2",
        )?;
        let lower = after.map(|id| id.as_str()).unwrap_or("");
        let rows = stmt.query_map(params![lower, limit as i64], |row| row.get::<_, String>(0))?;

        rows.map(|raw| parse_id(&raw?)).collect()
    }

    /// The first station without a country whose ID is greater than `after`.
    pub fn next_without_country(
        &self,
        after: Option<&StationId>,
    ) -> Result<Option<StoredStation>, StoreError> {
        self.first_after("country IS NULL", after)
    }

    /// The first station with a country whose ID is greater than `after`.
    pub fn next_with_country(
        &self,
        after: Option<&StationId>,
    ) -> Result<Option<StoredStation>, StoreError> {
        self.first_after("country IS NOT NULL", after)
    }

    fn first_after(
        &self,
        filter: &'static str,
        after: Option<&StationId>,
    ) -> Result<Option<StoredStation>, StoreError> {
        let lower = after.map(|id| id.as_str()).unwrap_or("");
        let sql = format!(
            "SELECT station_id, name, lat, lng, country FROM stations
             WHERE {filter} AND station_id > ?1
             ORDER BY station_id ASC LIMIT 1"
        );
        let raw = self
            .conn
            .query_row(&sql, params![lower], RawRow::from_row)
            .optional()?;

        raw.map(RawRow::into_station).transpose()
    }

    /// Look up a single station.
    pub fn get(&self, id: &StationId) -> Result<Option<StoredStation>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT station_id, name, lat, lng, country FROM stations WHERE station_id = ?1",
                params![id.as_str()],
                RawRow::from_row,
            )
            .optional()?;

        raw.map(RawRow::into_station).transpose()
    }

    fn all_ids(&self) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT station_id FROM stations")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }
}

/// A row as SQLite hands it back, before validation.
struct RawRow {
    station_id: String,
    name: String,
    lat: f64,
    lng: f64,
    country: Option<String>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            station_id: row.get(0)?,
            name: row.get(1)?,
            lat: row.get(2)?,
            lng: row.get(3)?,
            country: row.get(4)?,
        })
    }

    fn into_station(self) -> Result<StoredStation, StoreError> {
        let country = match self.country.as_deref() {
            Some(raw) => Some(CountryCode::parse(raw).map_err(|e| StoreError::Corrupt {
                station_id: self.station_id.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(StoredStation {
            id: parse_id(&self.station_id)?,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            country,
        })
    }
}

fn parse_id(raw: &str) -> Result<StationId, StoreError> {
    StationId::parse(raw).map_err(|e| StoreError::Corrupt {
        station_id: raw.to_string(),
        reason: e.to_string(),
    })
}
