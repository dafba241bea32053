//! Durable discovery checkpoints.
//!
//! One flat text file per strategy holds the last fully processed unit of
//! work (a prefix or a station ID). An empty or missing file means the
//! strategy has not started yet.

use std::path::PathBuf;

use tracing::debug;

/// Errors writing or reading checkpoint files.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Checkpoint files, one per strategy, under a common directory.
#[derive(Debug, Clone)]
pub struct ProgressLedger {
    dir: PathBuf,
}

impl ProgressLedger {
    /// Create a ledger rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the checkpoint for `strategy`.
    ///
    /// A missing file reads as empty. Files written by older versions may
    /// hold one checkpoint per line; only the last non-empty line counts.
    pub fn load(&self, strategy: &str) -> Result<String, LedgerError> {
        let path = self.path(strategy);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
            Err(source) => return Err(LedgerError::Read { path, source }),
        };

        // Prefixes may contain spaces, so only line endings are stripped.
        let checkpoint = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .last()
            .unwrap_or_default()
            .to_string();

        debug!(strategy, checkpoint = %checkpoint, "loaded checkpoint");
        Ok(checkpoint)
    }

    /// Overwrite the checkpoint for `strategy`.
    ///
    /// Writes to a sibling temp file and renames it into place, so a crash
    /// mid-write leaves the previous checkpoint intact.
    pub fn save(&self, strategy: &str, checkpoint: &str) -> Result<(), LedgerError> {
        let path = self.path(strategy);

        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|source| LedgerError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let tmp = path.with_extension("txt.tmp");
        std::fs::write(&tmp, checkpoint).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| LedgerError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(strategy, checkpoint, "saved checkpoint");
        Ok(())
    }

    /// Path of the checkpoint file for `strategy`.
    pub fn path(&self, strategy: &str) -> PathBuf {
        self.dir.join(format!("{strategy}.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path());

        ledger.save("last_partial_city", "hrb").unwrap();
        assert_eq!(ledger.load("last_partial_city").unwrap(), "hrb");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("never_created"));

        assert_eq!(ledger.load("last_station_id").unwrap(), "");
    }

    #[test]
    fn save_overwrites() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path());

        ledger.save("last_station_id", "000100010").unwrap();
        ledger.save("last_station_id", "000100012").unwrap();

        let raw = std::fs::read_to_string(ledger.path("last_station_id")).unwrap();
        assert_eq!(raw, "000100012");
    }

    #[test]
    fn legacy_multi_line_reads_last_non_empty_line() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path());
        std::fs::write(ledger.path("last_partial_city"), "aa\nab\nhr \n\n").unwrap();

        assert_eq!(ledger.load("last_partial_city").unwrap(), "hr ");
    }

    #[test]
    fn blank_file_is_empty() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path());
        std::fs::write(ledger.path("last_station_id"), "\n\n").unwrap();

        assert_eq!(ledger.load("last_station_id").unwrap(), "");
    }

    #[test]
    fn strategies_are_independent() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path());

        ledger.save("last_partial_city", "abc").unwrap();
        ledger.save("last_station_id", "000000042").unwrap();

        assert_eq!(ledger.load("last_partial_city").unwrap(), "abc");
        assert_eq!(ledger.load("last_station_id").unwrap(), "000000042");
    }

    #[test]
    fn creates_directory_on_save() {
        let dir = tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("nested").join("ledger"));

        ledger.save("last_partial_city", "a").unwrap();
        assert!(ledger.path("last_partial_city").exists());
    }
}
