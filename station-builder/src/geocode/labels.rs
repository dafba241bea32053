//! Country label cache and the prompt port that fills it.
//!
//! Online services answer with free-text country names ("Deutschland",
//! "Österreich"). The cache maps each raw label to an ISO alpha-2 code. It
//! only ever grows, and is persisted as a flat JSON object so a label never
//! has to be asked about twice.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::domain::CountryCode;

use super::error::GeocodeError;

/// Raw service label → ISO alpha-2 code, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct CountryLabels {
    path: Option<PathBuf>,
    labels: BTreeMap<String, String>,
}

impl CountryLabels {
    /// Load the cache from `path`; a missing file is an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, GeocodeError> {
        let path = path.into();
        let labels = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| GeocodeError::LabelsJson {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(GeocodeError::LabelsIo { path, source }),
        };

        debug!(path = %path.display(), labels = labels.len(), "loaded country labels");
        Ok(Self {
            path: Some(path),
            labels,
        })
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Look up the code for a raw label.
    pub fn get(&self, label: &str) -> Option<CountryCode> {
        let raw = self.labels.get(label)?;
        match CountryCode::parse(raw) {
            Ok(code) => Some(code),
            Err(e) => {
                warn!(label, raw = %raw, error = %e, "ignoring bad cached country code");
                None
            }
        }
    }

    /// Record a mapping and rewrite the backing file.
    pub fn insert(&mut self, label: &str, code: CountryCode) -> Result<(), GeocodeError> {
        self.labels
            .insert(label.to_string(), code.as_str().to_string());
        self.save()
    }

    /// Rewrite the whole document.
    pub fn save(&self) -> Result<(), GeocodeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|source| GeocodeError::LabelsIo {
                path: path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.labels).map_err(|source| {
            GeocodeError::LabelsJson {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(path, json).map_err(|source| GeocodeError::LabelsIo {
            path: path.clone(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Asks someone to map an unknown country label to a code.
pub trait LabelPrompt {
    /// Returns `None` when no answer is available.
    fn ask(&mut self, label: &str) -> Option<CountryCode>;
}

/// Never answers. The default for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPrompt;

impl LabelPrompt for HeadlessPrompt {
    fn ask(&mut self, label: &str) -> Option<CountryCode> {
        debug!(label, "no prompt available for unknown country label");
        None
    }
}

/// Asks on a terminal, re-asking until a valid code or an empty line.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> LabelPrompt for TerminalPrompt<R, W> {
    fn ask(&mut self, label: &str) -> Option<CountryCode> {
        loop {
            write!(
                self.output,
                "enter ISO 3166-1 alpha-2 code for '{label}' (empty to skip): "
            )
            .ok()?;
            self.output.flush().ok()?;

            let mut line = String::new();
            if self.input.read_line(&mut line).ok()? == 0 {
                return None;
            }

            let answer = line.trim();
            if answer.is_empty() {
                return None;
            }
            match CountryCode::parse(answer) {
                Ok(code) => return Some(code),
                Err(_) => {
                    writeln!(self.output, "please enter a valid alpha-2 code").ok()?;
                }
            }
        }
    }
}
