//! Index universe — named symbol lists (DE_DAX, US_DOW, ...).
//!
//! Stored as TOML:
//!
//! ```toml
//! [indices]
//! DE_DAX = ["SAP.DE", "SIE.DE", "ALV.DE"]
//! US_DOW = ["KO", "JNJ", "MSFT"]
//! ```
//!
//! Symbol order inside an index is preserved; it becomes the row order of
//! that index's dataset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown index names: {} (known: {})", .unknown.join(", "), .known.join(", "))]
    UnknownIndex {
        unknown: Vec<String>,
        known: Vec<String>,
    },
}

/// The complete universe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    pub indices: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|e| UniverseError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    /// Get symbols for a specific index.
    pub fn index_symbols(&self, index: &str) -> Option<&[String]> {
        self.indices.get(index).map(|v| v.as_slice())
    }

    /// Get the list of index names.
    pub fn index_names(&self) -> Vec<&str> {
        self.indices.keys().map(|s| s.as_str()).collect()
    }

    /// Every index a symbol belongs to, in name order.
    pub fn memberships(&self, symbol: &str) -> Vec<String> {
        self.indices
            .iter()
            .filter(|(_, symbols)| symbols.iter().any(|s| s.trim() == symbol))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Resolve a comma-separated selection (`"DE_DAX, US_DOW"`) to index names.
    ///
    /// `None` or an empty selection means every index. Unknown names are
    /// rejected as a group so the user sees all typos at once.
    pub fn select(&self, selection: Option<&str>) -> Result<Vec<String>, UniverseError> {
        let names: Vec<String> = selection
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            return Ok(self.indices.keys().cloned().collect());
        }

        let unknown: Vec<String> = names
            .iter()
            .filter(|n| !self.indices.contains_key(n.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(UniverseError::UnknownIndex {
                unknown,
                known: self.indices.keys().cloned().collect(),
            });
        }
        Ok(names)
    }

    /// Total number of symbols across all indices (with repeats).
    pub fn symbol_count(&self) -> usize {
        self.indices.values().map(|v| v.len()).sum()
    }
}
