//! Snapshot sources and structured data errors.
//!
//! The SnapshotSource trait abstracts over where the per-symbol JSON documents
//! live (a directory on disk, or memory in tests) so the loader never touches
//! the filesystem directly.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The three snapshot documents kept per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapshotKind {
    /// `{symbol}.json`
    TickerInfo,
    /// `{symbol}_calendar.json`
    Calendar,
    /// `{symbol}_dividends.json`
    Dividends,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 3] = [Self::TickerInfo, Self::Calendar, Self::Dividends];

    /// File name for this document kind.
    pub fn file_name(&self, symbol: &str) -> String {
        match self {
            Self::TickerInfo => format!("{symbol}.json"),
            Self::Calendar => format!("{symbol}_calendar.json"),
            Self::Dividends => format!("{symbol}_dividends.json"),
        }
    }

    /// Inverse of [`file_name`](Self::file_name): the symbol and kind a file name encodes.
    pub fn parse_file_name(name: &str) -> Option<(String, SnapshotKind)> {
        let stem = name.strip_suffix(".json")?;
        let (symbol, kind) = if let Some(s) = stem.strip_suffix("_dividends") {
            (s, Self::Dividends)
        } else if let Some(s) = stem.strip_suffix("_calendar") {
            (s, Self::Calendar)
        } else {
            (stem, Self::TickerInfo)
        };
        if symbol.is_empty() || symbol.ends_with(".meta") {
            return None;
        }
        Some((symbol.to_string(), kind))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TickerInfo => "ticker info",
            Self::Calendar => "calendar",
            Self::Dividends => "dividend history",
        }
    }
}

/// Structured per-symbol data errors.
///
/// Every variant is recoverable at batch level: the symbol is skipped and the
/// run continues.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing {} for '{symbol}' ({location})", .kind.label())]
    MissingData {
        symbol: String,
        kind: SnapshotKind,
        location: String,
    },

    #[error("malformed {} for '{symbol}' ({location}): {detail}", .kind.label())]
    Parse {
        symbol: String,
        kind: SnapshotKind,
        location: String,
        detail: String,
    },

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

impl DataError {
    /// Short machine-readable category, used in run reports.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "missing_data",
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
        }
    }
}

/// Where snapshot documents come from.
pub trait SnapshotSource {
    /// Human-readable description (directory path, "memory", ...).
    fn describe(&self) -> String;

    /// Location string for a document, used in error messages.
    fn location(&self, symbol: &str, kind: SnapshotKind) -> String;

    /// Raw document text, or `Ok(None)` if the document does not exist.
    fn read(&self, symbol: &str, kind: SnapshotKind) -> Result<Option<String>, DataError>;

    /// Every symbol that has a ticker-info or dividend-history document,
    /// in lexicographic order.
    fn symbols(&self) -> Result<Vec<String>, DataError>;
}

// ─── Directory source ───────────────────────────────────────────────

/// Snapshots stored flat in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, symbol: &str, kind: SnapshotKind) -> PathBuf {
        self.dir.join(kind.file_name(symbol))
    }
}

impl SnapshotSource for DirectorySource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn location(&self, symbol: &str, kind: SnapshotKind) -> String {
        self.path(symbol, kind).display().to_string()
    }

    fn read(&self, symbol: &str, kind: SnapshotKind) -> Result<Option<String>, DataError> {
        let path = self.path(symbol, kind);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataError::Io {
                location: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        let io_err = |e: io::Error| DataError::Io {
            location: self.dir.display().to_string(),
            source: e,
        };
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.path().is_file() {
                names.insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        let mut found = BTreeSet::new();
        for name in &names {
            if is_written_dataset(name, &names) {
                continue;
            }
            if let Some((symbol, kind)) = SnapshotKind::parse_file_name(name) {
                if kind != SnapshotKind::Calendar {
                    found.insert(symbol);
                }
            }
        }
        Ok(found.into_iter().collect())
    }
}

/// A dataset written by a previous build: `<stem>.json` with a
/// `<stem>.meta.json` sidecar next to it.
fn is_written_dataset(name: &str, names: &BTreeSet<String>) -> bool {
    name.strip_suffix(".json")
        .is_some_and(|stem| names.contains(&format!("{stem}.meta.json")))
}

// ─── In-memory source ───────────────────────────────────────────────

/// In-memory snapshots, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: BTreeMap<(String, SnapshotKind), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, kind: SnapshotKind, content: impl Into<String>) {
        self.docs.insert((symbol.to_string(), kind), content.into());
    }

    pub fn with(mut self, symbol: &str, kind: SnapshotKind, content: impl Into<String>) -> Self {
        self.insert(symbol, kind, content);
        self
    }
}

impl SnapshotSource for MemorySource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn location(&self, symbol: &str, kind: SnapshotKind) -> String {
        format!("memory:{}", kind.file_name(symbol))
    }

    fn read(&self, symbol: &str, kind: SnapshotKind) -> Result<Option<String>, DataError> {
        Ok(self.docs.get(&(symbol.to_string(), kind)).cloned())
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        let found: BTreeSet<&String> = self
            .docs
            .keys()
            .filter(|(_, kind)| *kind != SnapshotKind::Calendar)
            .map(|(symbol, _)| symbol)
            .collect();
        Ok(found.into_iter().cloned().collect())
    }
}
