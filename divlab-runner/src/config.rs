//! Build configuration — TOML file plus command-line overrides.
//!
//! ```toml
//! input_dir = "data/snapshots"
//! output = "out/dividends.json"
//! reference_date = "2024-01-01"
//! sort_by = "forward_yield"
//! format = "json"
//! symbols = ["KO", "SAP.DE"]
//! universe = "universe.toml"
//! ```
//!
//! Every field is optional. Flags given on the command line win over the
//! file; anything still unset falls back to the defaults below.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use divlab_core::data::UniverseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::SortKey;

/// Configuration errors. All of them are fatal and raised before any symbol
/// is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid reference date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unknown sort key '{0}' (expected one of: {names})", names = SortKey::names().join(", "))]
    UnknownSortKey(String),

    #[error("unknown output format '{0}' (expected json or csv)")]
    UnknownFormat(String),

    #[error("universe: {0}")]
    Universe(#[from] UniverseError),
}

/// Output serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Parse a `YYYY-MM-DD` reference date.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(raw.to_string()))
}

pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "dividends.json";

/// Settings for one dataset build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory holding the per-symbol snapshot documents.
    pub input_dir: PathBuf,
    /// Dataset file to (re)write.
    pub output: PathBuf,
    /// Metrics are computed as of this date; `None` means today.
    pub reference_date: Option<NaiveDate>,
    /// Row order; `None` keeps the input symbol order.
    pub sort_by: Option<SortKey>,
    pub format: OutputFormat,
    /// Explicit symbols in output order; empty means every discovered symbol.
    pub symbols: Vec<String>,
    /// Universe file used to fill each row's index memberships.
    pub universe: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            reference_date: None,
            sort_by: None,
            format: OutputFormat::Json,
            symbols: Vec::new(),
            universe: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub reference_date: Option<String>,
    pub sort_by: Option<String>,
    pub format: Option<String>,
    pub symbols: Vec<String>,
    pub universe: Option<PathBuf>,
}

impl BuildConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides. String values are validated here so a
    /// bad flag fails before any work starts.
    pub fn with_overrides(mut self, overrides: BuildOverrides) -> Result<Self, ConfigError> {
        if let Some(dir) = overrides.input_dir {
            self.input_dir = dir;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(raw) = overrides.reference_date {
            self.reference_date = Some(parse_reference_date(&raw)?);
        }
        if let Some(raw) = overrides.sort_by {
            self.sort_by = Some(raw.parse()?);
        }
        if let Some(raw) = overrides.format {
            self.format = raw.parse()?;
        }
        if !overrides.symbols.is_empty() {
            self.symbols = overrides.symbols;
        }
        if let Some(universe) = overrides.universe {
            self.universe = Some(universe);
        }
        Ok(self)
    }

    /// The reference date, falling back to `today`.
    pub fn reference_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.reference_date.unwrap_or(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_is_empty() {
        let config = BuildConfig::from_toml("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn parses_full_file() {
        let config = BuildConfig::from_toml(
            r#"
input_dir = "snapshots"
output = "out/divs.csv"
reference_date = "2024-01-01"
sort_by = "forward_yield"
format = "csv"
symbols = ["KO", "SAP.DE"]
universe = "universe.toml"
"#,
        )
        .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("snapshots"));
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.sort_by, Some(SortKey::ForwardYield));
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.symbols, vec!["KO", "SAP.DE"]);
        assert_eq!(config.universe, Some(PathBuf::from("universe.toml")));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = BuildConfig::from_toml("outptu = \"x.json\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_date_in_file_is_parse_error() {
        assert!(BuildConfig::from_toml("reference_date = \"01/02/2024\"").is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let config = BuildConfig::from_toml("output = \"file.json\"\nsymbols = [\"KO\"]")
            .unwrap()
            .with_overrides(BuildOverrides {
                output: Some(PathBuf::from("flag.json")),
                reference_date: Some("2023-12-01".into()),
                sort_by: Some("ttm_dividend".into()),
                symbols: vec!["MSFT".into(), "AAPL".into()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.output, PathBuf::from("flag.json"));
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2023, 12, 1));
        assert_eq!(config.sort_by, Some(SortKey::TtmDividend));
        assert_eq!(config.symbols, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn empty_symbol_override_keeps_file_symbols() {
        let config = BuildConfig::from_toml("symbols = [\"KO\"]")
            .unwrap()
            .with_overrides(BuildOverrides::default())
            .unwrap();
        assert_eq!(config.symbols, vec!["KO"]);
    }

    #[test]
    fn invalid_overrides_are_config_errors() {
        let bad_date = BuildConfig::default().with_overrides(BuildOverrides {
            reference_date: Some("2024-13-01".into()),
            ..Default::default()
        });
        assert!(matches!(bad_date, Err(ConfigError::InvalidDate(_))));

        let bad_sort = BuildConfig::default().with_overrides(BuildOverrides {
            sort_by: Some("alphabet".into()),
            ..Default::default()
        });
        let msg = bad_sort.unwrap_err().to_string();
        assert!(msg.contains("forward_yield"), "{msg}");

        let bad_format = BuildConfig::default().with_overrides(BuildOverrides {
            format: Some("xml".into()),
            ..Default::default()
        });
        assert!(matches!(bad_format, Err(ConfigError::UnknownFormat(_))));
    }

    #[test]
    fn error_messages_name_the_offending_value() {
        let msg = ConfigError::UnknownSortKey("alphabet".into()).to_string();
        assert_eq!(
            msg,
            format!(
                "unknown sort key 'alphabet' (expected one of: {})",
                SortKey::names().join(", ")
            )
        );

        let universe = divlab_core::data::Universe::from_toml("indices = 3").unwrap_err();
        let wrapped: ConfigError = universe.into();
        assert!(wrapped.to_string().starts_with("universe: "));
    }

    #[test]
    fn reference_date_falls_back_to_today() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(BuildConfig::default().reference_date_or(today), today);
    }

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
