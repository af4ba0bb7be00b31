use serde::{Deserialize, Serialize};
use skyschem_common::Result;
use skyschem_logger::LogSeverity;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding one file per schematic.
    pub directory: PathBuf,
    /// Version stamped into saved files and compared on load. Defaults to the
    /// engine adapter's version.
    pub engine_version: Option<String>,
    /// Upper bound on waiting for the main context; 0 waits forever.
    pub main_context_timeout_ms: u64,
    /// Gzip files on save. Loading accepts both forms regardless.
    pub compress: bool,
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            directory: PathBuf::from("schematics"),
            engine_version: None,
            main_context_timeout_ms: 5000,
            compress: false,
            log_level: "INFO".to_owned(),
        }
    }
}

impl CatalogConfig {
    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text).map_err(io::Error::from)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(CatalogConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn main_context_timeout(&self) -> Option<Duration> {
        match self.main_context_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Falls back to `Info` for unrecognised names.
    pub fn log_severity(&self) -> LogSeverity {
        self.log_level.parse().unwrap_or(LogSeverity::Info)
    }
}
