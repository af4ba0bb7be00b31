//! Wiring a catalog up from a config file at process start.

use crate::defaults::extract_bundled;
use skyschem_common::Result;
use skyschem_logger::{self as logger, log, LogSeverity::Info};
use skyschem_schematic::{CatalogConfig, FallbackLoader, LoadSummary, SchematicCatalog};
use skyschem_world::{EngineAdapter, MainContext};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_CONFIG: &str = "skyschem.json";

pub struct Bootstrap {
    pub catalog: Arc<SchematicCatalog>,
    pub summary: LoadSummary,
}

/// Reads the config and fixes the process log level from it. Call before
/// anything else logs, or the `SKYSCHEM_LOG` default sticks.
pub fn load_config(path: &Path) -> Result<CatalogConfig> {
    let config = CatalogConfig::load(path)?;
    logger::init(config.log_severity());
    Ok(config)
}

/// Creates the schematics directory on first run, seeding it with the bundled
/// islands, then loads every file in it.
pub async fn start(
    config: CatalogConfig,
    main: MainContext,
    adapter: Arc<dyn EngineAdapter>,
    fallback: Option<Arc<dyn FallbackLoader>>,
) -> Result<Bootstrap> {
    if !config.directory.is_dir() {
        fs::create_dir_all(&config.directory)?;
        log(
            format!("Created schematics directory {}", config.directory.display()),
            Info,
        );
        let version = config.engine_version.as_deref().unwrap_or(adapter.version());
        extract_bundled(&config.directory, version)?;
    }

    let catalog = Arc::new(SchematicCatalog::new(config, main, adapter, fallback));
    let summary = catalog.load_all().await?;
    log(
        format!(
            "Loaded {} schematic(s) from {}, {} skipped",
            summary.loaded.len(),
            catalog.directory().display(),
            summary.failed.len()
        ),
        Info,
    );
    Ok(Bootstrap { catalog, summary })
}
