use skyschem::bootstrap::{self, DEFAULT_CONFIG};
use skyschem_logger::log;
use skyschem_logger::LogSeverity::{Fatal, Info};
use skyschem_world::{AdapterRegistry, EngineAdapter, MainContext, MemoryWorld};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const DEMO_ENGINE_VERSION: &str = "1.8.8-R0.1-SNAPSHOT";

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = match bootstrap::load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log(format!("Couldn't read {}: {}", config_path.display(), err), Fatal);
            process::exit(1);
        }
    };
    log("Skyschem init".to_owned(), Info);

    let engine_version =
        std::env::var("SKYSCHEM_ENGINE").unwrap_or_else(|_| DEMO_ENGINE_VERSION.to_owned());
    let mut registry = AdapterRegistry::new();
    registry.register("1.8", || -> Arc<dyn EngineAdapter> { Arc::new(MemoryWorld::new("1.8.8")) });
    let Some(adapter) = registry.select(&engine_version) else {
        log(format!("No engine adapter supports {}", engine_version), Fatal);
        process::exit(1);
    };

    let (main_context, _main_thread) = match MainContext::start("skyschem-main") {
        Ok(started) => started,
        Err(err) => {
            log(format!("Couldn't start the main context: {}", err), Fatal);
            process::exit(1);
        }
    };

    match bootstrap::start(config, main_context, adapter, None).await {
        Ok(started) => {
            for name in started.catalog.list() {
                log(format!("  {}", name), Info);
            }
        }
        Err(err) => {
            log(format!("Couldn't load schematics: {}", err), Fatal);
            process::exit(1);
        }
    }
}
