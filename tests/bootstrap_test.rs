use skyschem::bootstrap;
use skyschem::{BlockPos, CaptureRequest, CatalogConfig, Rotation};
use skyschem_world::{MainContext, MemoryWorld};
use std::fs;
use std::sync::Arc;

fn config_for(directory: &std::path::Path) -> CatalogConfig {
    CatalogConfig {
        directory: directory.to_path_buf(),
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn test_first_run_extracts_bundled_islands() {
    let dir = tempfile::tempdir().unwrap();
    let directory = dir.path().join("plugins").join("schematics");
    let (main, _thread) = MainContext::start("bootstrap-first-run").unwrap();

    let started = bootstrap::start(
        config_for(&directory),
        main,
        Arc::new(MemoryWorld::new("1.8.8")),
        None,
    )
    .await
    .unwrap();

    assert!(directory.is_dir());
    assert!(started.summary.failed.is_empty());
    assert_eq!(started.catalog.list(), vec!["desert", "mycel", "normal"]);
    assert_eq!(
        started.catalog.get("normal").unwrap().format_name(),
        "native"
    );
}

#[tokio::test]
async fn test_restart_picks_up_saved_schematics() {
    let dir = tempfile::tempdir().unwrap();
    let world = Arc::new(MemoryWorld::new("1.8.8"));
    world.put_block(BlockPos::new(5, 5, 5), 4 << 4);

    let (main, _thread) = MainContext::start("bootstrap-first").unwrap();
    let first = bootstrap::start(config_for(dir.path()), main, world.clone(), None)
        .await
        .unwrap();
    first
        .catalog
        .capture(
            world.clone(),
            CaptureRequest::new(
                BlockPos::new(5, 5, 5),
                BlockPos::new(6, 6, 6),
                BlockPos::default(),
                "pillar",
            ),
        )
        .await
        .unwrap();

    let (main, _thread) = MainContext::start("bootstrap-second").unwrap();
    let pasted_into = Arc::new(MemoryWorld::new("1.8.8"));
    let second = bootstrap::start(config_for(dir.path()), main, pasted_into.clone(), None)
        .await
        .unwrap();
    assert_eq!(second.summary.loaded, vec!["pillar".to_owned()]);

    second
        .catalog
        .paste("pillar", pasted_into.clone(), BlockPos::new(0, 0, 0), Rotation::None)
        .await
        .unwrap();
    assert_eq!(pasted_into.combined_id_at(BlockPos::new(0, 0, 0)), Some(4 << 4));
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skyschem.json");
    fs::write(&path, r#"{ "directory": "islands", "compress": true }"#).unwrap();

    let config = bootstrap::load_config(&path).unwrap();
    assert_eq!(config.directory, std::path::PathBuf::from("islands"));
    assert!(config.compress);
    assert_eq!(config.main_context_timeout_ms, 5000);
}
