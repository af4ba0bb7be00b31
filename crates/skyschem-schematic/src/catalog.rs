use crate::capture::{read_region, CaptureRequest};
use crate::config::CatalogConfig;
use crate::fallback::FallbackLoader;
use crate::schematic::{Decoded, PlacementReport, Schematic, TagSchematic};
use crate::storage::{load_file, schematic_name, write_file};
use skyschem_common::{BlockPos, Result, Rotation, SchematicError};
use skyschem_logger::log;
use skyschem_logger::LogSeverity::{Debug, Error, Info};
use skyschem_world::{run_on_worker, EngineAdapter, MainContext, WorldAccessor};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

type Entries = HashMap<String, Arc<dyn Schematic>>;

/// Outcome of a directory scan. Failures are per file and never stop the scan.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: Vec<String>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Named schematics, loaded from and saved to one directory.
pub struct SchematicCatalog {
    config: CatalogConfig,
    version: String,
    main: MainContext,
    adapter: Arc<dyn EngineAdapter>,
    fallback: Option<Arc<dyn FallbackLoader>>,
    entries: RwLock<Entries>,
    // Held across encode + write + register so saves never interleave.
    writer: Mutex<()>,
}

impl SchematicCatalog {
    pub fn new(
        config: CatalogConfig,
        main: MainContext,
        adapter: Arc<dyn EngineAdapter>,
        fallback: Option<Arc<dyn FallbackLoader>>,
    ) -> Self {
        let version = config
            .engine_version
            .clone()
            .unwrap_or_else(|| adapter.version().to_owned());
        SchematicCatalog {
            config,
            version,
            main,
            adapter,
            fallback,
            entries: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn engine_version(&self) -> &str {
        &self.version
    }

    /// Loads every schematic file in the configured directory, creating the
    /// directory if it does not exist yet.
    pub async fn load_all(&self) -> Result<LoadSummary> {
        let directory = self.config.directory.clone();
        let fallback = self.fallback.clone();
        let version = self.version.clone();

        let results =
            run_on_worker(move || scan_directory(&directory, fallback.as_deref(), &version))
                .await??;

        let _guard = self.writer.lock().await;
        let mut summary = LoadSummary::default();
        for (path, result) in results {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match result {
                Ok((name, schematic)) => {
                    log(
                        format!(
                            "Successfully loaded schematic {} ({})",
                            file_name,
                            schematic.format_name()
                        ),
                        Info,
                    );
                    self.write_entries().insert(name.clone(), schematic);
                    summary.loaded.push(name);
                }
                Err(err) => {
                    log(format!("Couldn't load schematic {}: {}", file_name, err), Error);
                    summary.failed.push((path, err.to_string()));
                }
            }
        }
        Ok(summary)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Schematic>> {
        self.read_entries().get(name).cloned()
    }

    /// Snapshot of the current names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_entries().keys().cloned().collect();
        names.sort();
        names
    }

    /// Reads the region on the main context, then encodes, writes and
    /// registers it under `request.name` from the worker pool.
    pub async fn capture(
        &self,
        world: Arc<dyn WorldAccessor>,
        request: CaptureRequest,
    ) -> Result<Arc<TagSchematic>> {
        // Rejects bad requests before anything is queued on the main context.
        check_name(&request.name)?;
        request.size()?;

        let adapter = self.adapter.clone();
        let version = self.version.clone();
        let name = request.name.clone();
        let root = self
            .main
            .call(
                move || read_region(world.as_ref(), adapter.as_ref(), &request, &version),
                self.config.main_context_timeout(),
            )
            .await??;

        let schematic = match TagSchematic::from_tag(root)? {
            Decoded::Schematic(schematic) => Arc::new(schematic),
            Decoded::SentinelEmpty => {
                return Err(SchematicError::InvalidSchematic(
                    "captured region produced an empty root".to_owned(),
                ))
            }
        };
        self.save(&name, schematic.clone()).await?;
        Ok(schematic)
    }

    /// Runs [`capture`](Self::capture) in the background and hands the outcome
    /// to `callback` once the file has been written.
    pub fn capture_then<F>(
        self: &Arc<Self>,
        world: Arc<dyn WorldAccessor>,
        request: CaptureRequest,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Arc<TagSchematic>>) + Send + 'static,
    {
        let catalog = self.clone();
        tokio::spawn(async move {
            let result = catalog.capture(world, request).await;
            callback(result);
        })
    }

    /// Writes `schematic` to `<directory>/<name>.schematic` and registers it,
    /// replacing any earlier entry with that name.
    pub async fn save(&self, name: &str, schematic: Arc<TagSchematic>) -> Result<PathBuf> {
        check_name(name)?;

        let _guard = self.writer.lock().await;
        let directory = self.config.directory.clone();
        let compress = self.config.compress;
        let file_name = name.to_owned();
        let root = schematic.to_tag();
        let path = run_on_worker(move || write_file(&directory, &file_name, &root, compress))
            .await?
            .inspect_err(|err| {
                log(format!("Couldn't save schematic {}: {}", name, err), Error)
            })?;

        self.write_entries().insert(name.to_owned(), schematic);
        log(format!("Saved schematic {} to {}", name, path.display()), Info);
        Ok(path)
    }

    /// Pastes the named schematic on the main context. `None` when no such
    /// schematic is registered.
    pub async fn paste(
        &self,
        name: &str,
        world: Arc<dyn WorldAccessor>,
        origin: BlockPos,
        rotation: Rotation,
    ) -> Result<Option<PlacementReport>> {
        let Some(schematic) = self.get(name) else {
            return Ok(None);
        };
        let adapter = self.adapter.clone();
        let report = self
            .main
            .call(
                move || schematic.place(world.as_ref(), adapter.as_ref(), origin, rotation),
                self.config.main_context_timeout(),
            )
            .await??;
        Ok(Some(report))
    }

    // A poisoned lock still holds whole entries: inserts replace an Arc in one step.
    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(SchematicError::Encoding(format!(
            "'{}' is not a valid schematic name",
            name
        )));
    }
    Ok(())
}

type ScanResult = Vec<(PathBuf, Result<(String, Arc<dyn Schematic>)>)>;

fn scan_directory(
    directory: &Path,
    fallback: Option<&dyn FallbackLoader>,
    version: &str,
) -> Result<ScanResult> {
    if !directory.exists() {
        fs::create_dir_all(directory)?;
        log(
            format!("Created schematics directory {}", directory.display()),
            Info,
        );
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .collect();
    // `x.schem` sorts before `x.schematic`, so a native file wins a name clash.
    paths.sort();

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = schematic_name(&path) else {
            log(format!("Ignoring {}", path.display()), Debug);
            continue;
        };
        let result = load_file(&path, fallback, version).map(|schematic| (name, schematic));
        results.push((path, result));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use skyschem_common::{ChunkPos, Location};
    use skyschem_nbt::Compound;
    use skyschem_world::{BlockSnapshot, EntitySnapshot, MemoryWorld, TileState};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog_in(directory: &Path) -> (SchematicCatalog, Arc<MemoryWorld>) {
        let (main, _handle) = MainContext::start("catalog-test").unwrap();
        let world = Arc::new(MemoryWorld::new("1.8.8"));
        let config = CatalogConfig {
            directory: directory.to_path_buf(),
            ..CatalogConfig::default()
        };
        (SchematicCatalog::new(config, main, world.clone(), None), world)
    }

    fn empty_schematic() -> Arc<TagSchematic> {
        let root = TagSchematic::assemble((0, 0, 0), BlockPos::default(), vec![], vec![], "1.8.8");
        match TagSchematic::from_tag(root).unwrap() {
            Decoded::Schematic(schematic) => Arc::new(schematic),
            Decoded::SentinelEmpty => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_load_all_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let directory = dir.path().join("schematics");
        let (catalog, _world) = catalog_in(&directory);

        let summary = catalog.load_all().await.unwrap();
        assert!(summary.loaded.is_empty());
        assert!(summary.failed.is_empty());
        assert!(directory.is_dir());
        assert!(catalog.list().is_empty());
    }

    #[tokio::test]
    async fn test_engine_version_defaults_to_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, _world) = catalog_in(dir.path());
        assert_eq!(catalog.engine_version(), "1.8.8");
    }

    #[tokio::test]
    async fn test_save_registers_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, _world) = catalog_in(dir.path());

        let first = empty_schematic();
        let path = catalog.save("island", first).await.unwrap();
        assert_eq!(path, dir.path().join("island.schematic"));
        assert_eq!(catalog.list(), vec!["island".to_owned()]);

        catalog.save("island", empty_schematic()).await.unwrap();
        assert_eq!(catalog.list().len(), 1);
        assert!(catalog.get("island").unwrap().as_native().is_some());
    }

    #[tokio::test]
    async fn test_save_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, _world) = catalog_in(dir.path());
        for name in ["", "../escape", "a\\b"] {
            assert_matches!(
                catalog.save(name, empty_schematic()).await,
                Err(SchematicError::Encoding(_))
            );
        }
        assert!(catalog.list().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_capture_never_reaches_world() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, world) = catalog_in(dir.path());
        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(0, 300, 0),
            BlockPos::default(),
            "tower",
        );
        assert_matches!(
            catalog.capture(world, request).await,
            Err(SchematicError::Encoding(_))
        );
        assert!(catalog.get("tower").is_none());
        assert!(!dir.path().join("tower.schematic").exists());
    }

    struct CountingWorld {
        inner: MemoryWorld,
        reads: AtomicUsize,
    }

    impl WorldAccessor for CountingWorld {
        fn block_at(&self, pos: BlockPos) -> BlockSnapshot {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.block_at(pos)
        }

        fn entities_in_chunk_range(&self, min: ChunkPos, max: ChunkPos) -> Vec<EntitySnapshot> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.entities_in_chunk_range(min, max)
        }

        fn set_block(&self, pos: BlockPos, combined_id: i32) {
            self.inner.set_block(pos, combined_id)
        }

        fn set_tile_state(&self, pos: BlockPos, tile: TileState) {
            self.inner.set_tile_state(pos, tile)
        }

        fn spawn_entity(&self, entity_type: &str, location: Location, data: &Compound) {
            self.inner.spawn_entity(entity_type, location, data)
        }
    }

    #[tokio::test]
    async fn test_bad_name_is_rejected_before_reading_the_world() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, _world) = catalog_in(dir.path());
        let world = Arc::new(CountingWorld {
            inner: MemoryWorld::new("1.8.8"),
            reads: AtomicUsize::new(0),
        });
        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(3, 3, 3),
            BlockPos::default(),
            "a/b",
        );
        assert_matches!(
            catalog.capture(world.clone(), request).await,
            Err(SchematicError::Encoding(_))
        );
        assert_eq!(world.reads.load(Ordering::SeqCst), 0);

        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(3, 3, 3),
            BlockPos::default(),
            "ab",
        );
        catalog.capture(world.clone(), request).await.unwrap();
        assert!(world.reads.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_paste_unknown_name() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, world) = catalog_in(dir.path());
        let pasted = catalog
            .paste("missing", world, BlockPos::default(), Rotation::None)
            .await
            .unwrap();
        assert!(pasted.is_none());
    }
}
