use crate::world::ItemStack;
use skyschem_common::BlockPos;
use skyschem_logger::{log, LogSeverity::Debug};
use std::sync::Arc;

/// Access to engine internals that differ between engine versions.
pub trait EngineAdapter: Send + Sync {
    /// Version string of the running engine, e.g. `1.8.8`.
    fn version(&self) -> &str;

    /// Block type and sub-state packed the way the engine stores them.
    fn combined_block_id(&self, pos: BlockPos) -> i32;

    fn flower_pot_content(&self, pos: BlockPos) -> Option<ItemStack>;

    fn set_flower_pot_content(&self, pos: BlockPos, item: &ItemStack);
}

/// Strips build metadata: `1.8.8-R0.1-SNAPSHOT` becomes `1.8.8`.
pub fn short_version(raw: &str) -> &str {
    raw.split('-').next().unwrap_or(raw)
}

type AdapterFactory = Box<dyn Fn() -> Arc<dyn EngineAdapter> + Send + Sync>;

/// Adapters keyed by the engine version prefix they support.
#[derive(Default)]
pub struct AdapterRegistry {
    factories: Vec<(String, AdapterFactory)>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, version_prefix: &str, factory: F)
    where
        F: Fn() -> Arc<dyn EngineAdapter> + Send + Sync + 'static,
    {
        self.factories
            .push((version_prefix.to_owned(), Box::new(factory)));
    }

    /// Builds the adapter whose prefix is the longest match for `engine_version`.
    pub fn select(&self, engine_version: &str) -> Option<Arc<dyn EngineAdapter>> {
        let version = short_version(engine_version);
        let (prefix, factory) = self
            .factories
            .iter()
            .filter(|(prefix, _)| matches_prefix(version, prefix))
            .max_by_key(|(prefix, _)| prefix.len())?;
        log(
            format!("Selected engine adapter {} for version {}", prefix, version),
            Debug,
        );
        Some(factory())
    }
}

/// `1.8` matches `1.8` and `1.8.8` but not `1.80`.
fn matches_prefix(version: &str, prefix: &str) -> bool {
    match version.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdapter(&'static str);

    impl EngineAdapter for FixedAdapter {
        fn version(&self) -> &str {
            self.0
        }

        fn combined_block_id(&self, _pos: BlockPos) -> i32 {
            0
        }

        fn flower_pot_content(&self, _pos: BlockPos) -> Option<ItemStack> {
            None
        }

        fn set_flower_pot_content(&self, _pos: BlockPos, _item: &ItemStack) {}
    }

    fn registry() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register("1.8", || Arc::new(FixedAdapter("v1_8")));
        registry.register("1.12", || Arc::new(FixedAdapter("v1_12")));
        registry.register("1.12.2", || Arc::new(FixedAdapter("v1_12_2")));
        registry
    }

    #[test]
    fn test_short_version() {
        assert_eq!(short_version("1.8.8-R0.1-SNAPSHOT"), "1.8.8");
        assert_eq!(short_version("1.14"), "1.14");
    }

    #[test]
    fn test_select_longest_prefix() {
        let registry = registry();
        assert_eq!(registry.select("1.12.2-R0.1").unwrap().version(), "v1_12_2");
        assert_eq!(registry.select("1.12.1").unwrap().version(), "v1_12");
        assert_eq!(registry.select("1.8.8").unwrap().version(), "v1_8");
    }

    #[test]
    fn test_select_requires_component_boundary() {
        let registry = registry();
        assert!(registry.select("1.80").is_none());
        assert!(registry.select("1.9").is_none());
    }
}
