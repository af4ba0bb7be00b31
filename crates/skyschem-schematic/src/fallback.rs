use crate::schematic::Schematic;
use std::path::Path;
use std::sync::Arc;

/// Reader for a foreign schematic format, consulted when a file's root decodes
/// to an empty compound.
pub trait FallbackLoader: Send + Sync {
    /// Label used in log lines.
    fn name(&self) -> &str;

    /// Returns `None` when the file is not something this loader understands.
    fn try_load(&self, path: &Path) -> Option<Arc<dyn Schematic>>;
}
