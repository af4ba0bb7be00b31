//! Capturing world regions into tagged schematics, and keeping a catalog of
//! them on disk.

pub mod builder;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod fallback;
pub mod record;
pub mod schematic;
pub mod storage;

pub use builder::{classify, TagBuilder};
pub use capture::CaptureRequest;
pub use catalog::{LoadSummary, SchematicCatalog};
pub use config::CatalogConfig;
pub use fallback::FallbackLoader;
pub use record::{BlockExtra, BlockRecord, EntityRecord};
pub use schematic::{Decoded, PlacementReport, Schematic, TagSchematic};
