pub mod bootstrap;
pub mod defaults;

pub use bootstrap::{load_config, start, Bootstrap};
pub use skyschem_common::{BlockPos, Location, Result, Rotation, SchematicError};
pub use skyschem_schematic::{
    CaptureRequest, CatalogConfig, FallbackLoader, PlacementReport, Schematic, SchematicCatalog,
    TagSchematic,
};
