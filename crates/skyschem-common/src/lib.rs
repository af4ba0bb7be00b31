pub mod error;
pub mod types;

pub use error::SchematicError;
pub use types::{BlockPos, ChunkPos, Location, Result, Rotation};
