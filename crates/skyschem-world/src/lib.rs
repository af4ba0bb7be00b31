pub mod adapter;
pub mod context;
pub mod memory;
pub mod world;

pub use adapter::{AdapterRegistry, EngineAdapter};
pub use context::{run_on_worker, MainContext};
pub use memory::MemoryWorld;
pub use world::{
    BannerPattern, BannerState, BlockSnapshot, EntityCategory, EntitySnapshot, ItemStack,
    Material, SkullState, TileState, WorldAccessor,
};
