#![allow(dead_code)]

use skyschem_common::{BlockPos, Location};
use skyschem_nbt::{encode, Compound, Tag};
use skyschem_schematic::{CatalogConfig, FallbackLoader, SchematicCatalog};
use skyschem_world::{
    BlockSnapshot, EntityCategory, EntitySnapshot, ItemStack, MainContext, Material,
    MemoryWorld, TileState,
};
use std::path::Path;
use std::sync::Arc;

pub const VERSION: &str = "1.8.8";

pub struct Harness {
    pub catalog: Arc<SchematicCatalog>,
    pub world: Arc<MemoryWorld>,
    pub main: MainContext,
}

pub fn harness(directory: &Path) -> Harness {
    harness_with(directory, None)
}

pub fn harness_with(directory: &Path, fallback: Option<Arc<dyn FallbackLoader>>) -> Harness {
    let (main, _thread) = MainContext::start("main-integration").unwrap();
    let world = Arc::new(MemoryWorld::new(VERSION));
    let config = CatalogConfig {
        directory: directory.to_path_buf(),
        ..CatalogConfig::default()
    };
    let catalog = Arc::new(SchematicCatalog::new(
        config,
        main.clone(),
        world.clone(),
        fallback,
    ));
    Harness {
        catalog,
        world,
        main,
    }
}

/// A 3x3x3 starter island: a dirt floor, a sign, a potted flower and a cow.
pub fn build_island(world: &MemoryWorld, min: BlockPos) {
    for x in 0..3 {
        for z in 0..3 {
            world.put_block(min + BlockPos::new(x, 0, z), 3 << 4);
        }
    }
    world.put_snapshot(
        min + BlockPos::new(0, 1, 0),
        63 << 4,
        BlockSnapshot {
            material: Material::Block("SIGN_POST".to_owned()),
            data: 0,
            tile: TileState::Sign([
                "Welcome".to_owned(),
                String::new(),
                "to your".to_owned(),
                "island".to_owned(),
            ]),
        },
    );
    world.put_flower_pot(
        min + BlockPos::new(2, 1, 2),
        140 << 4,
        Some(ItemStack::new("RED_ROSE", 1)),
    );
    world.add_entity(EntitySnapshot {
        entity_type: "COW".to_owned(),
        category: EntityCategory::Living,
        location: Location::new(
            min.x as f64 + 1.5,
            min.y as f64 + 1.0,
            min.z as f64 + 1.5,
        ),
        data: Compound::new(),
    });
}

/// Bytes of a file whose root carries no entries.
pub fn empty_root_bytes() -> Vec<u8> {
    encode(&Tag::Compound(Compound::new())).unwrap()
}
