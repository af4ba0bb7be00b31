//! A world held entirely in memory. Used by tests and the bundled demo binary.

use crate::adapter::EngineAdapter;
use crate::world::{
    BlockSnapshot, EntitySnapshot, ItemStack, Material, TileState, WorldAccessor,
};
use skyschem_common::{BlockPos, ChunkPos, Location};
use skyschem_nbt::Compound;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
struct StoredBlock {
    snapshot: BlockSnapshot,
    combined_id: i32,
    flower: Option<ItemStack>,
}

#[derive(Default)]
struct WorldState {
    blocks: HashMap<BlockPos, StoredBlock>,
    entities: Vec<EntitySnapshot>,
}

pub struct MemoryWorld {
    version: String,
    state: RwLock<WorldState>,
}

impl MemoryWorld {
    pub fn new(version: &str) -> Self {
        MemoryWorld {
            version: version.to_owned(),
            state: RwLock::new(WorldState::default()),
        }
    }

    // A poisoned lock only means a test thread panicked mid-write; the maps are still usable.
    fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Places a plain block. A combined id of 0 clears the position.
    pub fn put_block(&self, pos: BlockPos, combined_id: i32) {
        if combined_id == 0 {
            self.write().blocks.remove(&pos);
            return;
        }
        let snapshot = BlockSnapshot {
            material: Material::Block(format!("#{}", combined_id >> 4)),
            data: (combined_id & 0xf) as u8,
            tile: TileState::None,
        };
        self.write().blocks.insert(
            pos,
            StoredBlock {
                snapshot,
                combined_id,
                flower: None,
            },
        );
    }

    /// Places a block with an explicit material and tile state.
    pub fn put_snapshot(&self, pos: BlockPos, combined_id: i32, snapshot: BlockSnapshot) {
        self.write().blocks.insert(
            pos,
            StoredBlock {
                snapshot,
                combined_id,
                flower: None,
            },
        );
    }

    pub fn put_flower_pot(&self, pos: BlockPos, combined_id: i32, flower: Option<ItemStack>) {
        let snapshot = BlockSnapshot {
            material: Material::FlowerPot,
            data: 0,
            tile: TileState::None,
        };
        self.write().blocks.insert(
            pos,
            StoredBlock {
                snapshot,
                combined_id,
                flower,
            },
        );
    }

    pub fn add_entity(&self, entity: EntitySnapshot) {
        self.write().entities.push(entity);
    }

    pub fn combined_id_at(&self, pos: BlockPos) -> Option<i32> {
        self.read().blocks.get(&pos).map(|block| block.combined_id)
    }

    pub fn tile_at(&self, pos: BlockPos) -> TileState {
        self.read()
            .blocks
            .get(&pos)
            .map(|block| block.snapshot.tile.clone())
            .unwrap_or_default()
    }

    pub fn block_count(&self) -> usize {
        self.read().blocks.len()
    }

    pub fn entities(&self) -> Vec<EntitySnapshot> {
        self.read().entities.clone()
    }
}

impl WorldAccessor for MemoryWorld {
    fn block_at(&self, pos: BlockPos) -> BlockSnapshot {
        self.read()
            .blocks
            .get(&pos)
            .map(|block| block.snapshot.clone())
            .unwrap_or_else(BlockSnapshot::air)
    }

    fn entities_in_chunk_range(&self, min: ChunkPos, max: ChunkPos) -> Vec<EntitySnapshot> {
        self.read()
            .entities
            .iter()
            .filter(|entity| {
                let chunk = entity.location.block().chunk();
                chunk.x >= min.x && chunk.x <= max.x && chunk.z >= min.z && chunk.z <= max.z
            })
            .cloned()
            .collect()
    }

    fn set_block(&self, pos: BlockPos, combined_id: i32) {
        self.put_block(pos, combined_id);
    }

    fn set_tile_state(&self, pos: BlockPos, tile: TileState) {
        if let Some(block) = self.write().blocks.get_mut(&pos) {
            block.snapshot.tile = tile;
        }
    }

    fn spawn_entity(&self, entity_type: &str, location: Location, data: &Compound) {
        self.add_entity(EntitySnapshot {
            entity_type: entity_type.to_owned(),
            category: crate::world::EntityCategory::Living,
            location,
            data: data.clone(),
        });
    }
}

impl EngineAdapter for MemoryWorld {
    fn version(&self) -> &str {
        &self.version
    }

    fn combined_block_id(&self, pos: BlockPos) -> i32 {
        self.combined_id_at(pos).unwrap_or(0)
    }

    fn flower_pot_content(&self, pos: BlockPos) -> Option<ItemStack> {
        self.read()
            .blocks
            .get(&pos)
            .and_then(|block| block.flower.clone())
    }

    fn set_flower_pot_content(&self, pos: BlockPos, item: &ItemStack) {
        if let Some(block) = self.write().blocks.get_mut(&pos) {
            block.snapshot.material = Material::FlowerPot;
            block.flower = Some(item.clone());
        }
    }
}
