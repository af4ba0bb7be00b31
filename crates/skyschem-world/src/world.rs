//! The live-world side of a capture: what the engine reports for a block or an
//! entity, and the calls a placement makes to write one back.
//!
//! Implementations are only ever called from the main context.

use serde::{Deserialize, Serialize};
use skyschem_common::{BlockPos, ChunkPos, Location};
use skyschem_nbt::Compound;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Air,
    FlowerPot,
    Block(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: String,
    pub count: u8,
    pub damage: i16,
}

impl ItemStack {
    pub fn new(id: &str, count: u8) -> Self {
        ItemStack {
            id: id.to_owned(),
            count,
            damage: 0,
        }
    }

    pub fn with_damage(mut self, damage: i16) -> Self {
        self.damage = damage;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerPattern {
    pub color: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerState {
    pub base_color: String,
    pub patterns: Vec<BannerPattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkullState {
    pub skull_type: String,
    pub rotation: String,
    pub owner: Option<Uuid>,
    pub owner_name: Option<String>,
}

/// Engine-side block state attached to a block, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    None,
    Banner(BannerState),
    /// Slot contents in inventory order; `None` is an empty slot.
    Container(Vec<Option<ItemStack>>),
    Skull(SkullState),
    Sign([String; 4]),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub material: Material,
    /// Legacy data nibble / state flags as the engine reports them.
    pub data: u8,
    pub tile: TileState,
}

impl BlockSnapshot {
    pub fn air() -> Self {
        BlockSnapshot {
            material: Material::Air,
            data: 0,
            tile: TileState::None,
        }
    }

    pub fn is_air(&self) -> bool {
        self.material == Material::Air
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityCategory {
    Player,
    Living,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub entity_type: String,
    pub category: EntityCategory,
    pub location: Location,
    /// The engine's serialized entity state (health, equipment, name, ...).
    pub data: Compound,
}

pub trait WorldAccessor: Send + Sync {
    fn block_at(&self, pos: BlockPos) -> BlockSnapshot;

    /// Every entity in the chunks from `min` to `max`, both inclusive.
    fn entities_in_chunk_range(&self, min: ChunkPos, max: ChunkPos) -> Vec<EntitySnapshot>;

    fn set_block(&self, pos: BlockPos, combined_id: i32);

    fn set_tile_state(&self, pos: BlockPos, tile: TileState);

    fn spawn_entity(&self, entity_type: &str, location: Location, data: &Compound);
}
