use crate::record::{position_tag, BlockExtra, EntityRecord, COMBINED_ID, POSITION};
use skyschem_common::{BlockPos, Location, Result};
use skyschem_nbt::Compound;
use skyschem_world::{BlockSnapshot, EngineAdapter, EntitySnapshot, Material, TileState};

/// Picks the single extra payload for a block. When a block matches more than
/// one kind the first of banner, container, flower pot, skull, sign wins.
pub fn classify(snapshot: &BlockSnapshot, adapter: &dyn EngineAdapter, pos: BlockPos) -> BlockExtra {
    if let TileState::Banner(banner) = &snapshot.tile {
        return BlockExtra::Banner(banner.clone());
    }
    if let TileState::Container(slots) = &snapshot.tile {
        return BlockExtra::Container(slots.clone());
    }
    if snapshot.material == Material::FlowerPot {
        return match adapter.flower_pot_content(pos) {
            Some(item) => BlockExtra::FlowerPot(item),
            None => BlockExtra::None,
        };
    }
    match &snapshot.tile {
        TileState::Skull(skull) => BlockExtra::Skull(skull.clone()),
        TileState::Sign(lines) => BlockExtra::Sign(lines.clone()),
        _ => BlockExtra::None,
    }
}

/// Assembles one block or entity record.
#[derive(Debug, Default)]
pub struct TagBuilder {
    compound: Compound,
}

impl TagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block_position(mut self, pos: BlockPos) -> Self {
        self.compound.insert(POSITION, position_tag(pos));
        self
    }

    pub fn with_combined_id(mut self, combined_id: i32) -> Self {
        self.compound.insert(COMBINED_ID, combined_id);
        self
    }

    pub fn apply_extra(mut self, extra: &BlockExtra) -> Result<Self> {
        extra.write_into(&mut self.compound)?;
        Ok(self)
    }

    /// Records `entity` relative to `center`, keeping the entity's fractional
    /// position.
    pub fn apply_entity(mut self, entity: &EntitySnapshot, center: Location) -> Self {
        let record = EntityRecord {
            entity_type: entity.entity_type.clone(),
            delta: (
                entity.location.x - center.x,
                entity.location.y - center.y,
                entity.location.z - center.z,
            ),
            yaw: entity.location.yaw,
            pitch: entity.location.pitch,
            data: entity.data.clone(),
        };
        for (name, tag) in record.to_compound().iter() {
            self.compound.insert(name, tag.clone());
        }
        self
    }

    pub fn build(self) -> Compound {
        self.compound
    }
}

/// Record for the non-air block at `world_pos`, stored at `relative`.
pub fn block_record(
    snapshot: &BlockSnapshot,
    adapter: &dyn EngineAdapter,
    world_pos: BlockPos,
    relative: BlockPos,
) -> Result<Compound> {
    let extra = classify(snapshot, adapter, world_pos);
    Ok(TagBuilder::new()
        .with_block_position(relative)
        .with_combined_id(adapter.combined_block_id(world_pos))
        .apply_extra(&extra)?
        .build())
}

pub fn entity_record(entity: &EntitySnapshot, center: Location) -> Compound {
    TagBuilder::new().apply_entity(entity, center).build()
}
