use crate::record::{BlockExtra, BlockRecord, EntityRecord};
use skyschem_common::{BlockPos, Result, Rotation, SchematicError};
use skyschem_logger::{log, LogSeverity::Warning};
use skyschem_nbt::{Compound, TagKind, TagList};
use skyschem_world::{EngineAdapter, TileState, WorldAccessor};
use std::fmt::Debug;

pub const X_SIZE: &str = "xSize";
pub const Y_SIZE: &str = "ySize";
pub const Z_SIZE: &str = "zSize";
pub const BLOCKS: &str = "blocks";
pub const ENTITIES: &str = "entities";
pub const OFFSET_X: &str = "offsetX";
pub const OFFSET_Y: &str = "offsetY";
pub const OFFSET_Z: &str = "offsetZ";
pub const VERSION: &str = "version";

/// Anything the catalog can hold and paste, native or loaded by a fallback.
pub trait Schematic: Send + Sync + Debug {
    /// Short label for logs, e.g. `native`.
    fn format_name(&self) -> &str;

    /// Writes the schematic into `world` with its minimum corner at `origin`.
    fn place(
        &self,
        world: &dyn WorldAccessor,
        adapter: &dyn EngineAdapter,
        origin: BlockPos,
        rotation: Rotation,
    ) -> Result<PlacementReport>;

    fn as_native(&self) -> Option<&TagSchematic> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementReport {
    pub blocks_placed: usize,
    pub entities_spawned: usize,
    /// Where the saving actor stood relative to the pasted region.
    pub anchor: BlockPos,
}

/// Result of reading a root compound.
#[derive(Debug)]
pub enum Decoded {
    Schematic(TagSchematic),
    /// The root had no entries: the file is in some other format.
    SentinelEmpty,
}

/// A schematic in the native tag format.
#[derive(Debug, Clone, PartialEq)]
pub struct TagSchematic {
    root: Compound,
    size: (u8, u8, u8),
    offset: BlockPos,
    blocks: Vec<BlockRecord>,
    entities: Vec<EntityRecord>,
}

impl TagSchematic {
    /// Validates `root` and derives the accessors. An empty root is not an
    /// error but [`Decoded::SentinelEmpty`].
    pub fn from_tag(root: Compound) -> Result<Decoded> {
        if root.is_empty() {
            return Ok(Decoded::SentinelEmpty);
        }

        let size_of = |key: &str| {
            root.get_byte(key)
                .map(|size| size as u8)
                .ok_or_else(|| missing(key))
        };
        let size = (size_of(X_SIZE)?, size_of(Y_SIZE)?, size_of(Z_SIZE)?);

        let offset_of = |key: &str| root.get_int(key).ok_or_else(|| missing(key));
        let offset = BlockPos::new(
            offset_of(OFFSET_X)?,
            offset_of(OFFSET_Y)?,
            offset_of(OFFSET_Z)?,
        );

        let blocks = compound_list(&root, BLOCKS)?
            .compounds()
            .map(BlockRecord::from_compound)
            .collect::<Result<Vec<_>>>()?;
        let entities = compound_list(&root, ENTITIES)?
            .compounds()
            .map(EntityRecord::from_compound)
            .collect::<Result<Vec<_>>>()?;

        Ok(Decoded::Schematic(TagSchematic {
            root,
            size,
            offset,
            blocks,
            entities,
        }))
    }

    /// Builds the root compound for a freshly captured region.
    pub fn assemble(
        size: (u8, u8, u8),
        offset: BlockPos,
        blocks: Vec<Compound>,
        entities: Vec<Compound>,
        version: &str,
    ) -> Compound {
        Compound::new()
            .with(X_SIZE, size.0 as i8)
            .with(Y_SIZE, size.1 as i8)
            .with(Z_SIZE, size.2 as i8)
            .with(BLOCKS, TagList::of_compounds(blocks))
            .with(ENTITIES, TagList::of_compounds(entities))
            .with(OFFSET_X, offset.x)
            .with(OFFSET_Y, offset.y)
            .with(OFFSET_Z, offset.z)
            .with(VERSION, version)
    }

    pub fn to_tag(&self) -> Compound {
        self.root.clone()
    }

    pub fn root(&self) -> &Compound {
        &self.root
    }

    /// Inclusive span minus one on each axis.
    pub fn size(&self) -> (u8, u8, u8) {
        self.size
    }

    pub fn offset(&self) -> BlockPos {
        self.offset
    }

    pub fn version(&self) -> Option<&str> {
        self.root.get_str(VERSION)
    }

    pub fn blocks(&self) -> &[BlockRecord] {
        &self.blocks
    }

    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    /// The point entity deltas are measured from, relative to the minimum corner.
    pub fn center(&self) -> BlockPos {
        BlockPos::new(
            self.size.0 as i32 / 2,
            self.size.1 as i32 / 2,
            self.size.2 as i32 / 2,
        )
    }

    /// Warns when the file was written by a different engine version. Loading
    /// goes ahead either way.
    pub fn check_version(&self, engine_version: &str, source: &str) -> bool {
        match self.version() {
            Some(version) if version != engine_version => {
                log(
                    format!(
                        "Schematic {} was created in a different version ({} vs {}), may cause issues.",
                        source, version, engine_version
                    ),
                    Warning,
                );
                false
            }
            _ => true,
        }
    }
}

fn missing(key: &str) -> SchematicError {
    SchematicError::InvalidSchematic(format!("missing or mistyped '{}'", key))
}

/// The record list under `key`. An empty list may carry any element kind.
fn compound_list<'a>(root: &'a Compound, key: &str) -> Result<&'a TagList> {
    let list = root.get_list(key).ok_or_else(|| missing(key))?;
    if !list.is_empty() && list.kind() != TagKind::Compound {
        return Err(SchematicError::InvalidSchematic(format!(
            "'{}' holds {} elements rather than Compound",
            key,
            list.kind()
        )));
    }
    Ok(list)
}

impl Schematic for TagSchematic {
    fn format_name(&self) -> &str {
        "native"
    }

    fn place(
        &self,
        world: &dyn WorldAccessor,
        adapter: &dyn EngineAdapter,
        origin: BlockPos,
        rotation: Rotation,
    ) -> Result<PlacementReport> {
        for block in &self.blocks {
            let pos = origin + rotation.rotate_block(block.position);
            world.set_block(pos, block.combined_id);
            match &block.extra {
                BlockExtra::None => {}
                BlockExtra::FlowerPot(item) => adapter.set_flower_pot_content(pos, item),
                BlockExtra::Banner(banner) => world.set_tile_state(pos, TileState::Banner(banner.clone())),
                BlockExtra::Container(slots) => {
                    world.set_tile_state(pos, TileState::Container(slots.clone()))
                }
                BlockExtra::Skull(skull) => world.set_tile_state(pos, TileState::Skull(skull.clone())),
                BlockExtra::Sign(lines) => world.set_tile_state(pos, TileState::Sign(lines.clone())),
            }
        }

        let center = (origin + rotation.rotate_block(self.center())).to_location();
        for entity in &self.entities {
            let (dx, dy, dz) = rotation.rotate_delta(entity.delta);
            let location = center
                .offset(dx, dy, dz)
                .with_look(entity.yaw + rotation.yaw_degrees(), entity.pitch);
            world.spawn_entity(&entity.entity_type, location, &entity.data);
        }

        Ok(PlacementReport {
            blocks_placed: self.blocks.len(),
            entities_spawned: self.entities.len(),
            anchor: origin + rotation.rotate_block(self.offset),
        })
    }

    fn as_native(&self) -> Option<&TagSchematic> {
        Some(self)
    }
}
