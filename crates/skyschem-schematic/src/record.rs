//! Block and entity records as they sit inside a schematic's tag tree.

use skyschem_common::{BlockPos, Result, SchematicError};
use skyschem_nbt::{Compound, Tag, TagKind, TagList};
use skyschem_world::{BannerPattern, BannerState, ItemStack, SkullState};
use uuid::Uuid;

pub const POSITION: &str = "position";
pub const COMBINED_ID: &str = "combinedId";
pub const BANNER: &str = "banner";
pub const CONTENTS: &str = "contents";
pub const FLOWER: &str = "flower";
pub const SKULL: &str = "skull";
pub const SIGN_LINES: &str = "signLines";

/// Keys of the optional per-block payloads, in classification priority order.
pub const PAYLOAD_KEYS: [&str; 5] = [BANNER, CONTENTS, FLOWER, SKULL, SIGN_LINES];

pub const ENTITY_TYPE: &str = "entityType";
pub const ENTITY_OFFSET: &str = "offset";
pub const ENTITY_DATA: &str = "data";

/// The one extra payload a block may carry besides its combined id.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BlockExtra {
    #[default]
    None,
    Banner(BannerState),
    /// Slot contents in inventory order; `None` is an empty slot.
    Container(Vec<Option<ItemStack>>),
    FlowerPot(ItemStack),
    Skull(SkullState),
    Sign([String; 4]),
}

impl BlockExtra {
    /// Fails only for a container slot past 255, which the byte slot field cannot hold.
    pub(crate) fn write_into(&self, compound: &mut Compound) -> Result<()> {
        match self {
            BlockExtra::None => {}
            BlockExtra::Banner(banner) => {
                let patterns = banner
                    .patterns
                    .iter()
                    .map(|p| {
                        Compound::new()
                            .with("color", p.color.as_str())
                            .with("pattern", p.pattern.as_str())
                    })
                    .collect();
                compound.insert(
                    BANNER,
                    Compound::new()
                        .with("baseColor", banner.base_color.as_str())
                        .with("patterns", TagList::of_compounds(patterns)),
                );
            }
            BlockExtra::Container(slots) => {
                let mut items = Vec::new();
                for (slot, item) in slots.iter().enumerate() {
                    let Some(item) = item else { continue };
                    let slot = u8::try_from(slot).map_err(|_| {
                        SchematicError::Encoding(format!(
                            "container slot {} does not fit in a byte",
                            slot
                        ))
                    })?;
                    // Stored as a byte and read back unsigned, so 128..=255 survive.
                    items.push(item_to_compound(item).with("Slot", slot as i8));
                }
                compound.insert(CONTENTS, TagList::of_compounds(items));
            }
            BlockExtra::FlowerPot(item) => {
                compound.insert(FLOWER, item_to_compound(item));
            }
            BlockExtra::Skull(skull) => {
                let mut tag = Compound::new()
                    .with("skullType", skull.skull_type.as_str())
                    .with("rotation", skull.rotation.as_str());
                if let Some(owner) = skull.owner {
                    tag.insert("owner", owner.to_string());
                }
                if let Some(name) = &skull.owner_name {
                    tag.insert("ownerName", name.as_str());
                }
                compound.insert(SKULL, tag);
            }
            BlockExtra::Sign(lines) => {
                compound.insert(SIGN_LINES, TagList::of_strings(lines.iter().cloned()));
            }
        }
        Ok(())
    }

    /// Reads whichever payload is present, following the capture priority order.
    pub(crate) fn read_from(compound: &Compound) -> Result<BlockExtra> {
        if let Some(banner) = compound.get_compound(BANNER) {
            let patterns = banner
                .get_list("patterns")
                .map(|list| {
                    list.compounds()
                        .map(|p| BannerPattern {
                            color: p.get_str("color").unwrap_or_default().to_owned(),
                            pattern: p.get_str("pattern").unwrap_or_default().to_owned(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            return Ok(BlockExtra::Banner(BannerState {
                base_color: banner.get_str("baseColor").unwrap_or_default().to_owned(),
                patterns,
            }));
        }

        if let Some(contents) = compound.get_list(CONTENTS) {
            let mut slots: Vec<Option<ItemStack>> = Vec::new();
            for item in contents.compounds() {
                let slot = item.get_byte("Slot").ok_or_else(|| {
                    SchematicError::InvalidSchematic("container item without a slot".to_owned())
                })? as u8 as usize;
                if slots.len() <= slot {
                    slots.resize(slot + 1, None);
                }
                slots[slot] = Some(item_from_compound(item)?);
            }
            return Ok(BlockExtra::Container(slots));
        }

        if let Some(flower) = compound.get_compound(FLOWER) {
            return Ok(BlockExtra::FlowerPot(item_from_compound(flower)?));
        }

        if let Some(skull) = compound.get_compound(SKULL) {
            let owner = match skull.get_str("owner") {
                Some(raw) => Some(Uuid::parse_str(raw).map_err(|e| {
                    SchematicError::InvalidSchematic(format!("bad skull owner '{}': {}", raw, e))
                })?),
                None => None,
            };
            return Ok(BlockExtra::Skull(SkullState {
                skull_type: skull.get_str("skullType").unwrap_or_default().to_owned(),
                rotation: skull.get_str("rotation").unwrap_or_default().to_owned(),
                owner,
                owner_name: skull.get_str("ownerName").map(str::to_owned),
            }));
        }

        if let Some(lines) = compound.get_list(SIGN_LINES) {
            let mut sign: [String; 4] = Default::default();
            for (slot, line) in sign.iter_mut().zip(lines.iter()) {
                *slot = line.as_str().unwrap_or_default().to_owned();
            }
            return Ok(BlockExtra::Sign(sign));
        }

        Ok(BlockExtra::None)
    }
}

fn item_to_compound(item: &ItemStack) -> Compound {
    Compound::new()
        .with("id", item.id.as_str())
        .with("Count", item.count as i8)
        .with("Damage", item.damage as i32)
}

fn item_from_compound(compound: &Compound) -> Result<ItemStack> {
    let id = compound
        .get_str("id")
        .ok_or_else(|| SchematicError::InvalidSchematic("item without an id".to_owned()))?;
    Ok(ItemStack {
        id: id.to_owned(),
        count: compound.get_byte("Count").unwrap_or(1) as u8,
        damage: compound.get_int("Damage").unwrap_or(0) as i16,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    /// Relative to the minimum corner of the captured region.
    pub position: BlockPos,
    pub combined_id: i32,
    pub extra: BlockExtra,
}

impl BlockRecord {
    pub fn to_compound(&self) -> Result<Compound> {
        let mut compound = Compound::new()
            .with(POSITION, position_tag(self.position))
            .with(COMBINED_ID, self.combined_id);
        self.extra.write_into(&mut compound)?;
        Ok(compound)
    }

    pub fn from_compound(compound: &Compound) -> Result<Self> {
        let position = compound
            .get_list(POSITION)
            .and_then(position_from_list)
            .ok_or_else(|| {
                SchematicError::InvalidSchematic("block record without a valid position".to_owned())
            })?;
        let combined_id = compound.get_int(COMBINED_ID).ok_or_else(|| {
            SchematicError::InvalidSchematic(format!("block at {:?} has no combined id", position))
        })?;
        Ok(BlockRecord {
            position,
            combined_id,
            extra: BlockExtra::read_from(compound)?,
        })
    }
}

pub(crate) fn position_tag(pos: BlockPos) -> TagList {
    TagList::of_ints(&[pos.x, pos.y, pos.z])
}

fn position_from_list(list: &TagList) -> Option<BlockPos> {
    if list.kind() != TagKind::Int || list.len() != 3 {
        return None;
    }
    let coord = |i: usize| list.get(i).and_then(Tag::as_i32);
    Some(BlockPos::new(coord(0)?, coord(1)?, coord(2)?))
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub entity_type: String,
    /// Offset from the region center at the entity's own precision.
    pub delta: (f64, f64, f64),
    pub yaw: f32,
    pub pitch: f32,
    /// The engine's entity snapshot, kept as-is.
    pub data: Compound,
}

impl EntityRecord {
    pub fn to_compound(&self) -> Compound {
        let (dx, dy, dz) = self.delta;
        Compound::new()
            .with(ENTITY_TYPE, self.entity_type.as_str())
            .with(
                ENTITY_OFFSET,
                format!("{},{},{},{},{}", dx, dy, dz, self.yaw, self.pitch),
            )
            .with(ENTITY_DATA, self.data.clone())
    }

    pub fn from_compound(compound: &Compound) -> Result<Self> {
        let invalid = |what: &str| SchematicError::InvalidSchematic(format!("entity {}", what));
        let entity_type = compound
            .get_str(ENTITY_TYPE)
            .ok_or_else(|| invalid("without a type"))?;
        let raw = compound
            .get_str(ENTITY_OFFSET)
            .ok_or_else(|| invalid("without an offset"))?;

        let parts: Vec<&str> = raw.split(',').collect();
        if parts.len() != 3 && parts.len() != 5 {
            return Err(invalid(&format!("offset '{}' is not x,y,z[,yaw,pitch]", raw)));
        }
        let number = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| invalid(&format!("offset '{}' is not numeric", raw)))
        };
        let delta = (number(parts[0])?, number(parts[1])?, number(parts[2])?);
        let (yaw, pitch) = if parts.len() == 5 {
            (number(parts[3])? as f32, number(parts[4])? as f32)
        } else {
            (0.0, 0.0)
        };

        Ok(EntityRecord {
            entity_type: entity_type.to_owned(),
            delta,
            yaw,
            pitch,
            data: compound.get_compound(ENTITY_DATA).cloned().unwrap_or_default(),
        })
    }
}
