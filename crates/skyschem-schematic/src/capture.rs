use crate::builder::{block_record, entity_record};
use crate::schematic::TagSchematic;
use skyschem_common::{BlockPos, Location, Result, SchematicError};
use skyschem_nbt::Compound;
use skyschem_world::{EngineAdapter, EntityCategory, WorldAccessor};

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub pos1: BlockPos,
    pub pos2: BlockPos,
    /// Stored as offsetX/Y/Z and handed back as the placement anchor.
    pub offset: BlockPos,
    pub name: String,
}

impl CaptureRequest {
    pub fn new(pos1: BlockPos, pos2: BlockPos, offset: BlockPos, name: &str) -> Self {
        CaptureRequest {
            pos1,
            pos2,
            offset,
            name: name.to_owned(),
        }
    }

    /// Offset measured from the block above the minimum corner to where the
    /// actor stands.
    pub fn from_actor(pos1: BlockPos, pos2: BlockPos, actor: Location, name: &str) -> Self {
        let (min, _) = BlockPos::normalize(pos1, pos2);
        let offset = actor.block() - (min + BlockPos::new(0, 1, 0));
        CaptureRequest::new(pos1, pos2, offset, name)
    }

    /// Minimum and maximum corners.
    pub fn bounds(&self) -> (BlockPos, BlockPos) {
        BlockPos::normalize(self.pos1, self.pos2)
    }

    /// Size fields (span minus one). Fails when an axis spans more than 256 blocks.
    pub fn size(&self) -> Result<(u8, u8, u8)> {
        let (min, max) = self.bounds();
        let axis = |span: i64, label: &str| {
            u8::try_from(span).map_err(|_| {
                SchematicError::Encoding(format!(
                    "region spans {} blocks along {}, at most 256 fit",
                    span + 1,
                    label
                ))
            })
        };
        Ok((
            axis(max.x as i64 - min.x as i64, "x")?,
            axis(max.y as i64 - min.y as i64, "y")?,
            axis(max.z as i64 - min.z as i64, "z")?,
        ))
    }
}

/// Reads the region into a root compound. Must run on the main context.
pub fn read_region(
    world: &dyn WorldAccessor,
    adapter: &dyn EngineAdapter,
    request: &CaptureRequest,
    version: &str,
) -> Result<Compound> {
    let size = request.size()?;
    let (min, max) = request.bounds();
    let (x_size, y_size, z_size) = (size.0 as i32, size.1 as i32, size.2 as i32);

    let mut blocks = Vec::new();
    for x in 0..=x_size {
        for z in 0..=z_size {
            for y in 0..=y_size {
                let relative = BlockPos::new(x, y, z);
                let world_pos = min + relative;
                let snapshot = world.block_at(world_pos);
                if snapshot.is_air() {
                    continue;
                }
                blocks.push(block_record(&snapshot, adapter, world_pos, relative)?);
            }
        }
    }

    let center = (min + BlockPos::new(x_size / 2, y_size / 2, z_size / 2)).to_location();
    let entities = world
        .entities_in_chunk_range(min.chunk(), max.chunk())
        .iter()
        .filter(|entity| entity.category == EntityCategory::Living)
        .filter(|entity| entity.location.block().within(min, max))
        .map(|entity| entity_record(entity, center))
        .collect();

    Ok(TagSchematic::assemble(size, request.offset, blocks, entities, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BlockRecord, EntityRecord};
    use crate::schematic::{BLOCKS, ENTITIES, X_SIZE, Y_SIZE, Z_SIZE};
    use assert_matches::assert_matches;
    use skyschem_world::{EntitySnapshot, MemoryWorld};

    fn living(entity_type: &str, category: EntityCategory, location: Location) -> EntitySnapshot {
        EntitySnapshot {
            entity_type: entity_type.to_owned(),
            category,
            location,
            data: Compound::new(),
        }
    }

    #[test]
    fn test_from_actor_offset() {
        let request = CaptureRequest::from_actor(
            BlockPos::new(10, 60, 10),
            BlockPos::new(0, 50, 0),
            Location::new(3.7, 52.0, -0.2),
            "island",
        );
        assert_eq!(request.offset, BlockPos::new(3, 1, -1));
    }

    #[test]
    fn test_oversized_region_is_rejected() {
        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(256, 0, 0),
            BlockPos::default(),
            "huge",
        );
        assert_matches!(request.size(), Err(SchematicError::Encoding(_)));

        let request = CaptureRequest::new(
            BlockPos::new(-128, 0, 0),
            BlockPos::new(127, 0, 0),
            BlockPos::default(),
            "edge",
        );
        assert_eq!(request.size().unwrap(), (255, 0, 0));
    }

    #[test]
    fn test_all_air_region_is_sparse() {
        let world = MemoryWorld::new("1.8.8");
        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(4, 4, 4),
            BlockPos::default(),
            "void",
        );
        let root = read_region(&world, &world, &request, "1.8.8").unwrap();
        assert!(root.get_list(BLOCKS).unwrap().is_empty());
        assert_eq!(root.get_byte(X_SIZE), Some(4));
    }

    #[test]
    fn test_iteration_order_is_x_z_y() {
        let world = MemoryWorld::new("1.8.8");
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    world.put_block(BlockPos::new(x, y, z), 1 << 4);
                }
            }
        }
        let request = CaptureRequest::new(
            BlockPos::new(1, 1, 1),
            BlockPos::new(0, 0, 0),
            BlockPos::default(),
            "cube",
        );
        let root = read_region(&world, &world, &request, "1.8.8").unwrap();
        let order: Vec<BlockPos> = root
            .get_list(BLOCKS)
            .unwrap()
            .compounds()
            .map(|block| BlockRecord::from_compound(block).unwrap().position)
            .collect();
        assert_eq!(
            order,
            vec![
                BlockPos::new(0, 0, 0),
                BlockPos::new(0, 1, 0),
                BlockPos::new(0, 0, 1),
                BlockPos::new(0, 1, 1),
                BlockPos::new(1, 0, 0),
                BlockPos::new(1, 1, 0),
                BlockPos::new(1, 0, 1),
                BlockPos::new(1, 1, 1),
            ]
        );
    }

    #[test]
    fn test_offset_and_sizes() {
        let world = MemoryWorld::new("1.8.8");
        world.put_block(BlockPos::new(0, 0, 0), 7 << 4);
        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(2, 2, 2),
            BlockPos::new(1, 1, 1),
            "offset",
        );
        let root = read_region(&world, &world, &request, "1.8.8").unwrap();
        assert_eq!(root.get_byte(X_SIZE), Some(2));
        assert_eq!(root.get_byte(Y_SIZE), Some(2));
        assert_eq!(root.get_byte(Z_SIZE), Some(2));
        assert_eq!(root.get_int("offsetX"), Some(1));
        assert_eq!(root.get_str("version"), Some("1.8.8"));
    }

    #[test]
    fn test_entities_filtered_and_centered() {
        let world = MemoryWorld::new("1.8.8");
        world.add_entity(living("COW", EntityCategory::Living, Location::new(1.5, 1.0, 1.5)));
        world.add_entity(living("STEVE", EntityCategory::Player, Location::new(1.0, 1.0, 1.0)));
        world.add_entity(living("ITEM", EntityCategory::Other, Location::new(1.0, 1.0, 1.0)));
        world.add_entity(living("PIG", EntityCategory::Living, Location::new(3.1, 1.0, 1.0)));
        world.add_entity(living("BAT", EntityCategory::Living, Location::new(2.9, 2.9, 0.0)));

        let request = CaptureRequest::new(
            BlockPos::new(0, 0, 0),
            BlockPos::new(2, 2, 2),
            BlockPos::default(),
            "pen",
        );
        let root = read_region(&world, &world, &request, "1.8.8").unwrap();
        let entities: Vec<EntityRecord> = root
            .get_list(ENTITIES)
            .unwrap()
            .compounds()
            .map(|entity| EntityRecord::from_compound(entity).unwrap())
            .collect();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_type, "COW");
        assert_eq!(entities[0].delta, (0.5, 0.0, 0.5));
        assert_eq!(entities[1].entity_type, "BAT");
        assert!((entities[1].delta.0 - 1.9).abs() < 1e-9);
    }
}
