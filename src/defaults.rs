//! Starter islands written into an empty schematics directory on first run.

use skyschem_common::{BlockPos, Result};
use skyschem_logger::{log, LogSeverity::Info};
use skyschem_schematic::storage::write_file;
use skyschem_schematic::{BlockExtra, BlockRecord, TagSchematic};
use skyschem_world::ItemStack;
use std::path::Path;

const DIRT: i32 = 3 << 4;
const CHEST: i32 = 54 << 4;

/// Name and surface block of each bundled island.
pub const BUNDLED: [(&str, i32); 3] = [("normal", 2 << 4), ("mycel", 110 << 4), ("desert", 12 << 4)];

/// A 3x3 two-layer island topped with `surface`, with a stocked chest in the middle.
pub fn starter_island(surface: i32, version: &str) -> Result<skyschem_nbt::Compound> {
    let mut blocks = Vec::new();
    for x in 0..3 {
        for z in 0..3 {
            for (y, combined_id) in [(0, DIRT), (1, surface)] {
                blocks.push(BlockRecord {
                    position: BlockPos::new(x, y, z),
                    combined_id,
                    extra: BlockExtra::None,
                });
            }
        }
    }
    blocks.push(BlockRecord {
        position: BlockPos::new(1, 2, 1),
        combined_id: CHEST,
        extra: BlockExtra::Container(vec![
            Some(ItemStack::new("ICE", 2)),
            Some(ItemStack::new("LAVA_BUCKET", 1)),
            None,
            Some(ItemStack::new("SAPLING", 1)),
        ]),
    });

    let blocks = blocks
        .iter()
        .map(BlockRecord::to_compound)
        .collect::<Result<Vec<_>>>()?;
    Ok(TagSchematic::assemble(
        (2, 2, 2),
        BlockPos::new(1, 2, 1),
        blocks,
        Vec::new(),
        version,
    ))
}

/// Writes every bundled island that has no file in `directory` yet.
pub fn extract_bundled(directory: &Path, version: &str) -> Result<usize> {
    let mut written = 0;
    for (name, surface) in BUNDLED {
        if directory.join(format!("{}.schematic", name)).exists() {
            continue;
        }
        write_file(directory, name, &starter_island(surface, version)?, false)?;
        log(format!("Extracted bundled schematic {}", name), Info);
        written += 1;
    }
    Ok(written)
}
