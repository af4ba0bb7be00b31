use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

pub type Result<T> = std::result::Result<T, crate::error::SchematicError>;

/// Integer block coordinate. Inside a stored schematic this is always relative
/// to the minimum corner of the captured region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component-wise minimum and maximum of two corners.
    pub fn normalize(a: BlockPos, b: BlockPos) -> (BlockPos, BlockPos) {
        (
            BlockPos::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            BlockPos::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    }

    pub fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: self.x >> 4,
            z: self.z >> 4,
        }
    }

    /// Inclusive containment on all three axes.
    pub fn within(&self, min: BlockPos, max: BlockPos) -> bool {
        self.x >= min.x
            && self.x <= max.x
            && self.y >= min.y
            && self.y <= max.y
            && self.z >= min.z
            && self.z <= max.z
    }

    pub fn to_location(&self) -> Location {
        Location::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, rhs: BlockPos) -> BlockPos {
        BlockPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

/// Precise world position, as reported for entities and actors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn with_look(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// The block containing this location (floors every axis).
    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Location {
        Location {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            ..*self
        }
    }
}

/// Quarter turns about the vertical axis, clockwise seen from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn rotate_block(&self, pos: BlockPos) -> BlockPos {
        let (x, z) = match self {
            Rotation::None => (pos.x, pos.z),
            Rotation::Clockwise90 => (-pos.z, pos.x),
            Rotation::Clockwise180 => (-pos.x, -pos.z),
            Rotation::Clockwise270 => (pos.z, -pos.x),
        };
        BlockPos::new(x, pos.y, z)
    }

    pub fn rotate_delta(&self, (x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
        match self {
            Rotation::None => (x, y, z),
            Rotation::Clockwise90 => (-z, y, x),
            Rotation::Clockwise180 => (-x, y, -z),
            Rotation::Clockwise270 => (z, y, -x),
        }
    }

    /// Added to an entity's yaw so it keeps facing the same way relative to the build.
    pub fn yaw_degrees(&self) -> f32 {
        match self {
            Rotation::None => 0.0,
            Rotation::Clockwise90 => 90.0,
            Rotation::Clockwise180 => 180.0,
            Rotation::Clockwise270 => 270.0,
        }
    }
}
