use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in world space. The floor lies in the x/z plane, y points up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &WorldPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Integer cell index. `x` is the column, `z` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub z: usize,
}

impl GridCoord {
    pub const fn new(x: usize, z: usize) -> Self {
        Self { x, z }
    }

    pub fn manhattan(&self, other: &GridCoord) -> u32 {
        (self.x.abs_diff(other.x) + self.z.abs_diff(other.z)) as u32
    }
}

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Aabb {
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    /// Box of `width` (x) by `depth` (z) centred on `center`, with zero height.
    pub fn centered(center: WorldPoint, width: f64, depth: f64) -> Self {
        Self {
            min: WorldPoint::new(center.x - width / 2.0, center.y, center.z - depth / 2.0),
            max: WorldPoint::new(center.x + width / 2.0, center.y, center.z + depth / 2.0),
        }
    }
}

/// Which end of a path request a failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}
