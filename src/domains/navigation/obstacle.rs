use serde::{Deserialize, Serialize};

use super::types::{Aabb, WorldPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Generic,
    /// Desk groups and similar clusters that need a wider berth.
    FurnitureCluster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleDescriptor {
    pub name: String,
    pub bounds: Aabb,
    #[serde(default)]
    pub footprint: Option<Vec<WorldPoint>>,
    #[serde(default)]
    pub kind: ObstacleKind,
}

impl ObstacleDescriptor {
    pub fn new(name: impl Into<String>, bounds: Aabb, kind: ObstacleKind) -> Self {
        Self {
            name: name.into(),
            bounds,
            footprint: None,
            kind,
        }
    }

    pub fn with_footprint(mut self, footprint: Vec<WorldPoint>) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Footprint points, if the obstacle supplies a non-empty one.
    pub fn footprint_points(&self) -> Option<&[WorldPoint]> {
        match &self.footprint {
            Some(points) if !points.is_empty() => Some(points.as_slice()),
            _ => None,
        }
    }
}

/// Padding (in cells) applied around obstacles while rasterizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    pub obstacle: usize,
    pub furniture: usize,
}

impl Padding {
    pub const DEFAULT_OBSTACLE: usize = 1;
    pub const DEFAULT_FURNITURE: usize = 2;

    pub fn for_kind(&self, kind: ObstacleKind) -> usize {
        match kind {
            ObstacleKind::Generic => self.obstacle,
            ObstacleKind::FurnitureCluster => self.furniture,
        }
    }

    /// Thickness of the unwalkable ring along the floor edge.
    pub fn boundary(&self) -> usize {
        self.obstacle.max(2)
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            obstacle: Self::DEFAULT_OBSTACLE,
            furniture: Self::DEFAULT_FURNITURE,
        }
    }
}
