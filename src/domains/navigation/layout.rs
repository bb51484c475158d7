use serde::{Deserialize, Serialize};

use super::obstacle::ObstacleDescriptor;

/// Everything the scene layer hands over to build a floor grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorLayout {
    pub floor_id: String,
    pub floor_size: f64,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDescriptor>,
    /// Overrides the configured generic padding for this floor.
    #[serde(default)]
    pub obstacle_padding: Option<usize>,
    /// Overrides the configured furniture-cluster padding for this floor.
    #[serde(default)]
    pub furniture_padding: Option<usize>,
}

impl FloorLayout {
    pub fn new(floor_id: impl Into<String>, floor_size: f64, obstacles: Vec<ObstacleDescriptor>) -> Self {
        Self {
            floor_id: floor_id.into(),
            floor_size,
            obstacles,
            obstacle_padding: None,
            furniture_padding: None,
        }
    }
}
