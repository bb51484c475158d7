use thiserror::Error;

use crate::domains::navigation::types::{Endpoint, GridCoord};

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Grid has not been initialized")]
    GridUninitialized,

    #[error("No walkable node near {endpoint} cell ({}, {})", cell.x, cell.z)]
    NoWalkableNodeNearby { endpoint: Endpoint, cell: GridCoord },

    #[error("No path found from ({}, {}) to ({}, {})", from.x, from.z, to.x, to.z)]
    NoPathFound { from: GridCoord, to: GridCoord },

    #[error("Invalid floor: {reason}")]
    InvalidFloor { reason: String },

    #[error("Floor layout not found: {name}")]
    LayoutNotFound { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type NavigationResult<T> = Result<T, NavigationError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
