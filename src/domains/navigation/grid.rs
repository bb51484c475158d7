use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::{ObstacleDescriptor, Padding};
use super::types::{Aabb, GridCoord, WorldPoint};
use crate::common::{NavigationError, NavigationResult};

pub const DEFAULT_CELL_SIZE: f64 = 0.5;

/// Largest grid accepted, in cells (4096 x 4096).
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Dimensions and origin of a grid, detached from its cell contents.
///
/// The floor is centred on the world origin, so the offset on each axis is
/// half the floor size. Both transforms clamp to the grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFrame {
    pub width: usize,
    pub depth: usize,
    pub cell_size: f64,
    pub offset_x: f64,
    pub offset_z: f64,
}

impl GridFrame {
    pub fn new(floor_size: f64, cell_size: f64) -> NavigationResult<Self> {
        if !floor_size.is_finite() || floor_size <= 0.0 {
            return Err(NavigationError::InvalidFloor {
                reason: format!("floor size must be positive, got {}", floor_size),
            });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(NavigationError::InvalidFloor {
                reason: format!("cell size must be positive, got {}", cell_size),
            });
        }
        let per_axis = (floor_size / cell_size).ceil().max(1.0);
        let too_large = || NavigationError::InvalidFloor {
            reason: format!(
                "floor {} at cell size {} exceeds {} cells",
                floor_size, cell_size, MAX_GRID_CELLS
            ),
        };
        if per_axis > MAX_GRID_CELLS as f64 {
            return Err(too_large());
        }
        let cells = per_axis as usize;
        match cells.checked_mul(cells) {
            Some(total) if total <= MAX_GRID_CELLS => {}
            _ => return Err(too_large()),
        }
        Ok(Self {
            width: cells,
            depth: cells,
            cell_size,
            offset_x: floor_size / 2.0,
            offset_z: floor_size / 2.0,
        })
    }

    pub fn world_to_grid(&self, point: &WorldPoint) -> GridCoord {
        GridCoord {
            x: Self::axis_to_cell(point.x + self.offset_x, self.cell_size, self.width),
            z: Self::axis_to_cell(point.z + self.offset_z, self.cell_size, self.depth),
        }
    }

    /// Centre of `cell` in world space, on the floor plane (y = 0).
    pub fn grid_to_world(&self, cell: &GridCoord) -> WorldPoint {
        let x = cell.x.min(self.width - 1) as f64;
        let z = cell.z.min(self.depth - 1) as f64;
        WorldPoint {
            x: x * self.cell_size - self.offset_x + self.cell_size / 2.0,
            y: 0.0,
            z: z * self.cell_size - self.offset_z + self.cell_size / 2.0,
        }
    }

    pub fn in_bounds(&self, cell: &GridCoord) -> bool {
        cell.x < self.width && cell.z < self.depth
    }

    /// Whether `point` lies on the floor at all (before clamping).
    pub fn contains_world(&self, point: &WorldPoint) -> bool {
        let fx = point.x + self.offset_x;
        let fz = point.z + self.offset_z;
        fx >= 0.0
            && fz >= 0.0
            && fx < self.width as f64 * self.cell_size
            && fz < self.depth as f64 * self.cell_size
    }

    fn overlaps(&self, bounds: &Aabb) -> bool {
        let (min_x, max_x) = ordered(bounds.min.x, bounds.max.x);
        let (min_z, max_z) = ordered(bounds.min.z, bounds.max.z);
        max_x >= -self.offset_x
            && max_z >= -self.offset_z
            && min_x < self.width as f64 * self.cell_size - self.offset_x
            && min_z < self.depth as f64 * self.cell_size - self.offset_z
    }

    fn axis_to_cell(shifted: f64, cell_size: f64, cells: usize) -> usize {
        let index = (shifted / cell_size).floor();
        // NaN lands on the first cell
        if !(index >= 0.0) {
            return 0;
        }
        (index as usize).min(cells - 1)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone)]
pub struct WalkableGrid {
    frame: GridFrame,
    padding: Padding,
    cells: Vec<bool>,
}

impl WalkableGrid {
    /// Rasterizes `obstacles` onto a fresh grid covering a square floor of
    /// `floor_size` world units.
    pub fn build(
        floor_size: f64,
        cell_size: f64,
        obstacles: &[ObstacleDescriptor],
        padding: Padding,
    ) -> NavigationResult<Self> {
        let frame = GridFrame::new(floor_size, cell_size)?;
        let mut grid = Self {
            frame,
            padding,
            cells: vec![true; frame.width * frame.depth],
        };
        grid.mark_boundary();
        for obstacle in obstacles {
            grid.rasterize(obstacle);
        }
        Ok(grid)
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn width(&self) -> usize {
        self.frame.width
    }

    pub fn depth(&self) -> usize {
        self.frame.depth
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn world_to_grid(&self, point: &WorldPoint) -> GridCoord {
        self.frame.world_to_grid(point)
    }

    pub fn grid_to_world(&self, cell: &GridCoord) -> WorldPoint {
        self.frame.grid_to_world(cell)
    }

    pub fn in_bounds(&self, cell: &GridCoord) -> bool {
        self.frame.in_bounds(cell)
    }

    /// Out-of-bounds cells are reported as blocked.
    pub fn is_walkable(&self, cell: &GridCoord) -> bool {
        self.in_bounds(cell) && self.cells[self.index(cell)]
    }

    pub fn is_walkable_world(&self, point: &WorldPoint) -> bool {
        self.frame.contains_world(point) && self.is_walkable(&self.world_to_grid(point))
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|w| **w).count()
    }

    /// Picks a uniformly random walkable cell centre.
    pub fn random_walkable_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<WorldPoint> {
        let walkable = self.walkable_count();
        if walkable == 0 {
            return None;
        }
        let nth = rng.gen_range(0..walkable);
        let index = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, w)| **w)
            .nth(nth)
            .map(|(i, _)| i)?;
        let cell = GridCoord::new(index % self.frame.width, index / self.frame.width);
        Some(self.grid_to_world(&cell))
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let walkable = self
            .cells
            .chunks(self.frame.width)
            .map(|row| row.to_vec())
            .collect();
        GridSnapshot {
            width: self.frame.width,
            depth: self.frame.depth,
            cell_size: self.frame.cell_size,
            offset_x: self.frame.offset_x,
            offset_z: self.frame.offset_z,
            walkable,
            padding: self.padding,
        }
    }

    fn index(&self, cell: &GridCoord) -> usize {
        cell.z * self.frame.width + cell.x
    }

    fn block(&mut self, x: usize, z: usize) {
        let index = z * self.frame.width + x;
        self.cells[index] = false;
    }

    /// Blocks the inclusive cell rectangle, clamped to the grid.
    fn block_rect(&mut self, min: GridCoord, max: GridCoord) {
        let x1 = max.x.min(self.frame.width - 1);
        let z1 = max.z.min(self.frame.depth - 1);
        for z in min.z..=z1 {
            for x in min.x..=x1 {
                self.block(x, z);
            }
        }
    }

    fn mark_boundary(&mut self) {
        let thickness = self.padding.boundary();
        let (width, depth) = (self.frame.width, self.frame.depth);
        for z in 0..depth {
            for x in 0..width {
                let near_x = x < thickness || x + thickness >= width;
                let near_z = z < thickness || z + thickness >= depth;
                if near_x || near_z {
                    self.block(x, z);
                }
            }
        }
    }

    fn rasterize(&mut self, obstacle: &ObstacleDescriptor) {
        let pad = self.padding.for_kind(obstacle.kind);

        if let Some(points) = obstacle.footprint_points() {
            for point in points {
                if !self.frame.contains_world(point) {
                    continue;
                }
                let cell = self.world_to_grid(point);
                self.block_rect(
                    GridCoord::new(cell.x.saturating_sub(pad), cell.z.saturating_sub(pad)),
                    GridCoord::new(cell.x.saturating_add(pad), cell.z.saturating_add(pad)),
                );
            }
            return;
        }

        if !self.frame.overlaps(&obstacle.bounds) {
            return;
        }
        let a = self.world_to_grid(&obstacle.bounds.min);
        let b = self.world_to_grid(&obstacle.bounds.max);
        self.block_rect(
            GridCoord::new(a.x.min(b.x).saturating_sub(pad), a.z.min(b.z).saturating_sub(pad)),
            GridCoord::new(a.x.max(b.x).saturating_add(pad), a.z.max(b.z).saturating_add(pad)),
        );
    }
}

/// Read-only copy of the grid for diagnostic overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub depth: usize,
    pub cell_size: f64,
    pub offset_x: f64,
    pub offset_z: f64,
    /// Indexed as `walkable[z][x]`.
    pub walkable: Vec<Vec<bool>>,
    pub padding: Padding,
}
