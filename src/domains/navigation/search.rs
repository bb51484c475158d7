//! Four-directional A* over a [`WalkableGrid`].
//!
//! Costs are integral: every step costs 1 and the heuristic is the Manhattan
//! distance, which is consistent on a 4-connected grid, so a closed node is
//! never reopened. Nodes are created lazily the first time the search
//! touches a cell.
//!
//! Among open nodes the one with the lowest f-cost is expanded first; ties
//! go to the lower h-cost, then the lower row (`z`), then the lower column
//! (`x`). The result is therefore identical from run to run.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::grid::WalkableGrid;
use super::types::{Endpoint, GridCoord, WorldPoint};
use crate::common::{NavigationError, NavigationResult};

/// Search-time record of one grid cell.
#[derive(Debug, Clone)]
pub struct PathNode {
    pub coord: GridCoord,
    pub g: u32,
    pub h: u32,
    pub f: u32,
    pub parent: Option<GridCoord>,
    pub walkable: bool,
    closed: bool,
}

impl PathNode {
    fn new(coord: GridCoord, walkable: bool) -> Self {
        Self {
            coord,
            g: u32::MAX,
            h: 0,
            f: u32::MAX,
            parent: None,
            walkable,
            closed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    h: u32,
    coord: GridCoord,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on every key so BinaryHeap pops the minimum
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.coord.z.cmp(&self.coord.z))
            .then_with(|| other.coord.x.cmp(&self.coord.x))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of a successful search.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// Cells from start to goal, both included.
    pub cells: Vec<GridCoord>,
    /// Cell centres matching `cells`.
    pub waypoints: Vec<WorldPoint>,
    /// Effective start after any walkable substitution.
    pub start: GridCoord,
    /// Effective goal after any walkable substitution.
    pub goal: GridCoord,
    pub start_substituted: bool,
    pub goal_substituted: bool,
    pub nodes_expanded: usize,
}

pub struct PathSearch<'a> {
    grid: &'a WalkableGrid,
    max_fallback_radius: usize,
}

impl<'a> PathSearch<'a> {
    /// `max_fallback_radius` bounds the ring search for a walkable substitute
    /// endpoint. `None` uses the larger grid dimension, which covers the
    /// whole grid from any cell; larger values are clamped to it.
    pub fn new(grid: &'a WalkableGrid, max_fallback_radius: Option<usize>) -> Self {
        let cover = grid.width().max(grid.depth());
        Self {
            grid,
            max_fallback_radius: max_fallback_radius.map_or(cover, |r| r.min(cover)),
        }
    }

    pub fn max_fallback_radius(&self) -> usize {
        self.max_fallback_radius
    }

    /// Nearest walkable cell to `cell`, searched in square rings of growing
    /// radius. Within a ring the smallest Euclidean distance wins, first in
    /// row-major order on a tie.
    pub fn nearest_walkable(&self, cell: GridCoord) -> Option<GridCoord> {
        if self.grid.is_walkable(&cell) {
            return Some(cell);
        }
        let cx = cell.x as isize;
        let cz = cell.z as isize;
        let max_radius = isize::try_from(self.max_fallback_radius).unwrap_or(isize::MAX);
        for radius in 1..=max_radius {
            let mut best: Option<(isize, GridCoord)> = None;
            for (dx, dz) in ring_offsets(radius) {
                let (x, z) = (cx + dx, cz + dz);
                if x < 0 || z < 0 {
                    continue;
                }
                let candidate = GridCoord::new(x as usize, z as usize);
                if !self.grid.is_walkable(&candidate) {
                    continue;
                }
                let dist = dx * dx + dz * dz;
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, candidate));
                }
            }
            if let Some((_, found)) = best {
                return Some(found);
            }
        }
        None
    }

    pub fn find_path(&self, start: &WorldPoint, end: &WorldPoint) -> NavigationResult<PathResult> {
        let start_cell = self.grid.world_to_grid(start);
        let goal_cell = self.grid.world_to_grid(end);

        let start = self.resolve_endpoint(start_cell, Endpoint::Start)?;
        let goal = self.resolve_endpoint(goal_cell, Endpoint::End)?;

        let (cells, nodes_expanded) = self.astar(start, goal)?;
        let waypoints = cells.iter().map(|c| self.grid.grid_to_world(c)).collect();
        Ok(PathResult {
            cells,
            waypoints,
            start,
            goal,
            start_substituted: start != start_cell,
            goal_substituted: goal != goal_cell,
            nodes_expanded,
        })
    }

    fn resolve_endpoint(&self, cell: GridCoord, endpoint: Endpoint) -> NavigationResult<GridCoord> {
        self.nearest_walkable(cell)
            .ok_or(NavigationError::NoWalkableNodeNearby { endpoint, cell })
    }

    fn astar(&self, start: GridCoord, goal: GridCoord) -> NavigationResult<(Vec<GridCoord>, usize)> {
        let mut nodes: HashMap<GridCoord, PathNode> = HashMap::new();
        let mut open = BinaryHeap::new();

        let h = start.manhattan(&goal);
        let mut first = PathNode::new(start, true);
        first.g = 0;
        first.h = h;
        first.f = h;
        nodes.insert(start, first);
        open.push(OpenEntry { f: h, h, coord: start });

        let mut expanded = 0usize;
        while let Some(entry) = open.pop() {
            let current = match nodes.get_mut(&entry.coord) {
                Some(node) if !node.closed && node.f == entry.f => node,
                // stale heap entry
                _ => continue,
            };
            if entry.coord == goal {
                return Ok((Self::reconstruct(&nodes, goal), expanded));
            }
            current.closed = true;
            let g = current.g;
            expanded += 1;

            for neighbor in self.neighbors(entry.coord) {
                let node = nodes
                    .entry(neighbor)
                    .or_insert_with(|| PathNode::new(neighbor, self.grid.is_walkable(&neighbor)));
                if !node.walkable || node.closed {
                    continue;
                }
                let tentative = g + 1;
                if tentative < node.g {
                    node.g = tentative;
                    node.h = neighbor.manhattan(&goal);
                    node.f = tentative + node.h;
                    node.parent = Some(entry.coord);
                    open.push(OpenEntry {
                        f: node.f,
                        h: node.h,
                        coord: neighbor,
                    });
                }
            }
        }

        Err(NavigationError::NoPathFound { from: start, to: goal })
    }

    /// In-bounds 4-neighbours in a fixed order: -z, +x, +z, -x.
    fn neighbors(&self, cell: GridCoord) -> impl Iterator<Item = GridCoord> + '_ {
        let up = cell.z.checked_sub(1).map(|z| GridCoord::new(cell.x, z));
        let right = Some(GridCoord::new(cell.x + 1, cell.z));
        let down = Some(GridCoord::new(cell.x, cell.z + 1));
        let left = cell.x.checked_sub(1).map(|x| GridCoord::new(x, cell.z));
        [up, right, down, left]
            .into_iter()
            .flatten()
            .filter(move |c| self.grid.in_bounds(c))
    }

    fn reconstruct(nodes: &HashMap<GridCoord, PathNode>, goal: GridCoord) -> Vec<GridCoord> {
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(parent) = nodes.get(&current).and_then(|n| n.parent) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

/// Offsets on the perimeter of the square ring at Chebyshev distance
/// `radius`, in row-major order (by `dz`, then `dx`).
fn ring_offsets(radius: isize) -> impl Iterator<Item = (isize, isize)> {
    (-radius..=radius).flat_map(move |dz| {
        let step = if dz.abs() == radius { 1 } else { 2 * radius };
        (-radius..=radius).step_by(step as usize).map(move |dx| (dx, dz))
    })
}
