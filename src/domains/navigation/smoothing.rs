use super::types::WorldPoint;

const COLLINEAR_EPSILON: f64 = 1e-9;

/// Drops intermediate waypoints that sit on a straight run, keeping the
/// first point, the last point and every turn.
pub fn simplify_path(path: &[WorldPoint]) -> Vec<WorldPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut simplified = vec![path[0]];
    for window in path.windows(3) {
        let (prev, mid, next) = (&window[0], &window[1], &window[2]);
        if !is_collinear(prev, mid, next) {
            simplified.push(*mid);
        }
    }
    simplified.push(path[path.len() - 1]);
    simplified
}

/// Collinearity in the floor plane (x/z).
fn is_collinear(a: &WorldPoint, b: &WorldPoint, c: &WorldPoint) -> bool {
    let cross = (b.x - a.x) * (c.z - b.z) - (b.z - a.z) * (c.x - b.x);
    cross.abs() < COLLINEAR_EPSILON
}
