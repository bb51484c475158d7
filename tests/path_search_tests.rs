use chrono::{Duration, TimeZone, Utc};
use floor_nav::adapters::outbound::{init_noop_logger, LogLevel, MemoryLogger};
use floor_nav::common::{DomainEvent, NavigationError};
use floor_nav::domains::navigation::*;
use std::sync::Arc;

fn context() -> NavigationContext {
    NavigationContext::with_defaults("search-floor", init_noop_logger())
}

fn open_floor() -> NavigationContext {
    let mut ctx = context();
    ctx.initialize(20.0, &[], None, None).unwrap();
    ctx
}

fn wall(min: (f64, f64), max: (f64, f64)) -> ObstacleDescriptor {
    ObstacleDescriptor::new(
        "wall",
        Aabb::new(WorldPoint::new(min.0, 0.0, min.1), WorldPoint::new(max.0, 2.0, max.1)),
        ObstacleKind::Generic,
    )
}

fn assert_four_connected(grid: &WalkableGrid, path: &[WorldPoint]) {
    let cells: Vec<GridCoord> = path.iter().map(|p| grid.world_to_grid(p)).collect();
    for cell in &cells {
        assert!(grid.in_bounds(cell));
        assert!(grid.is_walkable(cell), "waypoint cell {:?} is blocked", cell);
    }
    for pair in cells.windows(2) {
        assert_eq!(pair[0].manhattan(&pair[1]), 1, "non-adjacent step {:?} -> {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_find_path_before_initialize_fails() {
    let mut ctx = context();
    let result = ctx.find_path(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 0.0, 1.0));
    assert!(matches!(result, Err(NavigationError::GridUninitialized)));

    match ctx.uncommitted_events().back() {
        Some(NavigationEvent::PathFailed { reason, .. }) => assert!(reason.contains("not been initialized")),
        other => panic!("Expected PathFailed event, got {:?}", other),
    }
}

#[test]
fn test_open_floor_path_is_shortest_and_in_bounds() {
    let mut ctx = open_floor();
    let start = WorldPoint::new(-5.0, 0.0, -5.0);
    let end = WorldPoint::new(5.0, 0.0, 5.0);

    let path = ctx.find_path(start, end).unwrap();
    let grid = ctx.grid().unwrap();

    let start_cell = grid.world_to_grid(&start);
    let end_cell = grid.world_to_grid(&end);
    assert_eq!(path.first().copied(), Some(grid.grid_to_world(&start_cell)));
    assert_eq!(path.last().copied(), Some(grid.grid_to_world(&end_cell)));
    assert_eq!(path.len(), start_cell.manhattan(&end_cell) as usize + 1);
    assert_four_connected(grid, &path);
}

#[test]
fn test_same_cell_gives_single_waypoint() {
    let mut ctx = open_floor();
    let path = ctx
        .find_path(WorldPoint::new(1.1, 0.0, 1.1), WorldPoint::new(1.2, 0.0, 1.2))
        .unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0], WorldPoint::new(1.25, 0.0, 1.25));
}

#[test]
fn test_path_detours_around_wall() {
    let mut ctx = context();
    ctx.initialize(20.0, &[wall((-10.0, -0.2), (6.0, 0.2))], Some(1), None)
        .unwrap();
    let start = WorldPoint::new(0.0, 0.0, -5.0);
    let end = WorldPoint::new(0.0, 0.0, 5.0);

    let path = ctx.find_path(start, end).unwrap();
    let grid = ctx.grid().unwrap();
    let direct = grid.world_to_grid(&start).manhattan(&grid.world_to_grid(&end)) as usize + 1;

    assert!(path.len() > direct);
    assert_four_connected(grid, &path);
    // the only gap is on the +x side of the wall
    assert!(path.iter().any(|p| p.x > 6.0));
}

#[test]
fn test_enclosed_goal_reports_no_path() {
    let mut ctx = context();
    let pen = vec![
        wall((3.0, 3.0), (3.0, 7.0)),
        wall((7.0, 3.0), (7.0, 7.0)),
        wall((3.0, 3.0), (7.0, 3.0)),
        wall((3.0, 7.0), (7.0, 7.0)),
    ];
    ctx.initialize(20.0, &pen, Some(0), None).unwrap();

    let result = ctx.find_path(WorldPoint::new(-5.0, 0.0, -5.0), WorldPoint::new(5.0, 0.0, 5.0));
    match result {
        Err(NavigationError::NoPathFound { to, .. }) => assert_eq!(to, GridCoord::new(30, 30)),
        other => panic!("Expected NoPathFound, got {:?}", other),
    }
}

#[test]
fn test_blocked_start_is_moved_to_nearest_walkable_cell() {
    let mut ctx = context();
    let desk = ObstacleDescriptor::new(
        "desk",
        Aabb::centered(WorldPoint::new(0.0, 0.0, 0.0), 2.0, 2.0),
        ObstacleKind::Generic,
    );
    ctx.initialize(20.0, &[desk], Some(1), None).unwrap();

    let result = ctx
        .plan_path(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(0.0, 0.0, -6.0))
        .unwrap();

    assert!(result.start_substituted);
    assert!(!result.goal_substituted);
    // ring of radius 4 is the first to leave the padded box; -z comes first
    assert_eq!(result.start, GridCoord::new(20, 16));
    assert_eq!(result.waypoints[0], WorldPoint::new(0.25, 0.0, -1.75));
}

#[test]
fn test_blocked_goal_is_moved_to_nearest_walkable_cell() {
    let mut ctx = context();
    let desk = ObstacleDescriptor::new(
        "desk",
        Aabb::centered(WorldPoint::new(0.0, 0.0, 0.0), 2.0, 2.0),
        ObstacleKind::Generic,
    );
    ctx.initialize(20.0, &[desk], Some(1), None).unwrap();

    let result = ctx
        .plan_path(WorldPoint::new(-6.0, 0.0, 0.0), WorldPoint::new(0.9, 0.0, 0.2))
        .unwrap();

    assert!(result.goal_substituted);
    let grid = ctx.grid().unwrap();
    assert!(grid.is_walkable(&result.goal));
    assert_eq!(result.cells.last().copied(), Some(result.goal));
}

#[test]
fn test_fully_blocked_grid_has_no_walkable_node() {
    let mut ctx = context();
    ctx.initialize(2.0, &[], None, None).unwrap();

    let result = ctx.find_path(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(0.5, 0.0, 0.5));
    assert!(matches!(
        result,
        Err(NavigationError::NoWalkableNodeNearby { endpoint: Endpoint::Start, .. })
    ));
}

#[test]
fn test_fallback_radius_bound_is_respected() {
    let settings = NavigationSettings {
        max_fallback_radius: Some(2),
        ..NavigationSettings::default()
    };
    let mut ctx = NavigationContext::new("bounded", settings, Arc::new(SystemClock), init_noop_logger());
    let desk = ObstacleDescriptor::new(
        "desk",
        Aabb::centered(WorldPoint::new(0.0, 0.0, 0.0), 2.0, 2.0),
        ObstacleKind::Generic,
    );
    ctx.initialize(20.0, &[desk], Some(1), None).unwrap();

    let result = ctx.find_path(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(-6.0, 0.0, -6.0));
    assert!(matches!(
        result,
        Err(NavigationError::NoWalkableNodeNearby { endpoint: Endpoint::Start, .. })
    ));
}

#[test]
fn test_huge_fallback_radius_is_clamped_to_grid() {
    let settings = NavigationSettings {
        max_fallback_radius: Some(usize::MAX),
        ..NavigationSettings::default()
    };
    let mut ctx = NavigationContext::new("unbounded", settings, Arc::new(SystemClock), init_noop_logger());
    ctx.initialize(20.0, &[], None, None).unwrap();

    let grid = ctx.grid().unwrap();
    let search = PathSearch::new(grid, settings.max_fallback_radius);
    assert_eq!(search.max_fallback_radius(), grid.width().max(grid.depth()));

    // corner cell sits on the boundary ring
    let result = ctx
        .plan_path(WorldPoint::new(-10.0, 0.0, -10.0), WorldPoint::new(0.0, 0.0, 0.0))
        .unwrap();
    assert!(result.start_substituted);
    assert_eq!(result.start, GridCoord::new(2, 2));
}

#[test]
fn test_uncommitted_events_are_bounded() {
    let settings = NavigationSettings {
        event_capacity: 4,
        ..NavigationSettings::default()
    };
    let mut ctx = NavigationContext::new("busy", settings, Arc::new(SystemClock), init_noop_logger());
    ctx.initialize(20.0, &[], None, None).unwrap();

    let start = WorldPoint::new(-5.0, 0.0, -5.0);
    for i in 0..50 {
        let end = WorldPoint::new(-4.0 + 0.5 * (i % 10) as f64, 0.0, 5.0);
        ctx.find_path(start, end).unwrap();
    }
    let last_end = WorldPoint::new(7.0, 0.0, 7.0);
    ctx.find_path(start, last_end).unwrap();

    let events = ctx.uncommitted_events();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| matches!(e, NavigationEvent::PathFound { .. })));
    match events.back() {
        Some(NavigationEvent::PathFound { end, .. }) => assert_eq!(*end, last_end),
        other => panic!("Expected PathFound event, got {:?}", other),
    }
    assert_eq!(ctx.take_events().len(), 4);
    assert!(ctx.uncommitted_events().is_empty());
}

#[test]
fn test_event_timestamps_follow_injected_clock() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    let mut ctx = NavigationContext::new(
        "clocked",
        NavigationSettings::default(),
        Arc::new(clock.clone()),
        init_noop_logger(),
    );
    ctx.initialize(20.0, &[], None, None).unwrap();
    clock.advance_ms(2_500);
    ctx.find_path(WorldPoint::new(-5.0, 0.0, -5.0), WorldPoint::new(5.0, 0.0, 5.0))
        .unwrap();

    let events = ctx.take_events();
    assert_eq!(events[0].occurred_at(), Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(
        events[1].occurred_at(),
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(2_500)
    );
}

#[test]
fn test_paths_are_deterministic() {
    let obstacles = vec![wall((-2.0, -2.0), (2.0, 2.0))];
    let start = WorldPoint::new(-6.0, 0.0, -6.0);
    let end = WorldPoint::new(6.0, 0.0, 6.0);

    let mut first = context();
    first.initialize(20.0, &obstacles, None, None).unwrap();
    let mut second = context();
    second.initialize(20.0, &obstacles, None, None).unwrap();

    let a = first.find_path(start, end).unwrap();
    let b = first.find_path(start, end).unwrap();
    let c = second.find_path(start, end).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn test_failures_are_logged_at_matching_level() {
    let logger = MemoryLogger::new();
    let mut ctx = NavigationContext::with_defaults("logged", Arc::new(logger.clone()));

    let _ = ctx.find_path(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(1.0, 0.0, 1.0));
    assert_eq!(logger.messages_at(LogLevel::Error).len(), 1);

    let pen = vec![
        wall((3.0, 3.0), (3.0, 7.0)),
        wall((7.0, 3.0), (7.0, 7.0)),
        wall((3.0, 3.0), (7.0, 3.0)),
        wall((3.0, 7.0), (7.0, 7.0)),
    ];
    ctx.initialize(20.0, &pen, Some(0), None).unwrap();
    let _ = ctx.find_path(WorldPoint::new(-5.0, 0.0, -5.0), WorldPoint::new(5.0, 0.0, 5.0));

    let warnings = logger.messages_at(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("[logged]"));
}

#[test]
fn test_simplified_path_keeps_endpoints() {
    let mut ctx = open_floor();
    let path = ctx
        .find_path(WorldPoint::new(-5.0, 0.0, -5.0), WorldPoint::new(5.0, 0.0, 5.0))
        .unwrap();

    let simplified = simplify_path(&path);
    assert!(simplified.len() < path.len());
    assert_eq!(simplified.first(), path.first());
    assert_eq!(simplified.last(), path.last());
}
