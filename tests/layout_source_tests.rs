use floor_nav::adapters::outbound::{init_noop_logger, FilesystemLayoutSource};
use floor_nav::common::NavigationError;
use floor_nav::domains::navigation::*;
use std::fs;
use tempfile::tempdir;

const DEMO_OFFICE: &str = include_str!("../resources/floor_nav/layouts/demo_office.json");

fn sample_layout() -> FloorLayout {
    let shelf = ObstacleDescriptor::new(
        "shelf",
        Aabb::new(WorldPoint::new(-2.0, 0.0, 3.0), WorldPoint::new(2.0, 1.8, 3.5)),
        ObstacleKind::Generic,
    );
    let corner = ObstacleDescriptor::new(
        "corner-desk",
        Aabb::new(WorldPoint::new(4.0, 0.0, 4.0), WorldPoint::new(6.0, 0.8, 6.0)),
        ObstacleKind::FurnitureCluster,
    )
    .with_footprint(vec![WorldPoint::new(4.0, 0.0, 4.0), WorldPoint::new(6.0, 0.0, 4.0)]);
    let mut layout = FloorLayout::new("lab", 16.0, vec![shelf, corner]);
    layout.furniture_padding = Some(3);
    layout
}

#[test]
fn test_filesystem_source_save_and_load() {
    let dir = tempdir().unwrap();
    let source = FilesystemLayoutSource::new(Some(dir.path().to_path_buf()));

    source.save_layout("lab.json", &sample_layout()).unwrap();
    assert!(dir.path().join("layouts").join("lab.json").exists());

    let loaded = source.load_layout("lab.json").unwrap();
    assert_eq!(loaded.floor_id, "lab");
    assert_eq!(loaded.floor_size, 16.0);
    assert_eq!(loaded.obstacles.len(), 2);
    assert_eq!(loaded.obstacles[1].kind, ObstacleKind::FurnitureCluster);
    assert_eq!(loaded.obstacles[1].footprint_points().map(|p| p.len()), Some(2));
    assert_eq!(loaded.obstacle_padding, None);
    assert_eq!(loaded.furniture_padding, Some(3));
}

#[test]
fn test_missing_layout_is_reported_by_name() {
    let dir = tempdir().unwrap();
    let source = FilesystemLayoutSource::new(Some(dir.path().to_path_buf()));

    match source.load_layout("nowhere.json") {
        Err(NavigationError::LayoutNotFound { name }) => assert_eq!(name, "nowhere.json"),
        other => panic!("Expected LayoutNotFound, got {:?}", other.map(|l| l.floor_id)),
    }
}

#[test]
fn test_malformed_layout_is_a_serialization_error() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("layouts")).unwrap();
    fs::write(dir.path().join("layouts").join("broken.json"), "{ \"floor_id\": 3 }").unwrap();
    let source = FilesystemLayoutSource::new(Some(dir.path().to_path_buf()));

    assert!(matches!(
        source.load_layout("broken.json"),
        Err(NavigationError::Serialization(_))
    ));
}

#[test]
fn test_list_layouts_is_sorted_and_filtered() {
    let dir = tempdir().unwrap();
    let source = FilesystemLayoutSource::new(Some(dir.path().to_path_buf()));
    assert!(source.list_layouts().unwrap().is_empty());

    source.save_layout("zoo.json", &sample_layout()).unwrap();
    source.save_layout("atrium.json", &sample_layout()).unwrap();
    fs::write(dir.path().join("layouts").join("notes.txt"), "not a layout").unwrap();

    assert_eq!(source.list_layouts().unwrap(), vec!["atrium.json", "zoo.json"]);
}

#[test]
fn test_obstacle_kind_and_footprint_default_when_absent() {
    let json = r#"{
        "floor_id": "bare",
        "floor_size": 10.0,
        "obstacles": [
            { "name": "crate", "bounds": { "min": { "x": 0.0, "y": 0.0, "z": 0.0 }, "max": { "x": 1.0, "y": 1.0, "z": 1.0 } } }
        ]
    }"#;
    let layout: FloorLayout = serde_json::from_str(json).unwrap();

    assert_eq!(layout.obstacles[0].kind, ObstacleKind::Generic);
    assert!(layout.obstacles[0].footprint_points().is_none());
    assert_eq!(layout.obstacle_padding, None);
}

#[test]
fn test_bundled_demo_layout_builds_grid() {
    let layout: FloorLayout = serde_json::from_str(DEMO_OFFICE).unwrap();
    assert_eq!(layout.floor_id, "demo-office");
    assert_eq!(
        layout
            .obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::FurnitureCluster)
            .count(),
        2
    );

    let mut ctx = NavigationContext::with_defaults(layout.floor_id.clone(), init_noop_logger());
    ctx.initialize_layout(&layout).unwrap();
    let grid = ctx.grid().unwrap();

    // sofa is rasterized point by point, its bounding box interior stays open
    assert!(!grid.is_walkable_world(&WorldPoint::new(1.0, 0.0, 1.0)));
    assert!(grid.is_walkable_world(&WorldPoint::new(2.7, 0.0, 1.7)));
    assert!(grid.is_walkable_world(&WorldPoint::new(5.0, 0.0, 5.0)));

    let path = ctx
        .find_path(WorldPoint::new(-8.0, 0.0, -8.0), WorldPoint::new(5.0, 0.0, 5.0))
        .unwrap();
    assert!(path.len() > 1);
}
