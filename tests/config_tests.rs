use floor_nav::domains::navigation::{Padding, DEFAULT_CELL_SIZE, DEFAULT_EVENT_CAPACITY};
use floor_nav::Config;
use std::fs;
use tempfile::tempdir;

const CUSTOM: &str = r#"
[grid]
cell_size = 0.25
obstacle_padding = 3
furniture_padding = 5

[reservations]
default_duration_ms = 4000
min_separation = 1.5
max_attempts = 4
radius_growth = 1.0

[logging]
level = "debug"
file = "logs/nav.log"
"#;

#[test]
fn test_defaults_match_domain_constants() {
    let config = Config::default();
    assert_eq!(config.grid.cell_size, DEFAULT_CELL_SIZE);
    assert_eq!(config.grid.obstacle_padding, Padding::DEFAULT_OBSTACLE);
    assert_eq!(config.grid.furniture_padding, Padding::DEFAULT_FURNITURE);
    assert_eq!(config.reservations.default_duration_ms, 15_000);
    assert_eq!(config.reservations.max_attempts, 8);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_from_file_reads_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nav.toml");
    fs::write(&path, CUSTOM).unwrap();

    let config = tokio_test::block_on(Config::from_file(&path)).unwrap();
    assert_eq!(config.grid.cell_size, 0.25);
    assert_eq!(config.grid.furniture_padding, 5);
    assert_eq!(config.reservations.min_separation, 1.5);
    assert_eq!(config.logging.file.as_deref(), Some("logs/nav.log"));
}

#[test]
fn test_from_file_rejects_missing_section() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    assert!(tokio_test::block_on(Config::from_file(&path)).is_err());
}

#[test]
fn test_load_layers_file_over_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[grid]\nobstacle_padding = 4\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.grid.obstacle_padding, 4);
    assert_eq!(config.grid.furniture_padding, Padding::DEFAULT_FURNITURE);
    assert_eq!(config.grid.cell_size, DEFAULT_CELL_SIZE);
    assert_eq!(config.reservations.default_duration_ms, 15_000);
}

#[test]
fn test_load_without_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(Some(dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.grid.cell_size, DEFAULT_CELL_SIZE);
    assert_eq!(config.reservations.max_attempts, 8);
}

#[test]
fn test_environment_overrides_file() {
    std::env::set_var("FLOOR_NAV__SEARCH__MAX_FALLBACK_RADIUS", "12");
    let config = Config::load(None::<&str>).unwrap();
    std::env::remove_var("FLOOR_NAV__SEARCH__MAX_FALLBACK_RADIUS");

    assert_eq!(config.search.max_fallback_radius, Some(12));
}

#[test]
fn test_navigation_settings_mirror_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nav.toml");
    fs::write(&path, CUSTOM).unwrap();
    let config = tokio_test::block_on(Config::from_file(&path)).unwrap();

    let settings = config.navigation_settings();
    assert_eq!(settings.cell_size, 0.25);
    assert_eq!(settings.padding, Padding { obstacle: 3, furniture: 5 });
    assert_eq!(settings.max_fallback_radius, None);
    assert_eq!(settings.reservations.default_duration_ms, 4000);
    assert_eq!(settings.reservations.max_attempts, 4);
    assert_eq!(settings.reservations.probe_radius(1), 3.0);
    assert_eq!(settings.event_capacity, DEFAULT_EVENT_CAPACITY);
}
