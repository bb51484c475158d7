use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::Result;

use crate::domains::navigation::{
    NavigationSettings, Padding, ReservationPolicy, DEFAULT_CELL_SIZE, DEFAULT_EVENT_CAPACITY,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub reservations: ReservationConfig,
    #[serde(default)]
    pub events: EventConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub cell_size: f64,
    pub obstacle_padding: usize,
    pub furniture_padding: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound for the walkable-substitute ring search, in cells.
    pub max_fallback_radius: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    pub default_duration_ms: u64,
    pub min_separation: f64,
    pub max_attempts: usize,
    pub radius_growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Uncommitted events kept per floor before the oldest are dropped.
    pub capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// When set, domain logs also go to this file.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layers an optional TOML file and `FLOOR_NAV__SECTION__KEY` environment
    /// variables over the defaults.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("FLOOR_NAV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn navigation_settings(&self) -> NavigationSettings {
        NavigationSettings {
            cell_size: self.grid.cell_size,
            padding: Padding {
                obstacle: self.grid.obstacle_padding,
                furniture: self.grid.furniture_padding,
            },
            max_fallback_radius: self.search.max_fallback_radius,
            reservations: ReservationPolicy {
                default_duration_ms: self.reservations.default_duration_ms,
                min_separation: self.reservations.min_separation,
                max_attempts: self.reservations.max_attempts,
                radius_growth: self.reservations.radius_growth,
            },
            event_capacity: self.events.capacity,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let policy = ReservationPolicy::default();
        Self {
            grid: GridConfig {
                cell_size: DEFAULT_CELL_SIZE,
                obstacle_padding: Padding::DEFAULT_OBSTACLE,
                furniture_padding: Padding::DEFAULT_FURNITURE,
            },
            search: SearchConfig::default(),
            reservations: ReservationConfig {
                default_duration_ms: policy.default_duration_ms,
                min_separation: policy.min_separation,
                max_attempts: policy.max_attempts,
                radius_growth: policy.radius_growth,
            },
            events: EventConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
