use floor_nav::common::ApplicationResult;
use floor_nav::Config;
use tracing::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use floor_nav::adapters::outbound::{init_combined_logger, FilesystemLayoutSource};
use floor_nav::application::NavigationService;
use floor_nav::domains::navigation::{
    simplify_path, FloorLayoutSource, NavigationContext, NavigationEventActor, SystemClock, WorldPoint,
};

const DEMO_AGENTS: [&str; 3] = ["worker-ada", "worker-bo", "worker-cy"];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting floor-nav");
    if let Err(e) = run().await {
        error!("floor-nav failed: {}", e);
        std::process::exit(1);
    }
    info!("Shutting down floor-nav");
}

async fn run() -> ApplicationResult<()> {
    // Optional config.toml plus FLOOR_NAV__* overrides
    let config = Config::load(Some("config.toml"))?;
    info!(
        "Grid cell size {}, paddings {}/{}",
        config.grid.cell_size, config.grid.obstacle_padding, config.grid.furniture_padding
    );

    let logger = init_combined_logger(config.logging.file.as_deref(), &config.logging.level);
    let layouts = Arc::new(FilesystemLayoutSource::new(None));
    let layout_name = std::env::args().nth(1).unwrap_or_else(|| "demo_office.json".to_string());

    let (event_sender, event_receiver) = mpsc::channel(256);
    let mut actor = NavigationEventActor::new(event_receiver);
    let view = actor.view();
    let actor_task = tokio::spawn(async move { actor.run().await });

    let layout = match layouts.load_layout(&layout_name) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("Could not read {}: {}", layout_name, e);
            return Ok(());
        }
    };
    let floor_id = layout.floor_id.clone();
    let context = NavigationContext::new(
        floor_id.clone(),
        config.navigation_settings(),
        Arc::new(SystemClock),
        logger,
    );
    let mut service = NavigationService::new(context, layouts).with_event_sender(event_sender);
    service.apply_layout(&layout)?;

    // Every demo agent asks for the same spot; the registry spreads them out.
    let meeting_point = WorldPoint::new(5.0, 0.0, 5.0);
    let mut rng = rand::thread_rng();
    for agent in DEMO_AGENTS {
        let Some(start) = service.context().random_walkable_point(&mut rng) else {
            warn!("Floor {} has no walkable cell", floor_id);
            break;
        };
        match service.navigate(agent, start, meeting_point) {
            Ok(plan) => info!(
                "{} -> {} ({} waypoints, {} after smoothing)",
                agent,
                plan.destination,
                plan.waypoints.len(),
                simplify_path(&plan.waypoints).len()
            ),
            Err(e) => warn!("{} stays put: {}", agent, e),
        }
    }

    for reservation in service.active_destinations() {
        info!("{} holds {} until {}", reservation.agent_id, reservation.position, reservation.expires_at);
    }

    drop(service);
    if let Err(e) = actor_task.await {
        warn!("Event actor stopped abnormally: {}", e);
    }

    if let Some(projection) = view.projection(&floor_id).await {
        info!(
            "Floor {}: {} paths found, {} failed, {} reservations ({} relocated)",
            projection.floor_id,
            projection.paths_found,
            projection.paths_failed,
            projection.reservations,
            projection.relocated_destinations
        );
    }
    Ok(())
}
