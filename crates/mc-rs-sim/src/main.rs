mod config;
mod report;
mod village;

use std::time::Duration;

use config::SimConfig;
use mc_rs_game::game_world::GameWorld;
use report::SimReport;
use tracing::{error, info};

/// Ticks between progress lines in the log.
const PROGRESS_INTERVAL: u64 = 1200;

fn finish(world: &mut GameWorld, mut report: SimReport, path: Option<&str>) {
    report.ticks = world.current_tick();
    for id in world.villagers() {
        if let Some(activity) = world.activity(id) {
            report.final_activities.insert(id, activity);
        }
    }
    report.villagers_alive = report.final_activities.len();

    let json = match report.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize report: {e}");
            return;
        }
    };
    match path {
        Some(path) => match std::fs::write(path, json) {
            Ok(()) => info!("Report written to {path}"),
            Err(e) => error!("Failed to write report to {path}: {e}"),
        },
        None => println!("{json}"),
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "sim.toml".into());
    let config = match SimConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("MC-RS villager simulation v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "World: seed {}, radius {} chunks, farm size {}",
        config.world.seed, config.world.radius, config.world.farm_size
    );
    info!(
        "Villagers: {} ({} farmers), ticks: {}, realtime: {}",
        config.simulation.villagers,
        config.simulation.farmers,
        config.simulation.ticks,
        config.simulation.realtime
    );

    let mut world = match village::build_world(&config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to build villager brains: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let mut report = SimReport::default();
    let sim = &config.simulation;
    let mut tick_interval =
        tokio::time::interval(Duration::from_micros(1_000_000 / u64::from(sim.tick_rate)));
    loop {
        if sim.ticks > 0 && world.current_tick() >= sim.ticks {
            break;
        }
        tokio::select! {
            _ = tick_interval.tick(), if sim.realtime => {}
            _ = tokio::task::yield_now(), if !sim.realtime => {}
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }

        world.tick();
        for event in world.drain_events() {
            report.record(&event);
        }
        let tick = world.current_tick();
        if tick.is_multiple_of(PROGRESS_INTERVAL) {
            info!(
                tick,
                day_time = world.day_time(),
                alive = world.villagers().len(),
                planted = report.crops_planted,
                "progress"
            );
        }
    }

    info!("Simulation stopped after {} ticks", world.current_tick());
    finish(&mut world, report, config.report.path.as_deref());
}
