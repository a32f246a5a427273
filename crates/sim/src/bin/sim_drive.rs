//! Scripted drive simulation.
//!
//! Runs the full navigation loop against the simulated world. With no
//! configuration it drives a demo target ~25 m northeast of the
//! origin; a TOML file (first argument, or `terrapin.toml` in the
//! working directory) overrides world physics, tuning, and the
//! command script.

use std::path::Path;
use std::process;

use tracing::{error, info};

use terrapin_core::clock::Clock;
use terrapin_core::nav::NavigationLoop;
use terrapin_sim::clock::SystemClock;
use terrapin_sim::config::SimConfig;
use terrapin_sim::harness::{RecordingSink, ScriptedCommands};
use terrapin_sim::runner;
use terrapin_sim::world::SimWorld;
use terrapin_sim::SimError;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("terrapin_sim=info".parse().expect("static directive")),
        )
        .init();

    if let Err(e) = run() {
        error!("simulation failed: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), SimError> {
    let args: Vec<String> = std::env::args().collect();

    let config = if let Some(path) = args.get(1) {
        info!("loading configuration from {path}");
        SimConfig::load(Path::new(path))?
    } else if Path::new("terrapin.toml").exists() {
        info!("loading configuration from terrapin.toml");
        SimConfig::load(Path::new("terrapin.toml"))?
    } else {
        info!("using default configuration");
        SimConfig::default()
    };

    let world = SimWorld::new(config.world_config())?;
    let clock = SystemClock::new();
    let mut nav = NavigationLoop::new(config.nav_config(), clock.now_us());

    let mut commands = if config.run.commands.is_empty() {
        // Demo drive: target ~25 m northeast, issued on the second tick
        let target = world.local_to_coordinate(18.0, 18.0);
        let line = format!("{:.7},{:.7}", target.latitude(), target.longitude());
        info!(%line, "no script configured, driving demo target");
        ScriptedCommands::from_script([(1u64, line)])
    } else {
        ScriptedCommands::from_script(
            config
                .run
                .commands
                .iter()
                .map(|c| (c.at_tick, c.line.clone())),
        )
    };

    let mut sensors = world.sensors();
    let mut motors = world.motors();
    let mut sink = RecordingSink::new();

    let outcome = runner::run(
        &mut nav,
        &mut sensors,
        &mut commands,
        &mut motors,
        &mut sink,
        &clock,
        config.run.max_ticks,
    );

    let (x, y, heading) = world.pose();
    let pose = format!("x={x:.2}m y={y:.2}m heading={heading:.1}deg");
    info!(
        state = outcome.final_state.name(),
        ticks = outcome.ticks,
        pose = %pose,
        events = sink.events().len(),
        "simulation finished"
    );

    Ok(())
}
