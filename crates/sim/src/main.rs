//! opendrift — headless scripted drive over procedurally generated terrain.
//!
//! Stands in for an interactive session: loads `sim.ron`, builds the chunked
//! world, spawns the car, and runs the fixed-timestep loop with a scripted
//! driver, logging HUD state once per simulated second.

mod config;
mod script;

use anyhow::{Context, Result};
use engine_core::Time;
use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use terrain::ChunkManager;
use vehicle::Car;

use config::SimConfig;
use script::DriveScript;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = SimConfig::load();
    config
        .vehicle
        .validate()
        .context("vehicle tuning in sim.ron is invalid")?;

    let seed = match config.seed {
        Some(seed) => seed,
        None => StdRng::from_entropy().gen(),
    };
    config.world.seed = seed;
    log::info!("session seed {seed}");

    let view_radius = config.world.view_radius;
    let mut world = ChunkManager::new(config.world.clone());
    world.ensure_chunks_near(config.spawn_x, config.spawn_z, view_radius);
    let spawn_y = world.get_height(config.spawn_x, config.spawn_z);
    log::info!(
        "spawn at ({:.1}, {:.1}, {:.1}), {} chunks resident",
        config.spawn_x,
        spawn_y,
        config.spawn_z,
        world.chunk_count()
    );

    let mut car = Car::new(
        Vec3::new(config.spawn_x, spawn_y, config.spawn_z),
        config.vehicle.clone(),
    );
    let mut script = DriveScript::new(config.shift_cooldown_seconds);

    let mut time = Time::new();
    let dt = time.fixed_timestep_seconds();
    let mut sim_elapsed = 0.0f32;
    let mut next_hud = 0.0f32;

    while sim_elapsed < config.duration_seconds {
        time.update();
        while time.should_fixed_update() && sim_elapsed < config.duration_seconds {
            script.drive(sim_elapsed, dt, &mut car);
            car.step(dt, &world);

            let position = car.position();
            world.ensure_chunks_near(position.x, position.z, view_radius);

            sim_elapsed += dt;
            if sim_elapsed >= next_hud {
                report_hud(&car, &world);
                next_hud += config.hud_interval_seconds;
            }
        }
        // Headless: nothing to render, just keep the loop from spinning.
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let snapshot = car.snapshot();
    log::info!(
        "session over after {:.1}s: {:.0} km/h at ({:.1}, {:.1}), {} chunks generated",
        sim_elapsed,
        snapshot.speed_kmh(),
        snapshot.position.x,
        snapshot.position.z,
        world.chunk_count()
    );
    Ok(())
}

fn report_hud(car: &Car, world: &ChunkManager) {
    let snapshot = car.snapshot();
    let biome = world.biome_at(snapshot.position.x, snapshot.position.z);
    log::info!("GEAR: {}", snapshot.gear);
    log::info!("{:.0} km/h", snapshot.speed_kmh());
    log::info!(
        "pos ({:.1}, {:.1}) rpm {:.0} biome {:?}",
        snapshot.position.x,
        snapshot.position.z,
        snapshot.rpm,
        biome
    );
}
