//! Level Preview
//!
//! Headless smoke binary: builds a level from a seed, drives a car across
//! it for a few simulated seconds, and prints what the level contains.
//!
//! Usage: `level-preview [seed]`

use glam::Vec3;

use grove_drift_engine::frame::FrameClock;
use grove_drift_engine::player::{DriveInput, VehicleController};
use grove_drift_engine::world::{LevelParams, build_level};

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<f64>().ok())
        .unwrap_or(22.0);

    let params = LevelParams {
        seed,
        ..LevelParams::default()
    };
    println!("[Preview] building level for seed {}", seed);
    let level = build_level(&params);

    println!(
        "[Preview] floor mesh: {} vertices, {} triangles",
        level.floor.vertices.len(),
        level.floor.triangle_count()
    );
    println!(
        "[Preview] collision: {} floors / {} walls across {} grid cells",
        level.collision.faces().floors.len(),
        level.collision.faces().walls.len(),
        level.collision.grid().cell_count()
    );
    println!("[Preview] spirits to collect: {}", level.spirit_points().len());

    // Drive straight ahead for five simulated seconds
    let spawn = level.spawn_points[0] + Vec3::new(0.0, 2.0, 0.0);
    let mut car = VehicleController::new(spawn);
    let mut clock = FrameClock::default();
    let input = DriveInput {
        throttle: 1.0,
        ..DriveInput::default()
    };

    let mut simulated = 0.0_f32;
    while simulated < 5.0 {
        let elapsed = 1.0 / 60.0;
        for _ in 0..clock.tick(elapsed) {
            car.update(clock.step_seconds(), &input, &level.collision);
        }
        simulated += elapsed;
    }

    let traveled = (car.state.chassis_center - spawn).length();
    println!(
        "[Preview] car drove {:.1}m, resting at ({:.1}, {:.1}, {:.1}), grounded: {}",
        traveled,
        car.state.chassis_center.x,
        car.state.chassis_center.y,
        car.state.chassis_center.z,
        car.state.grounded
    );
}
