//! Grove Drift Engine Library
//!
//! A headless engine core for a 3D driving/collection game. The library
//! covers everything between a noise seed and a playable level: procedural
//! terrain synthesis, mesh molding, collision-face extraction, spatial
//! bucketing, and the per-frame floor/wall collision solver.
//!
//! # Modules
//!
//! - [`noise`] - Seedable permutation-table gradient noise and fractal sums
//! - [`geometry`] - Mesh buffers, GPU vertex layouts, and the molding builder
//! - [`physics`] - Collision faces, the spatial grid, and the collision solver
//! - [`world`] - Heightmaps, scenery scattering, and full level assembly
//! - [`player`] - Vehicle state and per-frame movement resolution
//! - [`frame`] - Fixed-step frame clock
//! - [`scores`] - Best-score persistence
//!
//! # Example
//!
//! ```ignore
//! use grove_drift_engine::world::{LevelParams, build_level};
//! use grove_drift_engine::player::{VehicleController, DriveInput};
//!
//! let params = LevelParams::default();
//! let level = build_level(&params);
//!
//! let mut car = VehicleController::new(level.spawn_points[0]);
//! // Each logical frame:
//! let input = DriveInput::default();
//! car.update(1.0 / 60.0, &input, &level.collision);
//! ```

pub mod frame;
pub mod geometry;
pub mod noise;
pub mod physics;
pub mod player;
pub mod scores;
pub mod world;

// Re-export the workhorse types at crate level for convenience
pub use geometry::molding::MoldableMesh;
pub use noise::{NoiseField, NoiseStyle};
pub use physics::{CollisionWorld, Face, GroupedFaces, SurfacePolicy};
pub use player::{DriveInput, VehicleController};
pub use world::{LevelData, LevelParams, build_level};
