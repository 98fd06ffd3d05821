//! Vehicle Controller
//!
//! Per-frame movement resolution for the player car. The controller owns
//! the agent state the collision solver operates on (chassis center,
//! velocity, jump flag) and runs the frame order the solver expects:
//! input and gravity into velocity, integrate, resolve walls, then floors.
//!
//! # Physics Model
//!
//! - Top speed: 28.0 m/s
//! - Engine acceleration: 40.0 m/s^2
//! - Coast deceleration: 14.0 m/s^2
//! - Gravity: 25.0 m/s^2

use glam::Vec3;

use crate::physics::CollisionWorld;

/// Top speed in meters per second
pub const TOP_SPEED: f32 = 28.0;

/// Engine acceleration in meters per second squared
pub const ENGINE_ACCELERATION: f32 = 40.0;

/// Deceleration when coasting, in meters per second squared
pub const COAST_DECELERATION: f32 = 14.0;

/// Deceleration under the handbrake, in meters per second squared
pub const BRAKE_DECELERATION: f32 = 55.0;

/// Yaw rate at full steering lock, radians per second
pub const STEER_RATE: f32 = 1.9;

/// Gravity acceleration in meters per second squared
pub const GRAVITY: f32 = 25.0;

/// Vertical velocity applied on a jump, meters per second
pub const JUMP_VELOCITY: f32 = 10.0;

/// Horizontal collision radius of the chassis
pub const WALL_RADIUS: f32 = 2.5;

/// Wall probe height above the chassis center
pub const WALL_PROBE_OFFSET: f32 = 1.2;

/// Frame intent from the control layer.
///
/// Always fully populated - a disconnected device reads as the default
/// (no throttle, no steer), never as missing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveInput {
    /// Forward drive in [-1, 1]; negative reverses
    pub throttle: f32,
    /// Steering in [-1, 1]; positive steers right
    pub steer: f32,
    /// Handbrake engaged
    pub handbrake: bool,
    /// Jump requested this frame
    pub jump: bool,
}

/// The agent state the collision solver reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct VehicleState {
    /// World position of the chassis center, at ground contact height
    pub chassis_center: Vec3,
    /// World-space velocity in m/s
    pub velocity: Vec3,
    /// Heading angle around +Y, radians
    pub yaw: f32,
    /// Airborne due to a jump (cleared on floor contact)
    pub is_jumping: bool,
    /// Standing on a floor as of the last update
    pub grounded: bool,
}

/// Physics-based car controller.
///
/// Speeds and rates default from the module constants; tweak the public
/// fields for special vehicles.
#[derive(Debug, Clone)]
pub struct VehicleController {
    pub state: VehicleState,
    pub top_speed: f32,
    pub acceleration: f32,
    pub coast_deceleration: f32,
    pub brake_deceleration: f32,
    pub steer_rate: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub wall_radius: f32,
}

impl VehicleController {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            state: VehicleState {
                chassis_center: spawn,
                velocity: Vec3::ZERO,
                yaw: 0.0,
                is_jumping: false,
                grounded: false,
            },
            top_speed: TOP_SPEED,
            acceleration: ENGINE_ACCELERATION,
            coast_deceleration: COAST_DECELERATION,
            brake_deceleration: BRAKE_DECELERATION,
            steer_rate: STEER_RATE,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            wall_radius: WALL_RADIUS,
        }
    }

    /// Heading direction on the ground plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.state.yaw.sin(), 0.0, -self.state.yaw.cos())
    }

    /// Advance one logical frame.
    ///
    /// Wall contacts push the chassis out and kill the velocity component
    /// into the wall; floor contact snaps to the surface, zeroes vertical
    /// velocity, and clears the jump flag. With no floor below, the car
    /// keeps falling - that is a normal state, not an error.
    pub fn update(&mut self, dt: f32, input: &DriveInput, world: &CollisionWorld) {
        let state = &mut self.state;

        // Steering authority scales with speed so a parked car cannot spin
        let planar_speed = Vec3::new(state.velocity.x, 0.0, state.velocity.z).length();
        let authority = (planar_speed / 6.0).min(1.0);
        state.yaw += input.steer * self.steer_rate * authority * dt;

        // Drive force along the heading
        let forward = Vec3::new(state.yaw.sin(), 0.0, -state.yaw.cos());
        let planar = Vec3::new(state.velocity.x, 0.0, state.velocity.z);
        let target = if input.handbrake {
            Vec3::ZERO
        } else {
            forward * input.throttle * self.top_speed
        };
        let rate = if input.handbrake {
            self.brake_deceleration
        } else if input.throttle.abs() > 0.01 {
            self.acceleration
        } else {
            self.coast_deceleration
        };
        let delta = target - planar;
        let step = (rate * dt).min(delta.length());
        let planar = planar + delta.normalize_or_zero() * step;
        state.velocity.x = planar.x;
        state.velocity.z = planar.z;

        state.velocity.y -= self.gravity * dt;
        state.chassis_center += state.velocity * dt;

        // Walls first: push out, then slide by dropping velocity into them
        let contacts = world.wall_push(state.chassis_center, WALL_PROBE_OFFSET, self.wall_radius);
        if contacts.number_of_walls_hit() > 0 {
            state.chassis_center += contacts.push;
            for wall in &contacts.walls {
                let normal = wall.normal();
                let into = state.velocity.dot(normal);
                if into < 0.0 {
                    state.velocity -= normal * into;
                }
            }
        }

        // Floor: snap onto the surface when falling through or resting
        state.grounded = false;
        if let Some(hit) = world.floor_at(state.chassis_center) {
            if state.chassis_center.y <= hit.height {
                state.chassis_center.y = hit.height;
                state.velocity.y = 0.0;
                state.is_jumping = false;
                state.grounded = true;
            }
        }

        if state.grounded && input.jump {
            state.velocity.y = self.jump_velocity;
            state.is_jumping = true;
            state.grounded = false;
        }
    }
}
