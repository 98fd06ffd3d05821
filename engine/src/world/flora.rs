//! Scenery Shapes
//!
//! Every prop is molded from a subdivided box: trunks are cylindrified,
//! canopies and rocks are spherified then roughened with noise, grass is a
//! pair of crossed quads. One canonical mesh per prop type; placement
//! variety comes from per-instance transforms, not per-instance geometry.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use crate::geometry::molding::{Axis, MoldableMesh};
use crate::noise::NoiseField;
use crate::physics::face::Face;

/// Trunk cylinder radius, shared by the render mesh and the collision proxy.
pub const TRUNK_RADIUS: f32 = 0.7;

/// Trunk height up to the canopy.
pub const TRUNK_HEIGHT: f32 = 6.0;

/// Canopy sphere radius before noise roughening.
pub const CANOPY_RADIUS: f32 = 2.8;

/// Segments in the tree collision cylinder.
const PROXY_SEGMENTS: usize = 6;

/// Texture-array layers the props render with.
pub mod texture_layer {
    pub const BARK: f32 = 2.0;
    pub const LEAVES: f32 = 3.0;
    pub const ROCK: f32 = 4.0;
    pub const GRASS: f32 = 5.0;
    pub const SPIRIT: f32 = 6.0;
}

/// A tree: cylindrified trunk plus a noisified canopy ball.
///
/// The mesh stands on the origin; placement raises it onto the terrain.
pub fn tree_mesh(field: &NoiseField) -> MoldableMesh {
    let mut trunk = MoldableMesh::cuboid(TRUNK_RADIUS * 2.0, TRUNK_HEIGHT, TRUNK_RADIUS * 2.0, [2, 3, 2]);
    trunk
        .cylindrify(TRUNK_RADIUS, Axis::Y, None)
        .translate(Vec3::new(0.0, TRUNK_HEIGHT / 2.0, 0.0))
        .set_texture_depth(texture_layer::BARK)
        .compute_normals_cross_plane();

    let mut canopy = MoldableMesh::cuboid(4.0, 4.0, 4.0, [3, 3, 3]);
    canopy
        .spherify(CANOPY_RADIUS)
        .noisify(field, 0.55)
        .translate(Vec3::new(0.0, TRUNK_HEIGHT + CANOPY_RADIUS * 0.6, 0.0))
        .set_texture_depth(texture_layer::LEAVES)
        .compute_normals_cross_plane();

    trunk.merge(&canopy);
    trunk
}

/// A rock: squashed, noise-roughened sphere.
pub fn rock_mesh(field: &NoiseField) -> MoldableMesh {
    let mut rock = MoldableMesh::cuboid(3.0, 3.0, 3.0, [2, 2, 2]);
    rock.spherify(1.7)
        .scale(Vec3::new(1.0, 0.72, 1.0))
        .noisify(field, 0.4)
        // Settle the roughened base into the ground
        .translate(Vec3::new(0.0, 0.9, 0.0))
        .set_texture_depth(texture_layer::ROCK)
        .compute_normals_cross_plane();
    rock
}

/// A grass tuft: two crossed vertical quads, no collision ever.
pub fn grass_mesh() -> MoldableMesh {
    let mut blade = MoldableMesh::plane(0.9, 1.1, 1, 1);
    blade
        .rotate(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
        .translate(Vec3::new(0.0, 0.55, 0.0));

    let mut crossed = blade.clone();
    crossed.rotate(Vec3::new(0.0, FRAC_PI_2, 0.0));

    blade.merge(&crossed);
    blade
        .select_all()
        .set_texture_depth(texture_layer::GRASS)
        .compute_normals_per_plane();
    blade
}

/// A spirit pickup: small smooth orb, hovering handled by placement.
pub fn spirit_mesh() -> MoldableMesh {
    let mut orb = MoldableMesh::cuboid(1.0, 1.0, 1.0, [2, 2, 2]);
    orb.spherify(0.55)
        .set_texture_depth(texture_layer::SPIRIT)
        .compute_normals_cross_plane();
    orb
}

/// Collision proxy for a tree: an open cylinder of wall quads around the
/// trunk. Far cheaper than the visual mesh, and the canopy never collides.
pub fn tree_collision_faces(base: Vec3, radius: f32, height: f32) -> Vec<Face> {
    let mut faces = Vec::with_capacity(PROXY_SEGMENTS * 2);
    for segment in 0..PROXY_SEGMENTS {
        let a0 = segment as f32 / PROXY_SEGMENTS as f32 * std::f32::consts::TAU;
        let a1 = (segment + 1) as f32 / PROXY_SEGMENTS as f32 * std::f32::consts::TAU;
        let r0 = Vec3::new(a0.cos(), 0.0, a0.sin()) * radius;
        let r1 = Vec3::new(a1.cos(), 0.0, a1.sin()) * radius;
        let lift = Vec3::new(0.0, height, 0.0);

        let b0 = base + r0;
        let b1 = base + r1;
        let t0 = b0 + lift;
        let t1 = b1 + lift;

        // Outward-facing winding
        faces.push(Face::new(b0, t0, b1));
        faces.push(Face::new(t0, t1, b1));
    }
    faces
}
