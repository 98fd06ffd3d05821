//! Scenery Scatter
//!
//! One pass over the heightmap decides, cell by cell, what grows there:
//! rock, spirit pickup, creature spawn point, tree, or grass. The decision
//! reads a dedicated placement-noise field through fixed value bands -
//! tuned content, kept together in one constant block.

use glam::{Mat4, Quat, Vec3};

use super::heightmap::Heightmap;
use super::level::LevelParams;
use crate::noise::{NoiseField, NoiseStyle, random_number};

// ----------------------------------------------------------------------
// Placement tuning. The bands partition the placement field's value range;
// touching them reshapes every forest in the game.
// ----------------------------------------------------------------------

/// Spirit pickups spawn where the field lands in this band.
pub const SPIRIT_BAND: (f32, f32) = (0.64, 0.68);

/// Trees grow in this band.
pub const TREE_BAND: (f32, f32) = (0.44, 0.62);

/// Grass tufts fill this band.
pub const GRASS_BAND: (f32, f32) = (0.12, 0.38);

/// Creature spawn points use this band.
pub const SPAWN_BAND: (f32, f32) = (-0.68, -0.64);

/// Rocks land in this band.
pub const ROCK_BAND: (f32, f32) = (-0.60, -0.52);

/// Minimum XZ distance between two tree trunks.
pub const TREE_SPACING: f32 = 16.0;

/// Minimum XZ distance between two spirit pickups.
pub const SPIRIT_SPACING: f32 = 50.0;

/// Cells closer than this to the water surface stay bare.
pub const WATER_CLEARANCE: f32 = 0.5;

/// Path-blend weight above which a cell counts as on the path.
pub const PATH_BLOCK: f32 = 0.25;

/// Spirits hover this far above the terrain.
pub const SPIRIT_HOVER: f32 = 2.0;

fn in_band(value: f32, band: (f32, f32)) -> bool {
    value > band.0 && value < band.1
}

/// Everything the scatter pass places: instance transforms per prop type
/// plus the gameplay point sets.
#[derive(Clone, Debug, Default)]
pub struct ScenerySet {
    pub trees: Vec<Mat4>,
    pub rocks: Vec<Mat4>,
    pub grass: Vec<Mat4>,
    pub spirit_points: Vec<Vec3>,
    pub spawn_points: Vec<Vec3>,
}

impl ScenerySet {
    pub fn total_instances(&self) -> usize {
        self.trees.len() + self.rocks.len() + self.grass.len()
    }
}

/// Does `candidate` keep `spacing` from every point already in `placed`?
fn clear_of(placed: &[Vec3], candidate: Vec3, spacing: f32) -> bool {
    placed.iter().all(|p| {
        let dx = p.x - candidate.x;
        let dz = p.z - candidate.z;
        (dx * dx + dz * dz).sqrt() >= spacing
    })
}

/// Per-placement yaw/scale jitter derived from the cell id, so layouts stay
/// deterministic for a seed.
fn jitter(cell_id: usize) -> (f32, f32) {
    let draw = random_number(cell_id as f64);
    let yaw = draw as f32 * std::f32::consts::PI;
    let scale = 0.85 + draw.abs() as f32 * 0.3;
    (yaw, scale)
}

/// Run the scatter pass.
///
/// `path` is the per-cell path-blend weight (1 = center of the path);
/// scenery never grows on the path. Trees keep [`TREE_SPACING`] between
/// trunks and spirits keep [`SPIRIT_SPACING`] between pickups; everything
/// else lands wherever its band fires.
pub fn scatter_scenery(
    field: &NoiseField,
    heightmap: &Heightmap,
    path: Option<&[f32]>,
    params: &LevelParams,
) -> ScenerySet {
    let size = heightmap.size();
    let placement = field.landscape(
        size,
        params.scatter_frequency,
        params.scatter_octaves,
        NoiseStyle::Fractal,
        1.0,
    );

    let spacing = params.world_half_extent * 2.0 / size as f32;
    let mut set = ScenerySet::default();
    let mut tree_bases: Vec<Vec3> = Vec::new();

    for y in 0..size {
        for x in 0..size {
            let cell = y * size + x;
            let height = heightmap.get(x, y);
            if height < params.water_level + WATER_CLEARANCE {
                continue;
            }
            if let Some(weights) = path {
                if weights[cell] > PATH_BLOCK {
                    continue;
                }
            }

            let value = placement[cell];
            let world = Vec3::new(
                (x as f32 + 0.5) * spacing - params.world_half_extent,
                height,
                (y as f32 + 0.5) * spacing - params.world_half_extent,
            );
            let (yaw, scale) = jitter(cell);

            if in_band(value, SPIRIT_BAND) {
                if clear_of(&set.spirit_points, world, SPIRIT_SPACING) {
                    set.spirit_points
                        .push(world + Vec3::new(0.0, SPIRIT_HOVER, 0.0));
                }
            } else if in_band(value, TREE_BAND) {
                if clear_of(&tree_bases, world, TREE_SPACING) {
                    tree_bases.push(world);
                    set.trees.push(Mat4::from_scale_rotation_translation(
                        Vec3::splat(scale),
                        Quat::from_rotation_y(yaw),
                        world,
                    ));
                }
            } else if in_band(value, GRASS_BAND) {
                set.grass.push(Mat4::from_scale_rotation_translation(
                    Vec3::splat(scale),
                    Quat::from_rotation_y(yaw),
                    world,
                ));
            } else if in_band(value, SPAWN_BAND) {
                set.spawn_points.push(world);
            } else if in_band(value, ROCK_BAND) {
                set.rocks.push(Mat4::from_scale_rotation_translation(
                    Vec3::splat(scale),
                    Quat::from_rotation_y(yaw),
                    world,
                ));
            }
        }
    }

    set
}
