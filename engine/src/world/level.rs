//! Level Assembly
//!
//! Composes a playable level out of the lower layers: noise field to
//! heightmap, heightmap to molded floor mesh, floor and scenery to
//! collision faces, faces to spatial grid. Everything is driven by one
//! [`LevelParams`] context object created at load and dropped at teardown;
//! there is no global state.

use glam::{Mat4, Vec3};

use super::flora;
use super::heightmap::Heightmap;
use super::scatter::{ScenerySet, scatter_scenery};
use crate::geometry::{MeshBuffers, MoldableMesh};
use crate::noise::{NoiseField, NoiseStyle};
use crate::physics::face::{GroupedFaces, SurfacePolicy, faces_from_buffers, group_faces};
use crate::physics::{CollisionWorld, GridLayout};

/// The floor never dips further than this below the water surface, so
/// every lake keeps a visible bed.
pub const LAKE_BED_DROP: f32 = 2.6;

/// Texture-array layer rendered where the path blend reaches 1.
const WATER_TEXTURE_LAYER: f32 = 1.0;

/// Everything that parameterizes one level.
///
/// `Default` is the tuning the game ships with; campaign levels override
/// the seed and cosmetic indices from JSON.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Noise seed; fully determines the level layout
    pub seed: f64,
    /// Cells per heightmap axis
    pub heightmap_size: usize,
    /// Terrain noise frequency (lattice cells per heightmap cell)
    pub terrain_frequency: f64,
    /// Terrain fractal octaves
    pub terrain_octaves: u32,
    /// Terrain octave combination style
    pub terrain_style: NoiseStyle,
    /// Terrain height amplitude in world units
    pub terrain_scale: f64,
    /// Y of the water surface
    pub water_level: f32,
    /// Heightmap cells lifted into the boundary rim
    pub border_margin: usize,
    /// World spans -half..+half on x and z
    pub world_half_extent: f32,
    /// Floor mesh subdivisions per axis
    pub floor_segments: usize,
    /// Carve a drivable path through the scenery
    pub path_enabled: bool,
    /// Path noise frequency
    pub path_frequency: f64,
    /// Path noise octaves
    pub path_octaves: u32,
    /// Path field values below this are on the path
    pub path_threshold: f32,
    /// Placement noise frequency
    pub scatter_frequency: f64,
    /// Placement noise octaves
    pub scatter_octaves: u32,
    /// Ground material set the renderer binds
    pub material_index: u32,
    /// Skybox the renderer binds
    pub skybox_index: u32,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            seed: 22.0,
            heightmap_size: super::heightmap::HEIGHTMAP_SIZE,
            terrain_frequency: 1.0 / 64.0,
            terrain_octaves: 4,
            terrain_style: NoiseStyle::Fractal,
            terrain_scale: 100.0,
            water_level: -20.0,
            border_margin: 24,
            world_half_extent: 1024.0,
            floor_segments: 127,
            path_enabled: true,
            path_frequency: 1.0 / 32.0,
            path_octaves: 2,
            path_threshold: 0.05,
            scatter_frequency: 1.0 / 4.0,
            scatter_octaves: 2,
            material_index: 0,
            skybox_index: 0,
        }
    }
}

impl LevelParams {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("level params always serialize")
    }
}

/// A fully assembled level, ready for the renderer and the solver.
#[derive(Clone, Debug)]
pub struct LevelData {
    pub floor: MeshBuffers,
    pub water: MeshBuffers,
    /// Canonical prop meshes, drawn instanced with [`ScenerySet`] transforms
    pub tree_mesh: MeshBuffers,
    pub rock_mesh: MeshBuffers,
    pub grass_mesh: MeshBuffers,
    pub spirit_mesh: MeshBuffers,
    pub scenery: ScenerySet,
    pub collision: CollisionWorld,
    pub spawn_points: Vec<Vec3>,
    pub heightmap: Heightmap,
    /// The parameters this level was built from (seed, material, skybox)
    pub params: LevelParams,
}

impl LevelData {
    /// Spirit pickup positions, exposed for scoring and audio triggers.
    pub fn spirit_points(&self) -> &[Vec3] {
        &self.scenery.spirit_points
    }
}

/// Build a level from scratch.
///
/// Deterministic: the same params produce the same level, faces, and
/// scenery, down to the float.
pub fn build_level(params: &LevelParams) -> LevelData {
    let field = NoiseField::from_seed(params.seed);
    let size = params.heightmap_size;

    // Terrain field, penned in at the rim, with a lake bed under the water
    let mut heightmap = Heightmap::from_noise(
        &field,
        size,
        params.terrain_frequency,
        params.terrain_octaves,
        params.terrain_style,
        params.terrain_scale,
    );
    heightmap.raise_border(params.border_margin);
    heightmap.clamp_lake_bed(params.water_level - LAKE_BED_DROP);

    // Path carving: thin ridges of a Lines field become texture-blend
    // weights and keep the scatter pass away
    let path_weights = params.path_enabled.then(|| {
        let raw = field.landscape(
            size,
            params.path_frequency,
            params.path_octaves,
            NoiseStyle::Lines,
            1.0,
        );
        raw.iter()
            .map(|&v| (1.0 - v / params.path_threshold).clamp(0.0, 1.0))
            .collect::<Vec<f32>>()
    });

    let floor = build_floor_mesh(&heightmap, path_weights.as_deref(), params);
    let water = build_water_mesh(params);

    // Terrain faces use the lenient policy: steep hillsides stay drivable
    let mut extracted = Vec::new();
    faces_from_buffers(&floor, Mat4::IDENTITY, &mut extracted);
    let mut grouped = GroupedFaces::default();
    group_faces(&extracted, SurfacePolicy::TERRAIN, &mut grouped);

    let scenery = scatter_scenery(&field, &heightmap, path_weights.as_deref(), params);

    // Scenery collision: cylinder proxies for trunks, real faces for rocks
    let rock_mesh = flora::rock_mesh(&field).done();
    for tree in &scenery.trees {
        let base = tree.w_axis.truncate();
        let scale = tree.x_axis.truncate().length();
        let proxy = flora::tree_collision_faces(
            base,
            flora::TRUNK_RADIUS * scale,
            flora::TRUNK_HEIGHT * scale,
        );
        group_faces(&proxy, SurfacePolicy::SCENERY, &mut grouped);
    }
    for rock in &scenery.rocks {
        let mut rock_faces = Vec::new();
        faces_from_buffers(&rock_mesh, *rock, &mut rock_faces);
        group_faces(&rock_faces, SurfacePolicy::SCENERY, &mut grouped);
    }

    let layout = GridLayout::new(64.0, params.world_half_extent);
    let collision = CollisionWorld::build(grouped, layout);

    let mut spawn_points = scenery.spawn_points.clone();
    if spawn_points.is_empty() {
        let center = heightmap.sample_bilinear(size as f32 / 2.0, size as f32 / 2.0);
        spawn_points.push(Vec3::new(0.0, center + 1.0, 0.0));
    }

    println!(
        "[LevelGen] seed {}: {} floors, {} walls, {} grid cells",
        params.seed,
        collision.faces().floors.len(),
        collision.faces().walls.len(),
        collision.grid().cell_count(),
    );
    println!(
        "[LevelGen] scenery: {} trees, {} rocks, {} grass, {} spirits, {} spawns",
        scenery.trees.len(),
        scenery.rocks.len(),
        scenery.grass.len(),
        scenery.spirit_points.len(),
        spawn_points.len(),
    );

    LevelData {
        floor,
        water,
        tree_mesh: flora::tree_mesh(&field).done(),
        rock_mesh,
        grass_mesh: flora::grass_mesh().done(),
        spirit_mesh: flora::spirit_mesh().done(),
        scenery,
        collision,
        spawn_points,
        heightmap,
        params: params.clone(),
    }
}

/// Mold the floor: a subdivided plane displaced onto the heightmap, with
/// path weights written into the texture-depth attribute.
fn build_floor_mesh(
    heightmap: &Heightmap,
    path_weights: Option<&[f32]>,
    params: &LevelParams,
) -> MeshBuffers {
    let half = params.world_half_extent;
    let size = heightmap.size();
    let to_cell = (size - 1) as f32 / (half * 2.0);

    let mut floor = MoldableMesh::plane(half * 2.0, half * 2.0, params.floor_segments, params.floor_segments);
    floor.displace(|p| {
        let fx = (p.x + half) * to_cell;
        let fz = (p.z + half) * to_cell;
        Vec3::new(p.x, heightmap.sample_bilinear(fx, fz), p.z)
    });

    if let Some(weights) = path_weights {
        let weight_map = Heightmap::from_values(size, weights.to_vec());
        floor.set_texture_depth_where(|p| {
            let fx = (p.x + half) * to_cell;
            let fz = (p.z + half) * to_cell;
            weight_map.sample_bilinear(fx, fz)
        });
    }

    floor.compute_normals_cross_plane();
    floor.done()
}

/// The water surface: a lightly subdivided plane at the water level.
fn build_water_mesh(params: &LevelParams) -> MeshBuffers {
    let half = params.world_half_extent;
    let mut water = MoldableMesh::plane(half * 2.0, half * 2.0, 7, 7);
    water
        .translate(Vec3::new(0.0, params.water_level, 0.0))
        .set_texture_depth(WATER_TEXTURE_LAYER)
        .compute_normals_per_plane();
    water.done()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_roundtrip() {
        let params = LevelParams {
            seed: 75.0,
            skybox_index: 3,
            ..LevelParams::default()
        };
        let back = LevelParams::from_json(&params.to_json()).unwrap();
        assert_eq!(back.seed, 75.0);
        assert_eq!(back.skybox_index, 3);
        assert_eq!(back.terrain_octaves, params.terrain_octaves);
    }

    #[test]
    fn test_params_partial_json_uses_defaults() {
        let params = LevelParams::from_json(r#"{ "seed": 5.0 }"#).unwrap();
        assert_eq!(params.seed, 5.0);
        assert_eq!(params.heightmap_size, 256);
    }

    #[test]
    fn test_floor_mesh_spans_world() {
        let params = LevelParams {
            heightmap_size: 64,
            floor_segments: 31,
            ..LevelParams::default()
        };
        let field = NoiseField::from_seed(params.seed);
        let heightmap = Heightmap::from_noise(
            &field,
            64,
            params.terrain_frequency,
            params.terrain_octaves,
            params.terrain_style,
            params.terrain_scale,
        );
        let floor = build_floor_mesh(&heightmap, None, &params);
        assert_eq!(floor.vertices.len(), 32 * 32);
        let min_x = floor
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_x, -params.world_half_extent);
    }

    #[test]
    fn test_water_sits_at_water_level() {
        let params = LevelParams::default();
        let water = build_water_mesh(&params);
        assert!(
            water
                .vertices
                .iter()
                .all(|v| v.position[1] == params.water_level)
        );
    }
}
