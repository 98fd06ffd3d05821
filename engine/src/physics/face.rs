//! Collision Faces
//!
//! Converts rendered triangles into the flat world-space representation the
//! collision solver consumes. A face is three points plus the derived plane
//! data; faces are classified as floor, wall, or ceiling by the vertical
//! component of their normal and never mutated after construction.

use glam::{Mat4, Vec3};

use crate::geometry::{MeshBuffers, SceneNode};

/// A collidable world-space triangle.
///
/// Immutable once built. `origin_offset` is the plane-equation constant
/// `-normal . point0`, so `normal . p + origin_offset` is the signed
/// distance of `p` from the face plane.
#[derive(Clone, Copy, Debug)]
pub struct Face {
    points: [Vec3; 3],
    normal: Vec3,
    origin_offset: f32,
    lower_y: f32,
    upper_y: f32,
}

impl Face {
    /// Build a face from three world-space points.
    ///
    /// Degenerate triangles get a zero normal (and classify as walls);
    /// normalization never divides by zero.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            points: [a, b, c],
            normal,
            origin_offset: -normal.dot(a),
            lower_y: a.y.min(b.y).min(c.y),
            upper_y: a.y.max(b.y).max(c.y),
        }
    }

    pub fn points(&self) -> [Vec3; 3] {
        self.points
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn origin_offset(&self) -> f32 {
        self.origin_offset
    }

    pub fn lower_y(&self) -> f32 {
        self.lower_y
    }

    pub fn upper_y(&self) -> f32 {
        self.upper_y
    }

    /// Signed distance from `point` to the face plane.
    pub fn plane_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.origin_offset
    }
}

/// Surface classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Wall,
    Ceiling,
}

/// Classification thresholds on `normal.y`.
///
/// Terrain and scenery use different floor cutoffs: a steep hillside must
/// stay drivable while an equally steep rock flank should push the car
/// back. Both values travel with the call site instead of being branched
/// on, so the two behaviors cannot silently drift apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePolicy {
    /// Faces with `normal.y` above this are floors.
    pub floor_min_ny: f32,
    /// Faces with `normal.y` below this are ceilings.
    pub ceiling_max_ny: f32,
}

impl SurfacePolicy {
    /// Lenient floors for terrain: steep walkable ramps remain floors.
    pub const TERRAIN: Self = Self {
        floor_min_ny: 0.2,
        ceiling_max_ny: -0.5,
    };

    /// Strict floors for scattered props: only near-level tops are floors.
    pub const SCENERY: Self = Self {
        floor_min_ny: 0.5,
        ceiling_max_ny: -0.5,
    };

    pub fn classify(&self, face: &Face) -> SurfaceKind {
        let ny = face.normal().y;
        if ny > self.floor_min_ny {
            SurfaceKind::Floor
        } else if ny < self.ceiling_max_ny {
            SurfaceKind::Ceiling
        } else {
            SurfaceKind::Wall
        }
    }
}

/// Faces bucketed by surface kind.
///
/// Accumulated across many extraction calls while a level is assembled;
/// [`group_faces`] appends and never clears.
#[derive(Clone, Debug, Default)]
pub struct GroupedFaces {
    pub floors: Vec<Face>,
    pub walls: Vec<Face>,
    pub ceilings: Vec<Face>,
}

impl GroupedFaces {
    pub fn len(&self) -> usize {
        self.floors.len() + self.walls.len() + self.ceilings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort floors by descending upper bound.
    ///
    /// The floor query takes the first containing face it finds, so where
    /// floors overlap in XZ (a bridge over a lakebed) the highest must come
    /// first. Level assembly calls this once before the grid is built.
    pub fn sort_floors_descending(&mut self) {
        self.floors.sort_by(|a, b| b.upper_y().total_cmp(&a.upper_y()));
    }
}

/// Extract world-space faces from every triangle of `buffers`.
///
/// Each vertex position is transformed by `transform` exactly once.
pub fn faces_from_buffers(buffers: &MeshBuffers, transform: Mat4, out: &mut Vec<Face>) {
    for triangle in buffers.indices.chunks_exact(3) {
        let a = transform.transform_point3(buffers.position(triangle[0]));
        let b = transform.transform_point3(buffers.position(triangle[1]));
        let c = transform.transform_point3(buffers.position(triangle[2]));
        out.push(Face::new(a, b, c));
    }
}

/// Extract faces from a scene node tree.
///
/// `override_transform`, when given, replaces the node's own world
/// transform entirely - used for an object whose placement is known before
/// it is attached to the scene. It is never combined with the node's
/// transform; exactly one of the two is applied.
pub fn faces_from_node(node: &SceneNode, override_transform: Option<Mat4>, out: &mut Vec<Face>) {
    match node {
        SceneNode::Mesh(mesh) => {
            let transform = override_transform.unwrap_or(mesh.transform);
            faces_from_buffers(&mesh.buffers, transform, out);
        }
        SceneNode::Instanced(instanced) => match override_transform {
            Some(transform) => faces_from_buffers(&instanced.buffers, transform, out),
            None => {
                for &instance in &instanced.instances {
                    faces_from_buffers(&instanced.buffers, instance, out);
                }
            }
        },
        SceneNode::Group(group) => {
            // An override replaces the group's transform; children still
            // compose beneath it
            let base = override_transform.unwrap_or(group.transform);
            for child in &group.children {
                walk_composed(child, base, out);
            }
        }
    }
}

fn walk_composed(node: &SceneNode, parent: Mat4, out: &mut Vec<Face>) {
    match node {
        SceneNode::Mesh(mesh) => faces_from_buffers(&mesh.buffers, parent * mesh.transform, out),
        SceneNode::Instanced(instanced) => {
            for &instance in &instanced.instances {
                faces_from_buffers(&instanced.buffers, parent * instance, out);
            }
        }
        SceneNode::Group(group) => {
            for child in &group.children {
                walk_composed(child, parent * group.transform, out);
            }
        }
    }
}

/// Classify `faces` into `destination`, appending in place.
pub fn group_faces(faces: &[Face], policy: SurfacePolicy, destination: &mut GroupedFaces) {
    for &face in faces {
        match policy.classify(&face) {
            SurfaceKind::Floor => destination.floors.push(face),
            SurfaceKind::Wall => destination.walls.push(face),
            SurfaceKind::Ceiling => destination.ceilings.push(face),
        }
    }
}
