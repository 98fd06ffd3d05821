//! Geometry Module
//!
//! Mesh data shared between the molding builder, the collision extractor,
//! and the renderer boundary: the interleaved vertex layout, the
//! per-instance transform layout for scattered scenery, and the scene-node
//! tree the face extractor walks.
//!
//! The engine does not issue draw calls; these buffers are the hand-off
//! format an external renderer binds directly.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use static_assertions::assert_eq_size;

pub mod molding;

pub use molding::{Axis, MoldableMesh};

// ============================================================================
// GPU VERTEX TYPES
// ============================================================================

/// Interleaved vertex for terrain and molded meshes.
///
/// Layout is position:3, normal:3, uv:2, texture_depth:1 - 36 bytes,
/// matching the vertex attribute bindings of the host renderer.
/// `texture_depth` selects a layer in the material texture array and is
/// where the level assembler writes path-blend weights.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WorldVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub texture_depth: f32,
}

assert_eq_size!(WorldVertex, [u8; 36]);

/// Per-instance data for scattered scenery (trees, rocks, grass).
///
/// A 4x4 world transform plus the inverse-transpose of its upper 3x3,
/// padded to vec4 columns - 112 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneryInstance {
    pub transform: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
}

assert_eq_size!(SceneryInstance, [u8; 112]);

impl SceneryInstance {
    /// Build instance data from a world transform.
    ///
    /// The normal matrix is the inverse-transpose of the rotation/scale
    /// block so non-uniform scales light correctly.
    pub fn from_transform(transform: Mat4) -> Self {
        let linear = Mat3::from_mat4(transform);
        let normal = linear.inverse().transpose();
        let columns = normal.to_cols_array_2d();
        Self {
            transform: transform.to_cols_array_2d(),
            normal_matrix: [
                [columns[0][0], columns[0][1], columns[0][2], 0.0],
                [columns[1][0], columns[1][1], columns[1][2], 0.0],
                [columns[2][0], columns[2][1], columns[2][2], 0.0],
            ],
        }
    }
}

// ============================================================================
// MESH BUFFERS
// ============================================================================

/// Finalized, renderable mesh data produced by [`molding::MoldableMesh::done`].
///
/// Treated as immutable once built; re-run `done` after any further molding
/// to refresh it.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    pub vertices: Vec<WorldVertex>,
    pub indices: Vec<u16>,
}

impl MeshBuffers {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of the vertex behind an index-buffer entry.
    pub fn position(&self, index: u16) -> Vec3 {
        Vec3::from_array(self.vertices[index as usize].position)
    }
}

// ============================================================================
// SCENE NODES
// ============================================================================

/// A mesh with a single world transform.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub buffers: MeshBuffers,
    pub transform: Mat4,
}

/// A mesh drawn many times, once per instance transform.
#[derive(Clone, Debug)]
pub struct InstancedNode {
    pub buffers: MeshBuffers,
    pub instances: Vec<Mat4>,
}

impl InstancedNode {
    /// Flatten the instance transforms into the GPU per-instance layout.
    pub fn instance_buffer(&self) -> Vec<SceneryInstance> {
        self.instances
            .iter()
            .map(|&t| SceneryInstance::from_transform(t))
            .collect()
    }
}

/// A transform applied to a list of child nodes.
#[derive(Clone, Debug)]
pub struct GroupNode {
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

/// Scene-graph node.
///
/// Every traversal matches exhaustively on this - there is no "is this a
/// mesh" sniffing anywhere in the engine.
#[derive(Clone, Debug)]
pub enum SceneNode {
    Mesh(MeshNode),
    Instanced(InstancedNode),
    Group(GroupNode),
}
