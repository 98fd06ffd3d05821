//! Mesh Molding Builder
//!
//! Every shape in the game - terrain skin, trees, rocks, grass, spirit
//! pickups - starts as a subdivided box or plane and is sculpted through a
//! chain of select + transform calls. The builder owns a vertex arena
//! addressed by index; the working set is an explicit list of indices, and
//! operations that must treat coincident vertices as one (noisify, cross-
//! plane normals) do so with a position-equality pass, never by aliasing.
//!
//! # Example
//!
//! ```ignore
//! let mut rock = MoldableMesh::cuboid(4.0, 4.0, 4.0, [3, 3, 3]);
//! rock.spherify(2.0)
//!     .noisify(&field, 0.6)
//!     .compute_normals_cross_plane();
//! let buffers = rock.done();
//! ```

use glam::{DVec3, EulerRot, Mat3, Vec2, Vec3};
use std::collections::HashMap;

use super::{MeshBuffers, WorldVertex};
use crate::noise::NoiseField;

/// Lattice repeat length for [`MoldableMesh::noisify`] displacement lookups.
const NOISIFY_PERIOD: i64 = 256;

/// Spatial frequency of the noisify displacement field.
const NOISIFY_FREQUENCY: f64 = 0.19;

/// Drop every slot flagged in `removed`, preserving order.
fn retain_kept<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !removed[index];
        index += 1;
        keep
    });
}

/// Axis selector for [`MoldableMesh::cylindrify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A mesh under construction: vertex arena, parallel attributes, a `u16`
/// index buffer, and the current working set of selected vertex indices.
///
/// Invariant: every index-buffer entry stays below the vertex count through
/// every mutation; `delete_selected` renumbers survivors.
#[derive(Clone, Debug, Default)]
pub struct MoldableMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    depths: Vec<f32>,
    indices: Vec<u16>,
    selection: Vec<usize>,
}

impl MoldableMesh {
    pub fn empty() -> Self {
        Self::default()
    }

    /// An axis-aligned box centered on the origin, each face a grid plane
    /// subdivided `segments` times along its two axes.
    ///
    /// Faces do not share vertices: seams stay hard until a cross-plane
    /// normal pass welds them.
    pub fn cuboid(width: f32, height: f32, depth: f32, segments: [usize; 3]) -> Self {
        let [sx, sy, sz] = segments.map(|s| s.max(1));
        let mut mesh = Self::empty();
        // (u, v, w, udir, vdir, plane width, plane height, signed offset)
        mesh.build_plane(2, 1, 0, -1.0, -1.0, depth, height, width, sz, sy); // +x
        mesh.build_plane(2, 1, 0, 1.0, -1.0, depth, height, -width, sz, sy); // -x
        mesh.build_plane(0, 2, 1, 1.0, 1.0, width, depth, height, sx, sz); // +y
        mesh.build_plane(0, 2, 1, 1.0, -1.0, width, depth, -height, sx, sz); // -y
        mesh.build_plane(0, 1, 2, 1.0, -1.0, width, height, depth, sx, sy); // +z
        mesh.build_plane(0, 1, 2, -1.0, -1.0, width, height, -depth, sx, sy); // -z
        mesh.select_all();
        mesh
    }

    /// A one-sided horizontal plane (the top face of a box), facing +Y.
    pub fn plane(width: f32, depth: f32, segments_x: usize, segments_z: usize) -> Self {
        let mut mesh = Self::empty();
        mesh.build_plane(
            0,
            2,
            1,
            1.0,
            1.0,
            width,
            depth,
            0.0,
            segments_x.max(1),
            segments_z.max(1),
        );
        mesh.select_all();
        mesh
    }

    /// Emit one subdivided grid plane. `u`/`v`/`w` are component indices
    /// into [`Vec3`]; the plane spans `u` x `v` and sits at `offset / 2`
    /// along `w`, facing the sign of `offset`.
    fn build_plane(
        &mut self,
        u: usize,
        v: usize,
        w: usize,
        udir: f32,
        vdir: f32,
        plane_width: f32,
        plane_height: f32,
        offset: f32,
        grid_x: usize,
        grid_y: usize,
    ) {
        let segment_width = plane_width / grid_x as f32;
        let segment_height = plane_height / grid_y as f32;
        let half_width = plane_width / 2.0;
        let half_height = plane_height / 2.0;

        let mut normal = Vec3::ZERO;
        normal[w] = if offset >= 0.0 { 1.0 } else { -1.0 };

        let base = self.positions.len();
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - half_height;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - half_width;
                let mut position = Vec3::ZERO;
                position[u] = x * udir;
                position[v] = y * vdir;
                position[w] = offset / 2.0;
                self.positions.push(position);
                self.normals.push(normal);
                self.uvs
                    .push(Vec2::new(ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32));
                self.depths.push(0.0);
            }
        }

        let stride = grid_x + 1;
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = (base + ix + stride * iy) as u16;
                let b = (base + ix + stride * (iy + 1)) as u16;
                let c = (base + ix + 1 + stride * (iy + 1)) as u16;
                let d = (base + ix + 1 + stride * iy) as u16;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        debug_assert!(self.positions.len() <= u16::MAX as usize + 1);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select every vertex.
    pub fn select_all(&mut self) -> &mut Self {
        self.selection = (0..self.positions.len()).collect();
        self
    }

    /// Add the given vertex indices to the working set.
    pub fn select(&mut self, indices: &[usize]) -> &mut Self {
        for &index in indices {
            debug_assert!(index < self.positions.len());
            if !self.selection.contains(&index) {
                self.selection.push(index);
            }
        }
        self
    }

    /// Remove the given vertex indices from the working set.
    pub fn deselect(&mut self, indices: &[usize]) -> &mut Self {
        self.selection.retain(|i| !indices.contains(i));
        self
    }

    /// Replace the working set with every vertex whose position satisfies
    /// the predicate.
    pub fn select_where(&mut self, predicate: impl Fn(Vec3) -> bool) -> &mut Self {
        self.selection = (0..self.positions.len())
            .filter(|&i| predicate(self.positions[i]))
            .collect();
        self
    }

    /// Swap the working set for its complement.
    pub fn invert_selection(&mut self) -> &mut Self {
        let selected: Vec<bool> = {
            let mut flags = vec![false; self.positions.len()];
            for &i in &self.selection {
                flags[i] = true;
            }
            flags
        };
        self.selection = (0..self.positions.len()).filter(|&i| !selected[i]).collect();
        self
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    // ------------------------------------------------------------------
    // Transforms (act on the working set, in place)
    // ------------------------------------------------------------------

    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        for &i in &self.selection {
            self.positions[i] += delta;
        }
        self
    }

    /// Scale about the origin, per component.
    pub fn scale(&mut self, factor: Vec3) -> &mut Self {
        for &i in &self.selection {
            self.positions[i] *= factor;
        }
        self
    }

    /// Rotate about the origin by XYZ Euler angles in radians.
    pub fn rotate(&mut self, euler: Vec3) -> &mut Self {
        let rotation = Mat3::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
        for &i in &self.selection {
            self.positions[i] = rotation * self.positions[i];
        }
        self
    }

    /// Project selected vertices onto the sphere of `radius` about the
    /// origin. Vertices at the origin stay put.
    pub fn spherify(&mut self, radius: f32) -> &mut Self {
        for &i in &self.selection {
            self.positions[i] = self.positions[i].normalize_or_zero() * radius;
        }
        self
    }

    /// Project selected vertices onto a cylinder of `radius` around `axis`,
    /// optionally about an off-origin `center` in the cross-section plane.
    /// The axis component of each vertex is preserved.
    pub fn cylindrify(&mut self, radius: f32, axis: Axis, center: Option<Vec2>) -> &mut Self {
        let center = center.unwrap_or(Vec2::ZERO);
        let (a, b) = match axis {
            // Cross-section plane components, in (center.x, center.y) order
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        };
        for &i in &self.selection {
            let p = self.positions[i];
            let radial = Vec2::new(p[a] - center.x, p[b] - center.y);
            let projected = radial.normalize_or_zero() * radius + center;
            let mut q = p;
            q[a] = projected.x;
            q[b] = projected.y;
            self.positions[i] = q;
        }
        self
    }

    /// Displace each selected vertex along a noise-derived direction,
    /// `scale` units at full amplitude.
    ///
    /// The displacement is a pure function of the vertex position, so
    /// coincident vertices (plane seams) move identically and the seam
    /// stays closed.
    pub fn noisify(&mut self, field: &NoiseField, scale: f32) -> &mut Self {
        for &i in &self.selection {
            let p = self.positions[i].as_dvec3() * NOISIFY_FREQUENCY;
            let displacement = Vec3::new(
                field.noise(p, NOISIFY_PERIOD) as f32,
                field.noise(p + DVec3::splat(17.31), NOISIFY_PERIOD) as f32,
                field.noise(p - DVec3::splat(43.7), NOISIFY_PERIOD) as f32,
            );
            self.positions[i] += displacement * scale;
        }
        self
    }

    /// Move each selected vertex to `f(position)`.
    ///
    /// The workhorse behind heightmap terrain: the floor plane selects all
    /// and displaces each vertex to its sampled height.
    pub fn displace(&mut self, f: impl Fn(Vec3) -> Vec3) -> &mut Self {
        for &i in &self.selection {
            self.positions[i] = f(self.positions[i]);
        }
        self
    }

    /// Reverse the winding of every triangle, flipping which side is culled.
    pub fn invert(&mut self) -> &mut Self {
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(0, 2);
        }
        self
    }

    /// Remove the selected vertices, drop every triangle that references
    /// one, and renumber the surviving index-buffer entries. Clears the
    /// selection.
    pub fn delete_selected(&mut self) -> &mut Self {
        let count = self.positions.len();
        let mut removed = vec![false; count];
        for &i in &self.selection {
            removed[i] = true;
        }

        let mut remap = vec![0u16; count];
        let mut next = 0u16;
        for i in 0..count {
            if !removed[i] {
                remap[i] = next;
                next += 1;
            }
        }

        let surviving: Vec<u16> = self
            .indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&ix| !removed[ix as usize]))
            .flat_map(|tri| tri.iter().map(|&ix| remap[ix as usize]))
            .collect();
        self.indices = surviving;

        retain_kept(&mut self.positions, &removed);
        retain_kept(&mut self.normals, &removed);
        retain_kept(&mut self.uvs, &removed);
        retain_kept(&mut self.depths, &removed);

        self.selection.clear();
        self
    }

    /// Append another builder's vertices and triangles onto this one.
    /// Indices are offset by the current vertex count; the working set is
    /// left untouched.
    pub fn merge(&mut self, other: &MoldableMesh) -> &mut Self {
        let offset = self.positions.len();
        debug_assert!(offset + other.positions.len() <= u16::MAX as usize + 1);
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.depths.extend_from_slice(&other.depths);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset as u16));
        self
    }

    /// Overwrite the texture-depth attribute of every selected vertex.
    pub fn set_texture_depth(&mut self, depth: f32) -> &mut Self {
        for &i in &self.selection {
            self.depths[i] = depth;
        }
        self
    }

    /// Overwrite the texture-depth attribute per selected vertex from its
    /// position.
    pub fn set_texture_depth_where(&mut self, depth_at: impl Fn(Vec3) -> f32) -> &mut Self {
        for &i in &self.selection {
            self.depths[i] = depth_at(self.positions[i]);
        }
        self
    }

    // ------------------------------------------------------------------
    // Normals
    // ------------------------------------------------------------------

    /// Per-vertex normals averaged by array index.
    ///
    /// Vertices on a seam between two planes are distinct entries, so each
    /// side keeps its own flat-ish normal - right for boxy shapes.
    pub fn compute_normals_per_plane(&mut self) -> &mut Self {
        let accumulated = self.accumulate_face_normals(None);
        for (i, n) in accumulated.into_iter().enumerate() {
            self.normals[i] = n.normalize_or_zero();
        }
        self
    }

    /// Per-vertex normals averaged by vertex position across the current
    /// selection.
    ///
    /// Coincident selected vertices are collapsed to one representative,
    /// the index buffer is remapped through that collapse for the
    /// averaging, and the result is scattered back to every duplicate -
    /// shading then flows smoothly across plane seams.
    pub fn compute_normals_cross_plane(&mut self) -> &mut Self {
        let count = self.positions.len();
        let mut representative: HashMap<[u32; 3], usize> = HashMap::new();
        let mut remap: Vec<usize> = (0..count).collect();
        for &i in &self.selection {
            let p = self.positions[i];
            // +0.0 folds -0.0 onto +0.0 so both zero signs weld
            let key = [
                (p.x + 0.0).to_bits(),
                (p.y + 0.0).to_bits(),
                (p.z + 0.0).to_bits(),
            ];
            remap[i] = *representative.entry(key).or_insert(i);
        }

        let accumulated = self.accumulate_face_normals(Some(&remap));
        for i in 0..count {
            self.normals[i] = accumulated[remap[i]].normalize_or_zero();
        }
        self
    }

    /// Sum area-weighted face normals per vertex slot, optionally routing
    /// each index through a remap first.
    fn accumulate_face_normals(&self, remap: Option<&[usize]>) -> Vec<Vec3> {
        let mut accumulated = vec![Vec3::ZERO; self.positions.len()];
        for triangle in self.indices.chunks_exact(3) {
            let route = |ix: u16| match remap {
                Some(map) => map[ix as usize],
                None => ix as usize,
            };
            let (a, b, c) = (route(triangle[0]), route(triangle[1]), route(triangle[2]));
            let normal =
                (self.positions[b] - self.positions[a]).cross(self.positions[c] - self.positions[a]);
            accumulated[a] += normal;
            accumulated[b] += normal;
            accumulated[c] += normal;
        }
        accumulated
    }

    // ------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------

    /// Flatten the arena into renderable attribute buffers.
    ///
    /// Call after the molding chain; call again if the mesh is mutated
    /// afterwards.
    pub fn done(&self) -> MeshBuffers {
        let vertices = (0..self.positions.len())
            .map(|i| WorldVertex {
                position: self.positions[i].to_array(),
                normal: self.normals[i].to_array(),
                uv: self.uvs[i].to_array(),
                texture_depth: self.depths[i],
            })
            .collect();
        MeshBuffers {
            vertices,
            indices: self.indices.clone(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.positions[index]
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        self.normals[index]
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::NoiseField;

    #[test]
    fn test_cuboid_counts() {
        let mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [1, 1, 1]);
        // 6 planes, 4 vertices and 2 triangles each
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.selection_len(), 24);
    }

    #[test]
    fn test_subdivided_cuboid_counts() {
        let mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 3, 4]);
        // +x/-x: (4+1)*(3+1), +y/-y: (2+1)*(4+1), +z/-z: (2+1)*(3+1)
        assert_eq!(mesh.vertex_count(), 2 * (20 + 15 + 12));
        // 2 triangles per grid quad
        assert_eq!(mesh.index_count() / 3, 2 * 2 * (4 * 3 + 2 * 4 + 2 * 3));
    }

    #[test]
    fn test_indices_in_range_after_construction() {
        let mesh = MoldableMesh::cuboid(1.0, 2.0, 3.0, [3, 2, 5]);
        let count = mesh.vertex_count() as u16;
        assert!(mesh.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn test_plane_faces_up() {
        let mut mesh = MoldableMesh::plane(10.0, 10.0, 2, 2);
        mesh.compute_normals_per_plane();
        for i in 0..mesh.vertex_count() {
            assert!(mesh.normal(i).y > 0.99, "normal {:?}", mesh.normal(i));
        }
    }

    #[test]
    fn test_translate_affects_only_selection() {
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [1, 1, 1]);
        let before = mesh.position(5);
        mesh.select_where(|p| p.y > 0.0);
        let moved = mesh.selection_len();
        assert!(moved > 0 && moved < mesh.vertex_count());
        mesh.translate(Vec3::new(0.0, 3.0, 0.0));
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            assert!(p.y > 2.0 || p.y <= 0.0, "seam vertex drifted: {:?}", p);
        }
        // An unselected vertex is untouched
        if before.y <= 0.0 {
            assert_eq!(mesh.position(5), before);
        }
    }

    #[test]
    fn test_invert_selection_partitions() {
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [1, 1, 1]);
        mesh.select_where(|p| p.x > 0.0);
        let selected = mesh.selection_len();
        mesh.invert_selection();
        assert_eq!(selected + mesh.selection_len(), mesh.vertex_count());
    }

    #[test]
    fn test_spherify_puts_vertices_on_sphere() {
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [4, 4, 4]);
        mesh.spherify(3.0);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.position(i).length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_cylindrify_off_center() {
        let mut mesh = MoldableMesh::cuboid(2.0, 4.0, 2.0, [2, 2, 2]);
        let center = Vec2::new(5.0, -1.0);
        mesh.cylindrify(1.5, Axis::Y, Some(center));
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i);
            let radial = Vec2::new(p.x, p.z) - center;
            assert!((radial.length() - 1.5).abs() < 1e-4, "at {:?}", p);
        }
    }

    #[test]
    fn test_cylindrify_preserves_axis_component() {
        let mut mesh = MoldableMesh::cuboid(2.0, 4.0, 2.0, [1, 3, 1]);
        let heights: Vec<f32> = (0..mesh.vertex_count()).map(|i| mesh.position(i).y).collect();
        mesh.cylindrify(1.0, Axis::Y, None);
        for (i, &y) in heights.iter().enumerate() {
            assert_eq!(mesh.position(i).y, y);
        }
    }

    #[test]
    fn test_noisify_moves_coincident_vertices_together() {
        let field = NoiseField::from_seed(7.0);
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [1, 1, 1]);
        // Corner (1,1,1) appears once per adjacent plane
        let corners: Vec<usize> = (0..mesh.vertex_count())
            .filter(|&i| (mesh.position(i) - Vec3::ONE).length() < 1e-6)
            .collect();
        assert_eq!(corners.len(), 3);
        mesh.noisify(&field, 0.5);
        let moved = mesh.position(corners[0]);
        for &i in &corners[1..] {
            assert_eq!(mesh.position(i), moved);
        }
    }

    #[test]
    fn test_delete_renumbers_indices() {
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
        mesh.select_where(|p| p.y > 0.5);
        assert!(mesh.selection_len() > 0);
        mesh.delete_selected();
        let count = mesh.vertex_count() as u16;
        assert!(count > 0);
        assert!(
            mesh.indices().iter().all(|&i| i < count),
            "dangling index after delete"
        );
        assert_eq!(mesh.selection_len(), 0);
    }

    #[test]
    fn test_repeated_delete_keeps_indices_valid() {
        let mut mesh = MoldableMesh::cuboid(4.0, 4.0, 4.0, [3, 3, 3]);
        for threshold in [1.5, 0.5, -0.5] {
            mesh.select_where(|p| p.y > threshold);
            mesh.delete_selected();
            let count = mesh.vertex_count() as u16;
            assert!(mesh.indices().iter().all(|&i| i < count));
        }
    }

    #[test]
    fn test_invert_flips_winding() {
        let mut mesh = MoldableMesh::plane(2.0, 2.0, 1, 1);
        mesh.compute_normals_per_plane();
        let up = mesh.normal(0);
        mesh.invert();
        mesh.compute_normals_per_plane();
        assert!((mesh.normal(0) + up).length() < 1e-5, "winding not flipped");
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = MoldableMesh::plane(1.0, 1.0, 1, 1);
        let b = MoldableMesh::plane(1.0, 1.0, 1, 1);
        let base = a.vertex_count() as u16;
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert!(a.indices()[6..].iter().all(|&i| i >= base));
    }

    #[test]
    fn test_cross_plane_normals_weld_seams() {
        let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
        mesh.spherify(1.0);
        mesh.compute_normals_cross_plane();
        // On a sphere about the origin, the welded normal points radially
        for i in 0..mesh.vertex_count() {
            let radial = mesh.position(i).normalize();
            let dot = mesh.normal(i).dot(radial);
            assert!(dot > 0.9, "vertex {} normal {:?} off-radial", i, mesh.normal(i));
        }
    }
}
