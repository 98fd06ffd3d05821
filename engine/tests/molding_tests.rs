//! Molding Tests - Index Invariants, Projection Shapes, and Normal Welding
//!
//! Integration coverage for the mesh molding builder: index-buffer safety
//! across arbitrary select/delete chains, sphere projection quality, and
//! seam behavior of the two normal policies.

use glam::Vec3;

use grove_drift_engine::MoldableMesh;
use grove_drift_engine::geometry::molding::Axis;
use grove_drift_engine::noise::NoiseField;

// ============================================================================
// Index-Buffer Invariant (must hold after every mutation)
// ============================================================================

fn assert_indices_in_range(mesh: &MoldableMesh, context: &str) {
    let count = mesh.vertex_count() as u16;
    assert!(
        mesh.indices().iter().all(|&i| i < count),
        "index out of range after {} ({} vertices)",
        context,
        count
    );
}

#[test]
fn test_delete_chains_never_dangle() {
    let field = NoiseField::from_seed(9.0);

    // A molded organic shape, then successive carve-offs
    let mut mesh = MoldableMesh::cuboid(6.0, 6.0, 6.0, [4, 4, 4]);
    mesh.spherify(3.0).noisify(&field, 0.4);
    assert_indices_in_range(&mesh, "spherify + noisify");

    mesh.select_where(|p| p.y > 2.0);
    mesh.delete_selected();
    assert_indices_in_range(&mesh, "top carve");

    mesh.select_where(|p| p.x < -2.0);
    mesh.delete_selected();
    assert_indices_in_range(&mesh, "side carve");

    mesh.select_all();
    mesh.translate(Vec3::new(10.0, 0.0, 0.0));
    mesh.select_where(|p| p.z.abs() > 2.0);
    mesh.delete_selected();
    assert_indices_in_range(&mesh, "post-translate carve");
}

#[test]
fn test_delete_everything_leaves_empty_buffers() {
    let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [1, 1, 1]);
    mesh.select_all();
    mesh.delete_selected();
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.index_count(), 0);
}

#[test]
fn test_merge_then_delete_respects_both_halves() {
    let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
    let mut other = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
    other.translate(Vec3::new(10.0, 0.0, 0.0));
    mesh.merge(&other);
    assert_indices_in_range(&mesh, "merge");

    // Delete the merged-in half entirely
    mesh.select_where(|p| p.x > 5.0);
    mesh.delete_selected();
    assert_indices_in_range(&mesh, "delete merged half");
    assert_eq!(mesh.vertex_count(), 54, "original half intact");
}

// ============================================================================
// Sphere Projection + Cross-Plane Normals
// ============================================================================

#[test]
fn test_spherified_cube_normals_point_radially() {
    let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [6, 6, 6]);
    mesh.spherify(4.0);
    mesh.compute_normals_cross_plane();

    // Sample across the vertex range rather than checking the lot
    let samples = (0..mesh.vertex_count()).step_by(7);
    for i in samples {
        let radial = mesh.position(i).normalize();
        let normal = mesh.normal(i);
        let angle = normal.dot(radial).clamp(-1.0, 1.0).acos();
        assert!(
            angle < 0.2,
            "vertex {}: normal {:?} deviates {:.3} rad from radial {:?}",
            i,
            normal,
            angle,
            radial
        );
    }
}

#[test]
fn test_per_plane_normals_keep_seams_hard() {
    let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
    mesh.compute_normals_per_plane();

    // A box corner is three coincident vertices with three distinct normals
    let corner = Vec3::new(1.0, 1.0, 1.0);
    let corner_normals: Vec<Vec3> = (0..mesh.vertex_count())
        .filter(|&i| (mesh.position(i) - corner).length() < 1e-6)
        .map(|i| mesh.normal(i))
        .collect();
    assert_eq!(corner_normals.len(), 3);
    for pair in corner_normals.windows(2) {
        assert!(
            (pair[0] - pair[1]).length() > 0.1,
            "per-plane normals unexpectedly welded: {:?}",
            corner_normals
        );
    }
}

#[test]
fn test_cross_plane_normals_weld_the_same_corner() {
    let mut mesh = MoldableMesh::cuboid(2.0, 2.0, 2.0, [2, 2, 2]);
    mesh.compute_normals_cross_plane();

    let corner = Vec3::new(1.0, 1.0, 1.0);
    let corner_normals: Vec<Vec3> = (0..mesh.vertex_count())
        .filter(|&i| (mesh.position(i) - corner).length() < 1e-6)
        .map(|i| mesh.normal(i))
        .collect();
    assert_eq!(corner_normals.len(), 3);
    for pair in corner_normals.windows(2) {
        assert!(
            (pair[0] - pair[1]).length() < 1e-6,
            "cross-plane normals differ on duplicates: {:?}",
            corner_normals
        );
    }
}

// ============================================================================
// Projection Ops
// ============================================================================

#[test]
fn test_cylindrify_then_done_buffers_match_arena() {
    let mut mesh = MoldableMesh::cuboid(2.0, 8.0, 2.0, [2, 4, 2]);
    mesh.cylindrify(1.3, Axis::Y, None);
    mesh.compute_normals_cross_plane();
    let buffers = mesh.done();

    assert_eq!(buffers.vertices.len(), mesh.vertex_count());
    assert_eq!(buffers.indices.len(), mesh.index_count());
    for (i, vertex) in buffers.vertices.iter().enumerate() {
        assert_eq!(Vec3::from_array(vertex.position), mesh.position(i));
    }
}

#[test]
fn test_redone_buffers_see_later_molding() {
    let mut mesh = MoldableMesh::plane(4.0, 4.0, 2, 2);
    let first = mesh.done();
    mesh.select_all();
    mesh.translate(Vec3::new(0.0, 5.0, 0.0));
    let second = mesh.done();

    assert_eq!(first.vertices[0].position[1] + 5.0, second.vertices[0].position[1]);
}

#[test]
fn test_noisify_keeps_merged_seams_closed() {
    let field = NoiseField::from_seed(4.0);

    // Two abutting planes sharing an edge at x = 0
    let mut left = MoldableMesh::plane(2.0, 2.0, 1, 1);
    left.translate(Vec3::new(-1.0, 0.0, 0.0));
    let mut right = MoldableMesh::plane(2.0, 2.0, 1, 1);
    right.translate(Vec3::new(1.0, 0.0, 0.0));
    left.merge(&right);

    left.select_all();
    left.noisify(&field, 1.0);

    // Coincident edge vertices must end up in identical places
    for i in 0..left.vertex_count() {
        for j in (i + 1)..left.vertex_count() {
            let a = left.position(i);
            let b = left.position(j);
            // They started equal iff both sat on the shared edge; after
            // noisify they must still be equal or far apart
            let distance = (a - b).length();
            assert!(
                distance < 1e-6 || distance > 1e-3,
                "seam split open between {} and {}: {:?} vs {:?}",
                i,
                j,
                a,
                b
            );
        }
    }
}
