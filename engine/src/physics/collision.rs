//! Collision Solver
//!
//! Per-frame queries resolving a moving agent against the level's
//! collision faces: a floor height lookup (2D triangle containment plus
//! the plane equation) and a wall push-out accumulator (projected
//! containment plus plane-distance penetration). Both are pure functions
//! over face lists; the vehicle controller decides what to do with the
//! results.

use glam::Vec3;

use super::face::Face;

/// A floor must not grab an agent more than this far beneath it.
///
/// The floor query rejects candidates whose surface is above
/// `agent_y - FLOOR_SNAP_BUFFER`; without the allowance, an agent dipping a
/// fraction below a slope between frames would read as "under the floor"
/// and fall through.
pub const FLOOR_SNAP_BUFFER: f32 = -3.0;

/// Walls steeper than 45 degrees toward one horizontal axis are tested in
/// that axis's projection plane.
pub const WALL_AXIS_THRESHOLD: f32 = 0.707;

/// Result of a successful floor query.
#[derive(Debug, Clone, Copy)]
pub struct FloorHit<'a> {
    /// Surface height at the queried XZ position
    pub height: f32,
    /// The face that produced it
    pub floor: &'a Face,
}

/// Accumulated result of a wall query.
#[derive(Debug, Clone, Default)]
pub struct WallContacts<'a> {
    /// Summed push-out vector; add directly to the agent position
    pub push: Vec3,
    /// Every wall within the collision radius
    pub walls: Vec<&'a Face>,
}

impl WallContacts<'_> {
    pub fn number_of_walls_hit(&self) -> usize {
        self.walls.len()
    }
}

/// Find the floor under `position`.
///
/// Walks `floors` in order and returns the first face containing the XZ
/// point whose surface is not above the agent (minus the snap buffer).
/// Precondition: `floors` is sorted by descending `upper_y`, so overlapping
/// floors (a bridge over ground) resolve to the highest valid one.
/// `None` means the agent is over nothing and should keep falling - an
/// expected outcome, not an error.
pub fn find_floor_height_at_position<'a>(
    floors: impl IntoIterator<Item = &'a Face>,
    position: Vec3,
) -> Option<FloorHit<'a>> {
    let (x, z) = (position.x, position.z);

    for face in floors {
        let [p1, p2, p3] = face.points();

        // XZ half-plane tests; floors wind counter-clockwise seen from above
        if (p1.z - z) * (p2.x - p1.x) - (p1.x - x) * (p2.z - p1.z) < 0.0 {
            continue;
        }
        if (p2.z - z) * (p3.x - p2.x) - (p2.x - x) * (p3.z - p2.z) < 0.0 {
            continue;
        }
        if (p3.z - z) * (p1.x - p3.x) - (p3.x - x) * (p1.z - p3.z) < 0.0 {
            continue;
        }

        let normal = face.normal();
        if normal.y == 0.0 {
            continue;
        }
        let height = -(x * normal.x + z * normal.z + face.origin_offset()) / normal.y;

        // Don't snap up through a floor from underneath
        if position.y - (height + FLOOR_SNAP_BUFFER) < 0.0 {
            continue;
        }

        return Some(FloorHit { height, floor: face });
    }
    None
}

/// Collect every wall within `radius` of the agent and the total push-out.
///
/// The probe point is `position` lifted by `vertical_offset`. For each wall
/// whose vertical extent contains the probe and whose plane is within
/// `radius`, a 2D containment test runs in the projection plane of the
/// wall's dominant horizontal axis; hits accumulate `normal * (radius -
/// offset)` into a single additive push. Simultaneous walls are summed, not
/// re-solved - deep corner penetration may not fully resolve in one frame.
pub fn find_wall_collisions_from_list<'a>(
    walls: impl IntoIterator<Item = &'a Face>,
    position: Vec3,
    vertical_offset: f32,
    radius: f32,
) -> WallContacts<'a> {
    let probe = Vec3::new(position.x, position.y + vertical_offset, position.z);
    let mut contacts = WallContacts::default();

    for face in walls {
        if probe.y < face.lower_y() || probe.y > face.upper_y() {
            continue;
        }

        let offset = face.plane_distance(probe);
        if offset < -radius || offset > radius {
            continue;
        }

        let normal = face.normal();
        let [p1, p2, p3] = face.points();

        // Project onto the plane of the dominant horizontal axis. The
        // (u, v) frames below are right-handed as seen from the positive
        // normal side; a negative normal flips the projected winding.
        let inside = if normal.x.abs() > WALL_AXIS_THRESHOLD {
            projected_inside(
                -probe.z,
                probe.y,
                [-p1.z, -p2.z, -p3.z],
                [p1.y, p2.y, p3.y],
                normal.x < 0.0,
            )
        } else {
            projected_inside(
                probe.x,
                probe.y,
                [p1.x, p2.x, p3.x],
                [p1.y, p2.y, p3.y],
                normal.z < 0.0,
            )
        };
        if !inside {
            continue;
        }

        contacts.push += normal * (radius - offset);
        contacts.walls.push(face);
    }

    contacts
}

/// 2D triangle containment via edge cross-product signs. `flip` mirrors the
/// test for triangles whose projected winding is reversed.
fn projected_inside(u: f32, v: f32, us: [f32; 3], vs: [f32; 3], flip: bool) -> bool {
    for edge in 0..3 {
        let (u1, v1) = (us[edge], vs[edge]);
        let (u2, v2) = (us[(edge + 1) % 3], vs[(edge + 1) % 3]);
        let mut cross = (u2 - u1) * (v - v1) - (v2 - v1) * (u - u1);
        if flip {
            cross = -cross;
        }
        if cross < 0.0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A floor triangle at a given height covering the corner (0..8, 0..8).
    fn floor_at(height: f32) -> Face {
        Face::new(
            Vec3::new(0.0, height, 0.0),
            Vec3::new(0.0, height, 8.0),
            Vec3::new(8.0, height, 0.0),
        )
    }

    /// An axis-aligned wall in the x=0 plane facing +x, spanning
    /// z in [-4, 4] and y in [0, 10].
    fn wall_facing_positive_x() -> Face {
        Face::new(
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(0.0, 10.0, 0.0),
        )
    }

    #[test]
    fn test_floor_found_inside_triangle() {
        let floors = [floor_at(2.0)];
        let hit = find_floor_height_at_position(&floors, Vec3::new(1.0, 5.0, 1.0))
            .expect("floor expected");
        assert_eq!(hit.height, 2.0);
    }

    #[test]
    fn test_no_floor_outside_triangle() {
        let floors = [floor_at(2.0)];
        assert!(find_floor_height_at_position(&floors, Vec3::new(7.0, 5.0, 7.0)).is_none());
        assert!(find_floor_height_at_position(&floors, Vec3::new(-1.0, 5.0, 1.0)).is_none());
    }

    #[test]
    fn test_floor_above_agent_is_rejected() {
        let floors = [floor_at(10.0)];
        // Agent well below the floor: not grabbed
        assert!(find_floor_height_at_position(&floors, Vec3::new(1.0, 2.0, 1.0)).is_none());
        // Within the snap buffer: still grabbed
        assert!(find_floor_height_at_position(&floors, Vec3::new(1.0, 8.0, 1.0)).is_some());
    }

    #[test]
    fn test_sloped_floor_height_from_plane_equation() {
        // Plane rising 1 unit of height per unit x
        let slope = Face::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 8.0),
            Vec3::new(8.0, 8.0, 0.0),
        );
        let floors = [slope];
        let hit = find_floor_height_at_position(&floors, Vec3::new(2.0, 10.0, 1.0))
            .expect("slope expected");
        assert!((hit.height - 2.0).abs() < 1e-4, "height {}", hit.height);
    }

    #[test]
    fn test_bridge_over_ground_prefers_highest_valid() {
        // Sorted descending by upper_y, as the level assembler guarantees
        let floors = [floor_at(20.0), floor_at(0.0)];
        let above = Vec3::new(1.0, 25.0, 1.0);
        let hit = find_floor_height_at_position(&floors, above).unwrap();
        assert_eq!(hit.height, 20.0, "agent above the bridge gets the bridge");

        let below = Vec3::new(1.0, 10.0, 1.0);
        let hit = find_floor_height_at_position(&floors, below).unwrap();
        assert_eq!(hit.height, 0.0, "agent under the bridge gets the ground");
    }

    #[test]
    fn test_wall_push_magnitude() {
        let walls = [wall_facing_positive_x()];
        let radius = 2.0;
        // Exactly radius/2 inside the push threshold
        let position = Vec3::new(1.0, 0.0, 0.0);
        let contacts = find_wall_collisions_from_list(&walls, position, 3.0, radius);
        assert_eq!(contacts.number_of_walls_hit(), 1);
        let expected = radius - 1.0;
        assert!(
            (contacts.push.length() - expected).abs() < 1e-4,
            "push {:?}",
            contacts.push
        );
        assert!(contacts.push.x > 0.0, "push follows the wall normal");
    }

    #[test]
    fn test_wall_outside_radius_ignored() {
        let walls = [wall_facing_positive_x()];
        let contacts =
            find_wall_collisions_from_list(&walls, Vec3::new(5.0, 0.0, 0.0), 3.0, 2.0);
        assert_eq!(contacts.number_of_walls_hit(), 0);
        assert_eq!(contacts.push, Vec3::ZERO);
    }

    #[test]
    fn test_wall_vertical_extent_gates() {
        let walls = [wall_facing_positive_x()];
        // Probe above the wall's top edge
        let contacts =
            find_wall_collisions_from_list(&walls, Vec3::new(1.0, 12.0, 0.0), 3.0, 2.0);
        assert_eq!(contacts.number_of_walls_hit(), 0);
    }

    #[test]
    fn test_wall_projection_containment() {
        let walls = [wall_facing_positive_x()];
        // Inside the radius but beyond the triangle's z extent
        let contacts =
            find_wall_collisions_from_list(&walls, Vec3::new(1.0, 0.0, 6.0), 3.0, 2.0);
        assert_eq!(contacts.number_of_walls_hit(), 0);
    }

    #[test]
    fn test_two_walls_accumulate() {
        // A corner: one wall pushes +x, one pushes +z
        let wall_x = wall_facing_positive_x();
        let wall_z = Face::new(
            Vec3::new(-4.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
        );
        assert!(wall_z.normal().z > 0.9, "fixture normal {:?}", wall_z.normal());
        let walls = [wall_x, wall_z];
        let contacts =
            find_wall_collisions_from_list(&walls, Vec3::new(0.5, 0.0, 0.5), 3.0, 2.0);
        assert_eq!(contacts.number_of_walls_hit(), 2);
        assert!(contacts.push.x > 0.0 && contacts.push.z > 0.0);
    }
}
