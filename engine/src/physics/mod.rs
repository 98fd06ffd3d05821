//! Physics Module
//!
//! Custom collision system, built from scratch without an external physics
//! library. The model is deliberately simple: the world is a bag of
//! triangle faces classified floor/wall/ceiling, bucketed into an XZ grid,
//! and the agent is a point with a horizontal collision radius.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! # Submodules
//!
//! - [`face`] - Collidable triangle faces, classification, extraction
//! - [`grid`] - Sparse XZ bucketing of faces
//! - [`collision`] - The per-frame floor and wall queries

pub mod collision;
pub mod face;
pub mod grid;

// Re-export commonly used types at the physics module level
pub use collision::{
    FLOOR_SNAP_BUFFER, FloorHit, WallContacts, find_floor_height_at_position,
    find_wall_collisions_from_list,
};
pub use face::{Face, GroupedFaces, SurfaceKind, SurfacePolicy, faces_from_node, group_faces};
pub use grid::{CollisionGrid, GridCell, GridLayout};

use glam::Vec3;

/// A level's complete collision state: the face arena plus the spatial
/// index over it. Built once at level load, read-only during play.
#[derive(Clone, Debug)]
pub struct CollisionWorld {
    faces: GroupedFaces,
    grid: CollisionGrid,
}

impl CollisionWorld {
    /// Seal a face collection into a queryable world.
    ///
    /// Sorts floors descending by `upper_y` first - the floor query's
    /// ordering precondition - then buckets everything. Bucket lists
    /// inherit the sorted order.
    pub fn build(mut faces: GroupedFaces, layout: GridLayout) -> Self {
        faces.sort_floors_descending();
        let grid = CollisionGrid::build(layout, &faces);
        Self { faces, grid }
    }

    pub fn faces(&self) -> &GroupedFaces {
        &self.faces
    }

    pub fn grid(&self) -> &CollisionGrid {
        &self.grid
    }

    /// Floor query against the agent's current bucket.
    pub fn floor_at(&self, position: Vec3) -> Option<FloorHit<'_>> {
        let cell = self.grid.cell_at(position)?;
        find_floor_height_at_position(
            cell.floors.iter().map(|&i| &self.faces.floors[i as usize]),
            position,
        )
    }

    /// Wall query against the agent's current bucket.
    pub fn wall_push(&self, position: Vec3, vertical_offset: f32, radius: f32) -> WallContacts<'_> {
        match self.grid.cell_at(position) {
            Some(cell) => find_wall_collisions_from_list(
                cell.walls.iter().map(|&i| &self.faces.walls[i as usize]),
                position,
                vertical_offset,
                radius,
            ),
            None => WallContacts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_world_sorts_floors_and_answers_queries() {
        let mut faces = GroupedFaces::default();
        // Ground then bridge, deliberately unsorted
        faces.floors.push(Face::new(
            Vec3::new(-8.0, 0.0, -8.0),
            Vec3::new(-8.0, 0.0, 8.0),
            Vec3::new(8.0, 0.0, -8.0),
        ));
        faces.floors.push(Face::new(
            Vec3::new(-8.0, 12.0, -8.0),
            Vec3::new(-8.0, 12.0, 8.0),
            Vec3::new(8.0, 12.0, -8.0),
        ));
        let world = CollisionWorld::build(faces, GridLayout::default());

        assert_eq!(world.faces().floors[0].upper_y(), 12.0);
        let hit = world.floor_at(Vec3::new(-2.0, 20.0, -2.0)).unwrap();
        assert_eq!(hit.height, 12.0);
        let hit = world.floor_at(Vec3::new(-2.0, 5.0, -2.0)).unwrap();
        assert_eq!(hit.height, 0.0);
    }

    #[test]
    fn test_world_wall_query_empty_cell() {
        let world = CollisionWorld::build(GroupedFaces::default(), GridLayout::default());
        let contacts = world.wall_push(Vec3::new(3.0, 1.0, 3.0), 1.0, 2.0);
        assert_eq!(contacts.number_of_walls_hit(), 0);
    }
}
