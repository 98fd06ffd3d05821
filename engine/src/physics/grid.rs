//! Collision Grid Module
//!
//! Buckets collidable faces into fixed-size XZ cells so the per-frame
//! solver only walks the handful of faces near the car. Built once when a
//! level loads and read-only afterwards.

use glam::Vec3;
use std::collections::HashMap;

use super::face::GroupedFaces;

/// Cell layout for the collision grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// World units per cell edge
    pub cell_size: f32,
    /// World extends from `-half_extent` to `+half_extent` on x and z
    pub half_extent: f32,
    /// Cells along each axis (`2 * half_extent / cell_size`)
    pub cells_per_axis: i32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            cell_size: 64.0,
            half_extent: 1024.0,
            cells_per_axis: 32,
        }
    }
}

impl GridLayout {
    pub fn new(cell_size: f32, half_extent: f32) -> Self {
        Self {
            cell_size,
            half_extent,
            cells_per_axis: (half_extent * 2.0 / cell_size) as i32,
        }
    }

    /// Flat bucket id for a world position.
    ///
    /// `floor((x + half) / cell) + floor((z + half) / cell) * cells_per_axis`.
    /// Positions outside the world map to out-of-range ids, which simply
    /// address empty buckets.
    pub fn cell_index(&self, point: Vec3) -> i32 {
        let col = ((point.x + self.half_extent) / self.cell_size).floor() as i32;
        let row = ((point.z + self.half_extent) / self.cell_size).floor() as i32;
        col + row * self.cells_per_axis
    }
}

/// Faces overlapping one grid cell, stored as indices into the level's
/// [`GroupedFaces`] arena. A face straddling a cell edge appears in every
/// bucket one of its corners lands in - shared index, not a copy.
#[derive(Clone, Debug, Default)]
pub struct GridCell {
    pub floors: Vec<u32>,
    pub walls: Vec<u32>,
    pub ceilings: Vec<u32>,
}

/// Sparse spatial index over a level's collision faces.
#[derive(Clone, Debug)]
pub struct CollisionGrid {
    layout: GridLayout,
    cells: HashMap<i32, GridCell>,
}

impl CollisionGrid {
    /// Bucket every face of `faces` by the cells of its three corners.
    ///
    /// Bucket lists preserve the arena's iteration order, so floors sorted
    /// descending by `upper_y` stay sorted inside every bucket.
    pub fn build(layout: GridLayout, faces: &GroupedFaces) -> Self {
        let mut cells: HashMap<i32, GridCell> = HashMap::new();

        let mut insert = |point_cells: [i32; 3], push: &mut dyn FnMut(&mut GridCell)| {
            let mut seen = [i32::MIN; 3];
            for (slot, &id) in point_cells.iter().enumerate() {
                if seen[..slot].contains(&id) {
                    continue;
                }
                seen[slot] = id;
                push(cells.entry(id).or_default());
            }
        };

        for (i, face) in faces.floors.iter().enumerate() {
            let ids = face.points().map(|p| layout.cell_index(p));
            insert(ids, &mut |cell| cell.floors.push(i as u32));
        }
        for (i, face) in faces.walls.iter().enumerate() {
            let ids = face.points().map(|p| layout.cell_index(p));
            insert(ids, &mut |cell| cell.walls.push(i as u32));
        }
        for (i, face) in faces.ceilings.iter().enumerate() {
            let ids = face.points().map(|p| layout.cell_index(p));
            insert(ids, &mut |cell| cell.ceilings.push(i as u32));
        }

        Self { layout, cells }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// The bucket containing `point`, if any face was inserted there.
    ///
    /// Known gap: no neighbor-cell search. A query right at a cell border
    /// can miss a face whose corners all bucketed one cell over, even when
    /// it is within collision radius. Acceptable for a small agent against
    /// 64-unit cells; kept to match the behavior the game was tuned on.
    pub fn cell_at(&self, point: Vec3) -> Option<&GridCell> {
        self.cells.get(&self.layout.cell_index(point))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
