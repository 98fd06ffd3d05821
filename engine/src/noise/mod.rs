//! Procedural Noise Module
//!
//! Seedable gradient noise used for heightmaps and scenery placement.
//! All lattice math runs in `f64`: the landscape output doubles as a
//! regression target, so results must be identical run to run and across
//! machines with IEEE-754 doubles.
//!
//! The generator is built around a 256-entry permutation table shuffled by
//! a sin-based hash, plus a table of 256 precomputed gradient directions.
//! Fractal sums combine octaves under one of five [`NoiseStyle`] policies,
//! which produce visibly different terrain (rolling hills, ridged rock,
//! carved paths).

use glam::DVec3;
use std::f64::consts::TAU;

/// Entries in the permutation table (duplicated to 512 to skip wrap checks).
const TABLE_SIZE: usize = 256;

/// Deterministic scalar hash in (-1, 1).
///
/// Not a uniform RNG - a repeatable mixing function. The constants match the
/// classic shader one-liner and must not change: the permutation shuffle and
/// therefore every generated level depends on them.
pub fn random_number(seed: f64) -> f64 {
    ((seed * 127.1 + 311.7).sin() * 43758.5453).fract()
}

/// Octave combination policy for [`NoiseField::fractal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NoiseStyle {
    /// Plain octave sum - rolling terrain.
    Fractal,
    /// Sum of absolute values - billowy, rocky.
    Turbulent,
    /// Subtract absolute values - creased valleys.
    Edge,
    /// Last octave wins - soft isolated blobs.
    Blobs,
    /// Absolute value of the last octave - thin bright ridges, used for paths.
    Lines,
}

/// Seeded gradient-noise generator.
///
/// Holds the shuffled permutation table and the gradient direction table.
/// Immutable after construction; one field is shared by every consumer of a
/// level's randomness (terrain, paths, scatter) so a single seed fully
/// determines the level.
pub struct NoiseField {
    /// Permutation of 0..=255, stored twice over so `perm[a + b]` never
    /// needs an explicit wrap for `a, b <= 255`.
    perm: [usize; TABLE_SIZE * 2],
    /// 256 unit directions at angles `i * 2pi / 256`, used as
    /// (cos, sin, cos) triples. The z component reuses cos; the original
    /// engine shipped this way and the terrain is tuned around it.
    directions: [DVec3; TABLE_SIZE],
}

impl NoiseField {
    /// Build a noise field from a seed.
    ///
    /// The permutation table is a Fisher-Yates shuffle of `[0, 255]` driven
    /// by [`random_number`], reseeding from the last draw after every swap.
    /// The whole sequence is therefore a pure function of `seed`.
    pub fn from_seed(seed: f64) -> Self {
        let mut table: [usize; TABLE_SIZE] = std::array::from_fn(|i| i);

        let mut draw = seed;
        for i in (1..TABLE_SIZE).rev() {
            draw = random_number(draw);
            // |draw| < 1, so the target index is always in [0, i]
            let j = (draw.abs() * (i as f64 + 1.0)) as usize;
            table.swap(i, j);
        }

        let perm = std::array::from_fn(|i| table[i % TABLE_SIZE]);

        let directions = std::array::from_fn(|i| {
            let angle = i as f64 * TAU / TABLE_SIZE as f64;
            DVec3::new(angle.cos(), angle.sin(), angle.cos())
        });

        Self { perm, directions }
    }

    /// Pick a gradient direction for a lattice corner.
    ///
    /// Triple-hashes the integer coordinates, each wrapped to `period`,
    /// through the permutation table. `period` is the lattice repeat length;
    /// values above 256 alias back into the table.
    fn corner_direction(&self, x: i64, y: i64, z: i64, period: i64) -> DVec3 {
        let xi = x.rem_euclid(period) as usize % TABLE_SIZE;
        let yi = y.rem_euclid(period) as usize % TABLE_SIZE;
        let zi = z.rem_euclid(period) as usize % TABLE_SIZE;
        self.directions[self.perm[self.perm[self.perm[xi] + yi] + zi]]
    }

    /// 3D gradient noise at `position`, repeating every `period` lattice
    /// cells.
    ///
    /// Sums the eight surflets of the surrounding unit cube: each corner
    /// contributes its gradient dot the offset vector, attenuated by the
    /// quintic falloff on each axis.
    pub fn noise(&self, position: DVec3, period: i64) -> f64 {
        let period = period.max(1);
        let base = position.floor();
        let (x0, y0, z0) = (base.x as i64, base.y as i64, base.z as i64);

        let mut total = 0.0;
        for corner in 0..8i64 {
            let cx = x0 + (corner & 1);
            let cy = y0 + ((corner >> 1) & 1);
            let cz = z0 + ((corner >> 2) & 1);

            let offset = position - DVec3::new(cx as f64, cy as f64, cz as f64);
            let direction = self.corner_direction(cx, cy, cz, period);

            total += falloff(offset.x.abs())
                * falloff(offset.y.abs())
                * falloff(offset.z.abs())
                * offset.dot(direction);
        }
        total
    }

    /// Fractal Brownian motion: `octaves` noise layers, each at double the
    /// frequency and half the amplitude of the last, combined per `style`.
    pub fn fractal(&self, position: DVec3, period: i64, octaves: u32, style: NoiseStyle) -> f64 {
        let mut total = 0.0;
        for octave in 0..octaves {
            let amplitude = 0.5f64.powi(octave as i32);
            let lacunarity = (1i64 << octave) as f64;
            let layer = amplitude * self.noise(position * lacunarity, period << octave);

            total = match style {
                NoiseStyle::Fractal => total + layer,
                NoiseStyle::Turbulent => total + layer.abs(),
                NoiseStyle::Edge => total - layer.abs(),
                NoiseStyle::Blobs => layer,
                NoiseStyle::Lines => layer.abs(),
            };
        }
        total
    }

    /// Evaluate a `size * size` grid of fractal noise, indexed `y * size + x`
    /// and scaled by `scale`.
    ///
    /// The lattice period is `size * frequency` (rounded, min 1) so the
    /// field tiles exactly across the grid - border cells blend seamlessly
    /// after the level assembler raises them.
    pub fn landscape(
        &self,
        size: usize,
        frequency: f64,
        octaves: u32,
        style: NoiseStyle,
        scale: f64,
    ) -> Vec<f32> {
        let period = ((size as f64 * frequency).round() as i64).max(1);
        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let position = DVec3::new(x as f64 * frequency, y as f64 * frequency, 0.0);
                values.push((self.fractal(position, period, octaves, style) * scale) as f32);
            }
        }
        values
    }
}

/// Quintic surflet falloff on the absolute axis distance.
///
/// `1 - 6d^5 + 15d^4 - 10d^3`: equals 1 at the corner, 0 at distance 1,
/// with zero first and second derivatives at both ends.
fn falloff(d: f64) -> f64 {
    1.0 - 6.0 * d.powi(5) + 15.0 * d.powi(4) - 10.0 * d.powi(3)
}
