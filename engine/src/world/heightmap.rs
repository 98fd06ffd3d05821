//! Heightmap Module
//!
//! The 256x256 scalar field every level starts from. Synthesized from the
//! level's noise field, or decoded from an 8-bit grayscale image when a
//! level ships a hand-drawn map.

use crate::noise::{NoiseField, NoiseStyle};

/// Cells per heightmap axis.
pub const HEIGHTMAP_SIZE: usize = 256;

/// How much the rim of the world is lifted to pen the car in.
pub const BORDER_LIFT: f32 = 40.0;

/// Height the lifted rim clamps to (unless the terrain is already higher).
pub const BORDER_RIM: f32 = 50.0;

/// Error decoding an image-sourced heightmap.
#[derive(Debug)]
pub enum HeightmapError {
    Decode(image::ImageError),
    /// The decoded image was not square
    NotSquare { width: u32, height: u32 },
}

impl std::fmt::Display for HeightmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeightmapError::Decode(e) => write!(f, "heightmap decode failed: {}", e),
            HeightmapError::NotSquare { width, height } => {
                write!(f, "heightmap image must be square, got {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for HeightmapError {}

/// A square scalar field indexed `y * size + x`.
#[derive(Clone, Debug)]
pub struct Heightmap {
    size: usize,
    values: Vec<f32>,
}

impl Heightmap {
    /// Synthesize from fractal noise. Deterministic for a given field.
    pub fn from_noise(
        field: &NoiseField,
        size: usize,
        frequency: f64,
        octaves: u32,
        style: NoiseStyle,
        scale: f64,
    ) -> Self {
        Self {
            size,
            values: field.landscape(size, frequency, octaves, style, scale),
        }
    }

    /// Decode from an 8-bit grayscale (or converted-to-grayscale) image.
    /// Luma 0..255 maps linearly onto `0..scale`.
    pub fn from_luma_image(bytes: &[u8], scale: f32) -> Result<Self, HeightmapError> {
        let decoded = image::load_from_memory(bytes).map_err(HeightmapError::Decode)?;
        let luma = decoded.to_luma8();
        let (width, height) = luma.dimensions();
        if width != height {
            return Err(HeightmapError::NotSquare { width, height });
        }
        Ok(Self {
            size: width as usize,
            values: luma.pixels().map(|p| p.0[0] as f32 / 255.0 * scale).collect(),
        })
    }

    pub fn from_values(size: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), size * size);
        Self { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.size + x] = value;
    }

    /// Bilinear sample at fractional cell coordinates, clamped to the edge.
    pub fn sample_bilinear(&self, fx: f32, fy: f32) -> f32 {
        let max = (self.size - 1) as f32;
        let fx = fx.clamp(0.0, max);
        let fy = fy.clamp(0.0, max);
        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.get(x0, y0) * (1.0 - tx) + self.get(x1, y0) * tx;
        let bottom = self.get(x0, y1) * (1.0 - tx) + self.get(x1, y1) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Lift the outer `margin` cells into a bowl rim so the car cannot
    /// drive off the edge of the world.
    ///
    /// The lift fades linearly from full strength at the edge to nothing at
    /// `margin` cells in. Every outermost cell ends at least
    /// `min(original + BORDER_LIFT, BORDER_RIM)`.
    pub fn raise_border(&mut self, margin: usize) {
        if margin == 0 {
            return;
        }
        let size = self.size;
        for y in 0..size {
            for x in 0..size {
                let edge_distance = x.min(y).min(size - 1 - x).min(size - 1 - y);
                if edge_distance >= margin {
                    continue;
                }
                let strength = 1.0 - edge_distance as f32 / margin as f32;
                let value = self.get(x, y);
                let lifted = (value + BORDER_LIFT * strength).min(BORDER_RIM.max(value));
                self.set(x, y, lifted);
            }
        }
    }

    /// Clamp every cell to at least `min_height`, so lakes always keep a
    /// bed under the water plane.
    pub fn clamp_lake_bed(&mut self, min_height: f32) {
        for value in &mut self.values {
            *value = value.max(min_height);
        }
    }
}
