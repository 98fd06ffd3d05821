//! World Module
//!
//! Level-scale concerns: the heightmap, the scenery scatter pass, the
//! molded prop shapes, and the assembler that turns a seed into a playable
//! level.

pub mod flora;
pub mod heightmap;
pub mod level;
pub mod scatter;

pub use heightmap::{HEIGHTMAP_SIZE, Heightmap, HeightmapError};
pub use level::{LevelData, LevelParams, build_level};
pub use scatter::{ScenerySet, scatter_scenery};
