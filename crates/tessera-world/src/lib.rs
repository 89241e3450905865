//! Chunk addressing, world configuration, and terrain sampling.
#![forbid(unsafe_code)]

mod chunk_coord;
pub mod terrain;
pub mod worldgen;

pub use chunk_coord::{ChunkCoord, ChunkDims, LocalPos};
pub use terrain::TerrainGenerator;
pub use worldgen::{TerrainParams, WorldConfig, WorldGenMode};
