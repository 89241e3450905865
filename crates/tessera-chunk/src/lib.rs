//! Ring-addressed voxel storage, per-chunk views, and chunk generation.
#![forbid(unsafe_code)]

mod buffer;
mod view;

pub use buffer::VoxelBuffer;
pub use view::{ChunkView, ChunkViewMut};

use tessera_blocks::Block;
use tessera_world::{ChunkCoord, TerrainGenerator};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkOccupancy {
    Empty,
    Populated,
}

impl ChunkOccupancy {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, ChunkOccupancy::Empty)
    }

    #[inline]
    pub fn has_blocks(self) -> bool {
        matches!(self, ChunkOccupancy::Populated)
    }
}

/// Fills every cell of `coord` in `view` from the terrain sampler, one column at a time.
pub fn generate_chunk(terrain: &TerrainGenerator, view: &mut ChunkViewMut<'_>) -> ChunkOccupancy {
    let dims = view.dims();
    let coord: ChunkCoord = view.coord();
    let (x0, y0, z0) = dims.origin(coord);
    let mut has_blocks = false;
    for lz in 0..dims.sz as i32 {
        for lx in 0..dims.sx as i32 {
            let surface = terrain.surface_height(x0 + lx, z0 + lz);
            for ly in 0..dims.sy as i32 {
                let block = terrain.block_in_column(y0 + ly, surface);
                if block != Block::Air {
                    has_blocks = true;
                }
                view.set(lx, ly, lz, block);
            }
        }
    }
    if has_blocks {
        ChunkOccupancy::Populated
    } else {
        ChunkOccupancy::Empty
    }
}
