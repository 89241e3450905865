use tessera_blocks::Block;
use tessera_world::{ChunkCoord, ChunkDims};

use crate::view::{ChunkView, ChunkViewMut};

/// Fixed-capacity block store addressed by world coordinates modulo its extents.
///
/// Two positions congruent modulo `(size_x, size_y, size_z)` share a cell; callers keep
/// the resident chunk set within one period per axis.
#[derive(Clone, Debug)]
pub struct VoxelBuffer {
    dims: ChunkDims,
    size_x: usize,
    size_y: usize,
    size_z: usize,
    blocks: Vec<Block>,
}

impl VoxelBuffer {
    /// Buffer spanning `span` chunks per axis.
    pub fn new(dims: ChunkDims, span: [usize; 3]) -> Self {
        let size_x = dims.sx * span[0].max(1);
        let size_y = dims.sy * span[1].max(1);
        let size_z = dims.sz * span[2].max(1);
        Self {
            dims,
            size_x,
            size_y,
            size_z,
            blocks: vec![Block::Air; size_x * size_y * size_z],
        }
    }

    /// Buffer covering `(2·h+1)` chunks horizontally and `(2·v+1)` vertically.
    pub fn for_view_distance(dims: ChunkDims, horizontal: usize, vertical: usize) -> Self {
        Self::new(dims, [2 * horizontal + 1, 2 * vertical + 1, 2 * horizontal + 1])
    }

    /// One-chunk buffer; any chunk key maps onto the whole of it.
    pub fn scratch(dims: ChunkDims) -> Self {
        Self::new(dims, [1, 1, 1])
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    /// Block extents `(size_x, size_y, size_z)`.
    #[inline]
    pub fn extents(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Period of the addressing scheme measured in chunks.
    #[inline]
    pub fn period_chunks(&self) -> (i32, i32, i32) {
        (
            (self.size_x / self.dims.sx) as i32,
            (self.size_y / self.dims.sy) as i32,
            (self.size_z / self.dims.sz) as i32,
        )
    }

    #[inline]
    pub fn index(&self, wx: i32, wy: i32, wz: i32) -> usize {
        let x = wx.rem_euclid(self.size_x as i32) as usize;
        let y = wy.rem_euclid(self.size_y as i32) as usize;
        let z = wz.rem_euclid(self.size_z as i32) as usize;
        z * self.size_x * self.size_y + x * self.size_y + y
    }

    #[inline]
    pub fn get(&self, wx: i32, wy: i32, wz: i32) -> Block {
        self.blocks[self.index(wx, wy, wz)]
    }

    #[inline]
    pub fn set(&mut self, wx: i32, wy: i32, wz: i32, block: Block) {
        let i = self.index(wx, wy, wz);
        self.blocks[i] = block;
    }

    /// True when two distinct chunk keys share storage.
    pub fn aliases(&self, a: ChunkCoord, b: ChunkCoord) -> bool {
        if a == b {
            return false;
        }
        let (px, py, pz) = self.period_chunks();
        (a.cx - b.cx).rem_euclid(px) == 0
            && (a.cy - b.cy).rem_euclid(py) == 0
            && (a.cz - b.cz).rem_euclid(pz) == 0
    }

    #[inline]
    pub fn view(&self, coord: ChunkCoord) -> ChunkView<'_> {
        ChunkView::new(self, coord)
    }

    #[inline]
    pub fn view_mut(&mut self, coord: ChunkCoord) -> ChunkViewMut<'_> {
        ChunkViewMut::new(self, coord)
    }

    /// Copies chunk `coord` from `src` (same chunk dims) into this buffer.
    pub fn copy_chunk_from(&mut self, coord: ChunkCoord, src: &VoxelBuffer) {
        debug_assert_eq!(self.dims, src.dims, "chunk dims mismatch");
        let (x0, y0, z0) = self.dims.origin(coord);
        for z in z0..z0 + self.dims.sz as i32 {
            for x in x0..x0 + self.dims.sx as i32 {
                for y in y0..y0 + self.dims.sy as i32 {
                    self.set(x, y, z, src.get(x, y, z));
                }
            }
        }
    }
}
