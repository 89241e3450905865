use tessera_blocks::Block;
use tessera_world::{ChunkCoord, ChunkDims};

use crate::buffer::VoxelBuffer;

/// Read access to one chunk of a [`VoxelBuffer`] in chunk-local coordinates.
#[derive(Clone, Copy)]
pub struct ChunkView<'a> {
    buf: &'a VoxelBuffer,
    coord: ChunkCoord,
    origin: (i32, i32, i32),
}

impl<'a> ChunkView<'a> {
    pub(crate) fn new(buf: &'a VoxelBuffer, coord: ChunkCoord) -> Self {
        Self {
            buf,
            coord,
            origin: buf.dims().origin(coord),
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.buf.dims()
    }

    #[inline]
    pub fn get(&self, lx: i32, ly: i32, lz: i32) -> Block {
        let (x0, y0, z0) = self.origin;
        self.buf.get(x0 + lx, y0 + ly, z0 + lz)
    }

    /// Solid test that treats anything outside `[0,size)` as open.
    #[inline]
    pub fn is_solid(&self, lx: i32, ly: i32, lz: i32) -> bool {
        if !self.dims().contains_local(lx, ly, lz) {
            return false;
        }
        self.get(lx, ly, lz).is_solid()
    }

    pub fn has_non_air(&self) -> bool {
        let d = self.dims();
        (0..d.sz as i32).any(|z| {
            (0..d.sx as i32).any(|x| (0..d.sy as i32).any(|y| self.get(x, y, z).is_solid()))
        })
    }
}

/// Write access to one chunk of a [`VoxelBuffer`].
pub struct ChunkViewMut<'a> {
    buf: &'a mut VoxelBuffer,
    coord: ChunkCoord,
    origin: (i32, i32, i32),
}

impl<'a> ChunkViewMut<'a> {
    pub(crate) fn new(buf: &'a mut VoxelBuffer, coord: ChunkCoord) -> Self {
        let origin = buf.dims().origin(coord);
        Self { buf, coord, origin }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.buf.dims()
    }

    #[inline]
    pub fn get(&self, lx: i32, ly: i32, lz: i32) -> Block {
        let (x0, y0, z0) = self.origin;
        self.buf.get(x0 + lx, y0 + ly, z0 + lz)
    }

    #[inline]
    pub fn set(&mut self, lx: i32, ly: i32, lz: i32, block: Block) {
        let (x0, y0, z0) = self.origin;
        self.buf.set(x0 + lx, y0 + ly, z0 + lz, block);
    }

    pub fn fill(&mut self, block: Block) {
        let d = self.dims();
        for z in 0..d.sz as i32 {
            for x in 0..d.sx as i32 {
                for y in 0..d.sy as i32 {
                    self.set(x, y, z, block);
                }
            }
        }
    }

    #[inline]
    pub fn as_view(&self) -> ChunkView<'_> {
        ChunkView::new(self.buf, self.coord)
    }
}
