use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// Squared distance ignoring the vertical axis.
    #[inline]
    pub fn horizontal_distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    #[inline]
    pub fn vertical_distance(self, other: ChunkCoord) -> i32 {
        (self.cy - other.cy).abs()
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Chunk-local block position, each axis in `[0, size)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalPos {
    pub lx: i32,
    pub ly: i32,
    pub lz: i32,
}

impl LocalPos {
    #[inline]
    pub const fn new(lx: i32, ly: i32, lz: i32) -> Self {
        Self { lx, ly, lz }
    }
}

/// Block extents of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::cube(16)
    }
}

impl ChunkDims {
    #[inline]
    pub const fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self { sx, sy, sz }
    }

    #[inline]
    pub const fn cube(s: usize) -> Self {
        Self { sx: s, sy: s, sz: s }
    }

    #[inline]
    pub fn volume(self) -> usize {
        self.sx * self.sy * self.sz
    }

    #[inline]
    pub fn contains_local(self, lx: i32, ly: i32, lz: i32) -> bool {
        lx >= 0
            && ly >= 0
            && lz >= 0
            && (lx as usize) < self.sx
            && (ly as usize) < self.sy
            && (lz as usize) < self.sz
    }

    /// World block coordinate of the chunk's `(0,0,0)` corner.
    #[inline]
    pub fn origin(self, coord: ChunkCoord) -> (i32, i32, i32) {
        (
            coord.cx * self.sx as i32,
            coord.cy * self.sy as i32,
            coord.cz * self.sz as i32,
        )
    }

    /// Chunk containing a world block position (floor division).
    #[inline]
    pub fn chunk_of(self, wx: i32, wy: i32, wz: i32) -> ChunkCoord {
        ChunkCoord::new(
            wx.div_euclid(self.sx as i32),
            wy.div_euclid(self.sy as i32),
            wz.div_euclid(self.sz as i32),
        )
    }

    /// Splits a world block position into its chunk key and chunk-local position.
    #[inline]
    pub fn split(self, wx: i32, wy: i32, wz: i32) -> (ChunkCoord, LocalPos) {
        let (sx, sy, sz) = (self.sx as i32, self.sy as i32, self.sz as i32);
        (
            self.chunk_of(wx, wy, wz),
            LocalPos::new(wx.rem_euclid(sx), wy.rem_euclid(sy), wz.rem_euclid(sz)),
        )
    }

    #[inline]
    pub fn to_world(self, coord: ChunkCoord, local: LocalPos) -> (i32, i32, i32) {
        let (x0, y0, z0) = self.origin(coord);
        (x0 + local.lx, y0 + local.ly, z0 + local.lz)
    }
}
