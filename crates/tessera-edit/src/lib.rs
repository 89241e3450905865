//! Player edits layered over generated terrain.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use tessera_blocks::Block;
use tessera_chunk::{ChunkViewMut, VoxelBuffer};
use tessera_world::{ChunkCoord, ChunkDims, LocalPos};

/// One persisted edit: chunk key, chunk-local position, block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
    pub lx: i32,
    pub ly: i32,
    pub lz: i32,
    pub block: Block,
}

impl EditRecord {
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        ChunkCoord::new(self.cx, self.cy, self.cz)
    }

    #[inline]
    pub fn local(&self) -> LocalPos {
        LocalPos::new(self.lx, self.ly, self.lz)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOverlayStats {
    pub chunk_entries: usize,
    pub block_edits: usize,
}

/// Blocks that differ from generated terrain, grouped per chunk.
///
/// Air is never stored: recording Air drops the override so the cell falls back to
/// whatever terrain generation produces.
#[derive(Clone, Debug)]
pub struct EditOverlay {
    dims: ChunkDims,
    inner: HashMap<ChunkCoord, HashMap<LocalPos, Block>>,
}

impl EditOverlay {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            inner: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn stats(&self) -> EditOverlayStats {
        EditOverlayStats {
            chunk_entries: self.inner.len(),
            block_edits: self.inner.values().map(|m| m.len()).sum(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stats().block_edits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, coord: ChunkCoord, local: LocalPos) -> Option<Block> {
        self.inner.get(&coord).and_then(|m| m.get(&local).copied())
    }

    pub fn record_edit(&mut self, coord: ChunkCoord, local: LocalPos, block: Block) {
        debug_assert!(
            self.dims.contains_local(local.lx, local.ly, local.lz),
            "local position {local:?} outside chunk"
        );
        if block == Block::Air {
            if let Some(m) = self.inner.get_mut(&coord) {
                m.remove(&local);
                if m.is_empty() {
                    self.inner.remove(&coord);
                }
            }
        } else {
            self.inner.entry(coord).or_default().insert(local, block);
        }
    }

    /// World-coordinate form of [`EditOverlay::record_edit`].
    pub fn record_world(&mut self, wx: i32, wy: i32, wz: i32, block: Block) {
        let (coord, local) = self.dims.split(wx, wy, wz);
        self.record_edit(coord, local, block);
    }

    /// Writes this chunk's edits into `view`. Returns the number of cells written.
    pub fn apply_to(&self, view: &mut ChunkViewMut<'_>) -> usize {
        let Some(m) = self.inner.get(&view.coord()) else {
            return 0;
        };
        for (p, b) in m {
            view.set(p.lx, p.ly, p.lz, *b);
        }
        m.len()
    }

    /// Writes every edit whose chunk satisfies `is_live` into `buf`.
    /// Returns the chunks that received at least one write.
    pub fn apply_to_live(
        &self,
        buf: &mut VoxelBuffer,
        is_live: impl Fn(ChunkCoord) -> bool,
    ) -> Vec<ChunkCoord> {
        let mut touched = Vec::new();
        for &coord in self.inner.keys() {
            if !is_live(coord) {
                continue;
            }
            if self.apply_to(&mut buf.view_mut(coord)) > 0 {
                touched.push(coord);
            }
        }
        touched.sort();
        touched
    }

    /// Flat record list, ordered by chunk then local position.
    pub fn serialize(&self) -> Vec<EditRecord> {
        let mut out: Vec<EditRecord> = self
            .inner
            .iter()
            .flat_map(|(c, m)| {
                m.iter().map(move |(p, b)| EditRecord {
                    cx: c.cx,
                    cy: c.cy,
                    cz: c.cz,
                    lx: p.lx,
                    ly: p.ly,
                    lz: p.lz,
                    block: *b,
                })
            })
            .collect();
        out.sort_by_key(|r| (r.coord(), r.local()));
        out
    }

    /// Replaces the whole overlay with `records`. Air and out-of-chunk records are skipped.
    pub fn deserialize(&mut self, records: &[EditRecord]) {
        self.inner.clear();
        let mut skipped = 0usize;
        for r in records {
            if !self.dims.contains_local(r.lx, r.ly, r.lz) {
                skipped += 1;
                continue;
            }
            self.record_edit(r.coord(), r.local(), r.block);
        }
        if skipped > 0 {
            log::warn!("edit overlay: skipped {} records outside chunk bounds", skipped);
        }
    }
}

/// Chunk owning the edit plus each face neighbor sharing the edited cell's boundary.
pub fn affected_chunks(dims: ChunkDims, coord: ChunkCoord, local: LocalPos) -> Vec<ChunkCoord> {
    let (sx, sy, sz) = (dims.sx as i32, dims.sy as i32, dims.sz as i32);
    let mut out = vec![coord];
    let mut push = |dx: i32, dy: i32, dz: i32| {
        let n = coord.offset(dx, dy, dz);
        if !out.contains(&n) {
            out.push(n);
        }
    };
    if local.lx == 0 {
        push(-1, 0, 0);
    }
    if local.lx == sx - 1 {
        push(1, 0, 0);
    }
    if local.ly == 0 {
        push(0, -1, 0);
    }
    if local.ly == sy - 1 {
        push(0, 1, 0);
    }
    if local.lz == 0 {
        push(0, 0, -1);
    }
    if local.lz == sz - 1 {
        push(0, 0, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(cx: i32, cy: i32, cz: i32) -> ChunkCoord {
        ChunkCoord::new(cx, cy, cz)
    }

    fn p(lx: i32, ly: i32, lz: i32) -> LocalPos {
        LocalPos::new(lx, ly, lz)
    }

    #[test]
    fn air_removes_entry() {
        let mut o = EditOverlay::new(ChunkDims::cube(4));
        o.record_edit(c(0, 0, 0), p(1, 2, 3), Block::Stone);
        assert_eq!(o.get(c(0, 0, 0), p(1, 2, 3)), Some(Block::Stone));
        o.record_edit(c(0, 0, 0), p(1, 2, 3), Block::Air);
        assert_eq!(o.get(c(0, 0, 0), p(1, 2, 3)), None);
        assert!(o.is_empty());
        // Air on an absent key is a no-op
        o.record_edit(c(5, 5, 5), p(0, 0, 0), Block::Air);
        assert!(o.is_empty());
    }

    #[test]
    fn record_world_splits_negative_coords() {
        let mut o = EditOverlay::new(ChunkDims::cube(4));
        o.record_world(-1, -5, 4, Block::Dirt);
        assert_eq!(o.get(c(-1, -2, 1), p(3, 3, 0)), Some(Block::Dirt));
    }

    #[test]
    fn stats_counts_chunks_and_edits() {
        let mut o = EditOverlay::new(ChunkDims::cube(4));
        o.record_edit(c(0, 0, 0), p(0, 0, 0), Block::Stone);
        o.record_edit(c(0, 0, 0), p(1, 0, 0), Block::Stone);
        o.record_edit(c(1, 0, 0), p(0, 0, 0), Block::Sand);
        assert_eq!(
            o.stats(),
            EditOverlayStats {
                chunk_entries: 2,
                block_edits: 3
            }
        );
        assert_eq!(o.len(), 3);
    }

    #[test]
    fn affected_chunks_only_on_boundaries() {
        let dims = ChunkDims::cube(4);
        assert_eq!(affected_chunks(dims, c(0, 0, 0), p(1, 1, 1)), vec![c(0, 0, 0)]);
        let mut a = affected_chunks(dims, c(0, 0, 0), p(0, 3, 1));
        a.sort();
        assert_eq!(a, vec![c(-1, 0, 0), c(0, 0, 0), c(0, 1, 0)]);
        let corner = affected_chunks(dims, c(2, 2, 2), p(3, 0, 3));
        assert_eq!(corner.len(), 4);
    }

    #[test]
    fn size_one_axis_touches_both_neighbors() {
        let dims = ChunkDims::new(4, 1, 4);
        let mut a = affected_chunks(dims, c(0, 0, 0), p(2, 0, 2));
        a.sort();
        assert_eq!(a, vec![c(0, -1, 0), c(0, 0, 0), c(0, 1, 0)]);
    }
}
