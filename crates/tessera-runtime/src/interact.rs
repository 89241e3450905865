use tessera_blocks::Block;
use tessera_edit::affected_chunks;
use tessera_geom::Vec3;
use tessera_world::ChunkCoord;

use crate::engine::StreamingEngine;
use crate::raycast::{Probe, RayHit, RayWalk, march};
use crate::render::MeshUploader;
use crate::worker::lock;

impl<U: MeshUploader> StreamingEngine<U> {
    /// Walks the ray against the live map. Samples in non-live chunks request generation
    /// of that chunk and are stepped through.
    fn walk(&mut self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayWalk> {
        let dims = self.dims();
        let step = self.config().ray_step;
        let mut unloaded: Vec<ChunkCoord> = Vec::new();
        let walk = march(origin, dir, step, max_dist, |wx, wy, wz| {
            match self.block_at(wx, wy, wz) {
                Some(b) if b.is_solid() => Probe::Solid(b),
                Some(_) => Probe::Open,
                None => {
                    let k = dims.chunk_of(wx, wy, wz);
                    if !unloaded.contains(&k) {
                        unloaded.push(k);
                    }
                    Probe::Unloaded
                }
            }
        });
        for k in unloaded {
            if self.request_chunk(k) {
                log::debug!(target: "stream", "ray requested ({},{},{})", k.cx, k.cy, k.cz);
            }
        }
        walk
    }

    /// First solid block along the ray within `max_dist`.
    pub fn find_solid(&mut self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        let w = self.walk(origin, dir, max_dist)?;
        let (x, y, z) = w.hit;
        Some(RayHit::new(self.dims(), x, y, z, w.block))
    }

    /// Empty cell sampled immediately before the first solid block along the ray.
    pub fn find_placement(&mut self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        let w = self.walk(origin, dir, max_dist)?;
        let (x, y, z) = w.before?;
        let block = self.block_at(x, y, z).unwrap_or(Block::Air);
        Some(RayHit::new(self.dims(), x, y, z, block))
    }

    /// Clears the first solid block along the ray. Returns the removed block's location.
    pub fn on_break(&mut self, origin: Vec3, dir: Vec3) -> Option<RayHit> {
        let hit = self.find_solid(origin, dir, self.config().ray_max_distance)?;
        self.write_block(hit, Block::Air);
        log::info!(
            "break {:?} at {:?} in ({},{},{})",
            hit.block,
            hit.world_pos(),
            hit.coord.cx,
            hit.coord.cy,
            hit.coord.cz
        );
        Some(hit)
    }

    /// Places the configured block in the empty cell in front of the first obstruction.
    /// No-op when that cell's chunk is not live or the cell is already solid.
    pub fn on_place(&mut self, origin: Vec3, dir: Vec3) -> Option<RayHit> {
        let target = self.find_placement(origin, dir, self.config().ray_max_distance)?;
        if !self.is_live(target.coord) || target.block.is_solid() {
            return None;
        }
        let block = self.config().place_block;
        self.write_block(target, block);
        log::info!("place {:?} at {:?}", block, target.world_pos());
        Some(target.with_block(block))
    }

    /// Writes one block into a live chunk, records it in the overlay, and remeshes the
    /// chunk plus any live face neighbor sharing the cell's boundary.
    fn write_block(&mut self, at: RayHit, block: Block) {
        let (wx, wy, wz) = at.world_pos();
        self.buffer_mut().set(wx, wy, wz, block);
        lock(self.overlay()).record_edit(at.coord, at.local, block);
        for k in affected_chunks(self.dims(), at.coord, at.local) {
            self.remesh(k);
        }
    }
}
