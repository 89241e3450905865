use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};
use tessera_blocks::Block;
use tessera_chunk::{ChunkOccupancy, VoxelBuffer, generate_chunk};
use tessera_edit::{EditOverlay, EditRecord};
use tessera_geom::Vec3;
use tessera_mesh_cpu::{MeshBuild, build_chunk_mesh};
use tessera_world::{ChunkCoord, ChunkDims, TerrainGenerator, WorldConfig};

use crate::config::{ConfigError, StreamConfig};
use crate::render::{MeshUploader, RenderResource};
use crate::worker::{self, ReadyChunk, Shared, WorkerCtx, lock};

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Spawn(std::io::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "invalid stream config: {e}"),
            EngineError::Spawn(e) => write!(f, "failed to spawn generation worker: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            EngineError::Spawn(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Spawn(e)
    }
}

/// Near keys (3D squared distance ≤ `near²`) first, then far keys, each by ascending
/// distance to `c0`.
pub(crate) fn order_near_then_far(c0: ChunkCoord, near: i32, keys: &mut [ChunkCoord]) {
    let n_sq = i64::from(near) * i64::from(near);
    keys.sort_by_key(|k| {
        let d = c0.distance_sq(*k);
        (d > n_sq, d, *k)
    });
}

/// Counts from one `update` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub enqueued: usize,
    /// Queued keys dropped because they left the desired set.
    pub requeue_dropped: usize,
    /// Ready results dropped because they were outside the keep set.
    pub ready_dropped: usize,
    pub uploaded: usize,
    pub disposed: usize,
    /// Disposals skipped because the key re-entered the keep set.
    pub disposal_cancelled: usize,
}

impl TickStats {
    fn is_quiet(&self) -> bool {
        *self == TickStats::default()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub live: usize,
    pub pending: usize,
    pub generation_queue: usize,
    pub in_flight: bool,
    pub ready: usize,
    pub upload_backlog: usize,
    pub disposal_backlog: usize,
    pub generated_total: u64,
    pub edits: usize,
}

pub struct LiveChunk<R> {
    pub resource: R,
    pub occupancy: ChunkOccupancy,
    pub quads: usize,
}

/// Streams chunks around an observer: plans generation, hands work to one background
/// worker, and promotes finished chunks into the live map at a throttled rate.
///
/// All methods run on the thread that owns the rendering context.
pub struct StreamingEngine<U: MeshUploader> {
    cfg: StreamConfig,
    dims: ChunkDims,
    terrain: Arc<TerrainGenerator>,
    overlay: Arc<Mutex<EditOverlay>>,
    buffer: VoxelBuffer,
    live: HashMap<ChunkCoord, LiveChunk<U::Resource>>,
    /// Keys queued, in flight, ready, or awaiting upload.
    pending: HashSet<ChunkCoord>,
    /// Live keys sitting in the disposal queue.
    disposing: HashSet<ChunkCoord>,
    upload_tx: Sender<ReadyChunk>,
    upload_rx: Receiver<ReadyChunk>,
    dispose_tx: Sender<ChunkCoord>,
    dispose_rx: Receiver<ChunkCoord>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    uploader: U,
    center: Option<ChunkCoord>,
    /// Desired keys around `center`, nearest first.
    desired: Vec<ChunkCoord>,
}

impl<U: MeshUploader> StreamingEngine<U> {
    pub fn new(world: &WorldConfig, cfg: StreamConfig, uploader: U) -> Result<Self, EngineError> {
        let dims = world.dims();
        cfg.validate(dims)?;
        let terrain = Arc::new(TerrainGenerator::new(world.gen_mode()));
        let overlay = Arc::new(Mutex::new(EditOverlay::new(dims)));
        let shared = Arc::new(Shared::new());
        let worker = worker::spawn(WorkerCtx {
            shared: shared.clone(),
            terrain: terrain.clone(),
            overlay: overlay.clone(),
            dims,
            idle: Duration::from_millis(cfg.worker_idle_ms.max(1)),
        })?;
        let (upload_tx, upload_rx) = unbounded();
        let (dispose_tx, dispose_rx) = unbounded();
        let buffer = cfg.buffer_for(dims);
        log::info!(
            target: "stream",
            "engine: chunk={}x{}x{} R={} V={} N={} buffer_period={:?}",
            dims.sx,
            dims.sy,
            dims.sz,
            cfg.render_distance,
            cfg.vertical_distance,
            cfg.near_radius,
            buffer.period_chunks()
        );
        Ok(Self {
            cfg,
            dims,
            terrain,
            overlay,
            buffer,
            live: HashMap::new(),
            pending: HashSet::new(),
            disposing: HashSet::new(),
            upload_tx,
            upload_rx,
            dispose_tx,
            dispose_rx,
            shared,
            worker: Some(worker),
            uploader,
            center: None,
            desired: Vec::new(),
        })
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    #[inline]
    pub fn terrain(&self) -> &TerrainGenerator {
        &self.terrain
    }

    #[inline]
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    #[inline]
    pub fn is_live(&self, coord: ChunkCoord) -> bool {
        self.live.contains_key(&coord)
    }

    pub fn live_keys(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.live.keys().copied()
    }

    pub fn live_chunk(&self, coord: ChunkCoord) -> Option<&LiveChunk<U::Resource>> {
        self.live.get(&coord)
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Block at a world position, if its chunk is live.
    pub fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        let coord = self.dims.chunk_of(wx, wy, wz);
        self.is_live(coord).then(|| self.buffer.get(wx, wy, wz))
    }

    pub fn chunk_of_pos(&self, pos: Vec3) -> ChunkCoord {
        let (wx, wy, wz) = pos.floor_cell();
        self.dims.chunk_of(wx, wy, wz)
    }

    fn in_desired(&self, c0: ChunkCoord, k: ChunkCoord) -> bool {
        let r = i64::from(self.cfg.render_distance);
        c0.horizontal_distance_sq(k) <= r * r && c0.vertical_distance(k) <= self.cfg.vertical_distance
    }

    fn in_keep(&self, c0: ChunkCoord, k: ChunkCoord) -> bool {
        let r = i64::from(self.cfg.keep_distance());
        c0.horizontal_distance_sq(k) <= r * r && c0.vertical_distance(k) <= self.cfg.keep_vertical()
    }

    fn desired_around(&self, c0: ChunkCoord) -> Vec<ChunkCoord> {
        let r = self.cfg.render_distance;
        let v = self.cfg.vertical_distance;
        let mut out = Vec::new();
        for dy in -v..=v {
            for dz in -r..=r {
                for dx in -r..=r {
                    let k = c0.offset(dx, dy, dz);
                    if self.in_desired(c0, k) {
                        out.push(k);
                    }
                }
            }
        }
        out.sort_by_key(|k| (c0.distance_sq(*k), *k));
        out
    }

    /// Steps 1-3 of a tick: recompute the desired set around `pos`, enqueue missing keys,
    /// and queue live keys outside the keep set for disposal.
    pub fn plan(&mut self, pos: Vec3) -> TickStats {
        let mut stats = TickStats::default();
        let c0 = self.chunk_of_pos(pos);
        let moved = self.center != Some(c0);
        if moved {
            self.desired = self.desired_around(c0);
            self.center = Some(c0);
        }

        let mut missing: Vec<ChunkCoord> = self
            .desired
            .iter()
            .copied()
            .filter(|k| !self.live.contains_key(k) && !self.pending.contains(k))
            .collect();

        if moved || !missing.is_empty() {
            let mut q = self.shared.lock();
            if moved {
                let mut kept = Vec::with_capacity(q.generation.len());
                for k in q.generation.drain(..) {
                    if self.in_desired(c0, k) {
                        kept.push(k);
                    } else {
                        self.pending.remove(&k);
                        stats.requeue_dropped += 1;
                    }
                }
                stats.enqueued = missing.len();
                missing.extend(kept);
            } else {
                stats.enqueued = missing.len();
            }
            order_near_then_far(c0, self.cfg.near_radius, &mut missing);
            for k in missing {
                self.pending.insert(k);
                q.generation.push_back(k);
            }
            drop(q);
            self.shared.notify();
        }

        let evict: Vec<ChunkCoord> = self
            .live
            .keys()
            .copied()
            .filter(|k| !self.in_keep(c0, *k) && !self.disposing.contains(k))
            .collect();
        for k in evict {
            self.disposing.insert(k);
            let _ = self.dispose_tx.send(k);
        }
        stats
    }

    /// Enqueues one key for generation unless it is live or already pending.
    pub fn request_chunk(&mut self, coord: ChunkCoord) -> bool {
        if self.live.contains_key(&coord) || !self.pending.insert(coord) {
            return false;
        }
        self.shared.lock().generation.push_back(coord);
        self.shared.notify();
        true
    }

    /// Step 4: move worker results onto the upload queue, dropping duplicates of live keys
    /// and results that are no longer in the keep set.
    pub fn collect_ready(&mut self) -> TickStats {
        let mut stats = TickStats::default();
        let (ready, skipped) = {
            let mut q = self.shared.lock();
            (
                q.ready.drain(..).collect::<Vec<_>>(),
                std::mem::take(&mut q.skipped),
            )
        };
        for k in skipped {
            self.pending.remove(&k);
        }
        for item in ready {
            let k = item.coord;
            if self.live.contains_key(&k) {
                log::debug!(target: "stream", "ready chunk ({},{},{}) already live", k.cx, k.cy, k.cz);
                continue;
            }
            if let Some(c0) = self.center {
                if !self.in_keep(c0, k) {
                    self.pending.remove(&k);
                    stats.ready_dropped += 1;
                    continue;
                }
            }
            let _ = self.upload_tx.send(item);
        }
        stats
    }

    /// Step 5: commit at most `uploads_per_tick` chunks into the buffer and live map.
    /// Items that left the keep set since they were queued are discarded without counting.
    pub fn flush_uploads(&mut self) -> usize {
        let mut n = 0;
        while n < self.cfg.uploads_per_tick {
            let Ok(item) = self.upload_rx.try_recv() else {
                break;
            };
            if self.center.is_some_and(|c0| !self.in_keep(c0, item.coord)) {
                // observer moved on while this sat in the upload queue
                self.pending.remove(&item.coord);
                continue;
            }
            self.commit(item);
            n += 1;
        }
        n
    }

    fn commit(&mut self, item: ReadyChunk) {
        let k = item.coord;
        let aliased: Vec<ChunkCoord> = self
            .live
            .keys()
            .copied()
            .filter(|l| self.buffer.aliases(*l, k))
            .collect();
        for a in aliased {
            log::debug!(
                target: "stream",
                "evicting ({},{},{}) which shares storage with ({},{},{})",
                a.cx, a.cy, a.cz, k.cx, k.cy, k.cz
            );
            self.dispose_now(a);
        }

        self.buffer.copy_chunk_from(k, &item.blocks);
        let mut mesh = item.mesh;
        let mut occupancy = item.occupancy;
        if item.overlay_rev != self.shared.overlay_rev.load(Ordering::Acquire) {
            // Overlay replaced while this chunk was in flight.
            let mut fresh = VoxelBuffer::scratch(self.dims);
            let mut view = fresh.view_mut(k);
            generate_chunk(&self.terrain, &mut view);
            lock(&self.overlay).apply_to(&mut view);
            self.buffer.copy_chunk_from(k, &fresh);
            let v = self.buffer.view(k);
            occupancy = if v.has_non_air() {
                ChunkOccupancy::Populated
            } else {
                ChunkOccupancy::Empty
            };
            mesh = build_chunk_mesh(&v);
        }

        let resource = self.uploader.upload(k, &mesh);
        self.pending.remove(&k);
        self.live.insert(
            k,
            LiveChunk {
                resource,
                occupancy,
                quads: mesh.quad_count(),
            },
        );
        self.shared.lock().live.insert(k);
        log::trace!(target: "stream", "uploaded ({},{},{}) quads={}", k.cx, k.cy, k.cz, mesh.quad_count());
    }

    /// Step 6: process at most `disposals_per_tick` disposal requests.
    pub fn flush_disposals(&mut self) -> TickStats {
        let mut stats = TickStats::default();
        let mut n = 0;
        while n < self.cfg.disposals_per_tick {
            let Ok(k) = self.dispose_rx.try_recv() else {
                break;
            };
            n += 1;
            if !self.disposing.remove(&k) {
                continue;
            }
            if self.center.is_some_and(|c0| self.in_keep(c0, k)) {
                stats.disposal_cancelled += 1;
                continue;
            }
            if self.dispose_now(k) {
                stats.disposed += 1;
            }
        }
        stats
    }

    fn dispose_now(&mut self, k: ChunkCoord) -> bool {
        self.disposing.remove(&k);
        let Some(chunk) = self.live.remove(&k) else {
            return false;
        };
        chunk.resource.dispose();
        self.shared.lock().live.remove(&k);
        true
    }

    /// One frame of streaming for an observer at `pos`.
    pub fn update(&mut self, pos: Vec3) -> TickStats {
        let mut stats = self.plan(pos);
        let ready = self.collect_ready();
        stats.ready_dropped = ready.ready_dropped;
        stats.uploaded = self.flush_uploads();
        let disposals = self.flush_disposals();
        stats.disposed = disposals.disposed;
        stats.disposal_cancelled = disposals.disposal_cancelled;
        if !stats.is_quiet() {
            log::debug!(target: "stream", "tick {:?}", stats);
        }
        stats
    }

    /// True when every key with `dx²+dz² ≤ r²` and `|dy| ≤ min(r, V)` around `pos` is live.
    pub fn is_area_ready(&self, pos: Vec3, r: i32) -> bool {
        let c0 = self.chunk_of_pos(pos);
        let r = r.max(0);
        let v = r.min(self.cfg.vertical_distance);
        let r_sq = i64::from(r) * i64::from(r);
        for dy in -v..=v {
            for dz in -r..=r {
                for dx in -r..=r {
                    if i64::from(dx * dx + dz * dz) > r_sq {
                        continue;
                    }
                    if !self.live.contains_key(&c0.offset(dx, dy, dz)) {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub fn stats(&self) -> EngineStats {
        let (generation_queue, in_flight, ready) = {
            let q = self.shared.lock();
            (q.generation.len(), q.in_flight.is_some(), q.ready.len())
        };
        EngineStats {
            live: self.live.len(),
            pending: self.pending.len(),
            generation_queue,
            in_flight,
            ready,
            upload_backlog: self.upload_rx.len(),
            disposal_backlog: self.dispose_rx.len(),
            generated_total: self.shared.generated.load(Ordering::Relaxed),
            edits: lock(&self.overlay).len(),
        }
    }

    /// Draws every live chunk. Returns the number of draw calls issued.
    pub fn render_all(&self) -> usize {
        for chunk in self.live.values() {
            chunk.resource.render();
        }
        self.live.len()
    }

    /// Rebuilds the mesh of a live chunk from the buffer and swaps its render resource.
    pub(crate) fn remesh(&mut self, k: ChunkCoord) -> bool {
        if !self.live.contains_key(&k) {
            return false;
        }
        let view = self.buffer.view(k);
        let occupancy = if view.has_non_air() {
            ChunkOccupancy::Populated
        } else {
            ChunkOccupancy::Empty
        };
        let mesh = if occupancy.has_blocks() {
            build_chunk_mesh(&view)
        } else {
            MeshBuild::default()
        };
        let resource = self.uploader.upload(k, &mesh);
        if let Some(chunk) = self.live.get_mut(&k) {
            let old = std::mem::replace(&mut chunk.resource, resource);
            chunk.occupancy = occupancy;
            chunk.quads = mesh.quad_count();
            old.dispose();
        }
        true
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut VoxelBuffer {
        &mut self.buffer
    }

    pub(crate) fn overlay(&self) -> &Mutex<EditOverlay> {
        &self.overlay
    }

    /// Current overlay as a flat record list.
    pub fn edits(&self) -> Vec<EditRecord> {
        lock(&self.overlay).serialize()
    }

    /// Replaces the overlay with `records`. Live chunks addressed by the old or new overlay
    /// are regenerated in place, the new edits written into them, and their meshes rebuilt.
    pub fn load_edits(&mut self, records: &[EditRecord]) -> usize {
        let touched: Vec<ChunkCoord> = {
            let mut overlay = lock(&self.overlay);
            let mut keys: HashSet<ChunkCoord> = overlay
                .serialize()
                .iter()
                .map(EditRecord::coord)
                .collect();
            overlay.deserialize(records);
            self.shared.overlay_rev.fetch_add(1, Ordering::AcqRel);
            keys.extend(records.iter().map(EditRecord::coord));
            keys.into_iter().filter(|k| self.live.contains_key(k)).collect()
        };
        for &k in &touched {
            generate_chunk(&self.terrain, &mut self.buffer.view_mut(k));
        }
        {
            let overlay = lock(&self.overlay);
            let live = &self.live;
            overlay.apply_to_live(&mut self.buffer, |k| live.contains_key(&k));
        }
        for &k in &touched {
            self.remesh(k);
        }
        log::info!(
            target: "stream",
            "loaded {} edits, refreshed {} live chunks",
            records.len(),
            touched.len()
        );
        touched.len()
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.shared.request_stop();
            if handle.join().is_err() {
                log::warn!(target: "stream", "generation worker panicked");
            }
        }
        let n = self.live.len();
        for (_, chunk) in self.live.drain() {
            chunk.resource.dispose();
        }
        self.disposing.clear();
        self.pending.clear();
        if n > 0 {
            log::info!(target: "stream", "disposed {} live chunks on shutdown", n);
        }
    }

    /// Stops the worker (finishing any chunk it is generating), joins it, and disposes
    /// every live render resource.
    pub fn shutdown(mut self) {
        self.teardown();
    }
}

impl<U: MeshUploader> Drop for StreamingEngine<U> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_keys_sort_ahead_of_far_keys() {
        let c0 = ChunkCoord::new(0, 0, 0);
        let mut keys = vec![
            ChunkCoord::new(3, 0, 0),
            ChunkCoord::new(0, 0, 1),
            ChunkCoord::new(-2, 0, 0),
            ChunkCoord::new(0, 0, 0),
            ChunkCoord::new(1, 1, 0),
        ];
        order_near_then_far(c0, 1, &mut keys);
        assert_eq!(
            keys,
            vec![
                ChunkCoord::new(0, 0, 0),
                ChunkCoord::new(0, 0, 1),
                ChunkCoord::new(1, 1, 0),
                ChunkCoord::new(-2, 0, 0),
                ChunkCoord::new(3, 0, 0),
            ]
        );
    }

    #[test]
    fn tick_stats_quiet_only_when_all_zero() {
        assert!(TickStats::default().is_quiet());
        let s = TickStats {
            uploaded: 1,
            ..TickStats::default()
        };
        assert!(!s.is_quiet());
    }
}
