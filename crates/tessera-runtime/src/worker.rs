use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use hashbrown::HashSet;
use tessera_chunk::{ChunkOccupancy, VoxelBuffer, generate_chunk};
use tessera_edit::EditOverlay;
use tessera_mesh_cpu::{MeshBuild, build_chunk_mesh};
use tessera_world::{ChunkCoord, ChunkDims, TerrainGenerator};

/// Generated chunk handed from the worker to the main thread.
pub struct ReadyChunk {
    pub coord: ChunkCoord,
    /// One-chunk scratch buffer holding the generated blocks with edits applied.
    pub blocks: VoxelBuffer,
    pub mesh: MeshBuild,
    pub occupancy: ChunkOccupancy,
    /// Overlay revision the edits were taken from.
    pub overlay_rev: u64,
    pub t_gen_ms: u32,
    pub t_mesh_ms: u32,
}

/// Generation and ready queues share one lock.
#[derive(Default)]
pub(crate) struct Queues {
    pub generation: VecDeque<ChunkCoord>,
    pub ready: VecDeque<ReadyChunk>,
    /// Mirror of the live map's keys for the worker's skip check.
    pub live: HashSet<ChunkCoord>,
    /// Keys the worker popped but skipped because they were already live.
    pub skipped: Vec<ChunkCoord>,
    pub in_flight: Option<ChunkCoord>,
}

pub(crate) struct Shared {
    queues: Mutex<Queues>,
    wake: Condvar,
    stop: AtomicBool,
    pub overlay_rev: AtomicU64,
    pub generated: AtomicU64,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            wake: Condvar::new(),
            stop: AtomicBool::new(false),
            overlay_rev: AtomicU64::new(0),
            generated: AtomicU64::new(0),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Queues> {
        lock(&self.queues)
    }

    pub fn notify(&self) {
        self.wake.notify_one();
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.wake.notify_all();
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Recovers the guard from a poisoned lock; queue contents stay structurally valid.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct WorkerCtx {
    pub shared: Arc<Shared>,
    pub terrain: Arc<TerrainGenerator>,
    pub overlay: Arc<Mutex<EditOverlay>>,
    pub dims: ChunkDims,
    pub idle: Duration,
}

/// Blocks until a key is available or stop is requested.
fn next_job(ctx: &WorkerCtx) -> Option<ChunkCoord> {
    let mut q = ctx.shared.lock();
    loop {
        if ctx.shared.stopping() {
            return None;
        }
        while let Some(key) = q.generation.pop_front() {
            if q.live.contains(&key) {
                q.skipped.push(key);
                continue;
            }
            q.in_flight = Some(key);
            return Some(key);
        }
        q = match ctx.shared.wake.wait_timeout(q, ctx.idle) {
            Ok((g, _)) => g,
            Err(poisoned) => poisoned.into_inner().0,
        };
    }
}

pub(crate) fn build_ready_chunk(ctx: &WorkerCtx, coord: ChunkCoord) -> ReadyChunk {
    let t0 = Instant::now();
    let mut blocks = VoxelBuffer::scratch(ctx.dims);
    let mut view = blocks.view_mut(coord);
    let mut occupancy = generate_chunk(&ctx.terrain, &mut view);
    let t_gen_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;

    let (applied, overlay_rev) = {
        let overlay = lock(&ctx.overlay);
        let rev = ctx.shared.overlay_rev.load(Ordering::Acquire);
        (overlay.apply_to(&mut view), rev)
    };
    if applied > 0 {
        occupancy = if view.as_view().has_non_air() {
            ChunkOccupancy::Populated
        } else {
            ChunkOccupancy::Empty
        };
    }

    let t1 = Instant::now();
    let mesh = if occupancy.has_blocks() {
        build_chunk_mesh(&blocks.view(coord))
    } else {
        MeshBuild::default()
    };
    let t_mesh_ms = t1.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    ReadyChunk {
        coord,
        blocks,
        mesh,
        occupancy,
        overlay_rev,
        t_gen_ms,
        t_mesh_ms,
    }
}

pub(crate) fn run(ctx: WorkerCtx) {
    log::info!(target: "stream", "generation worker started");
    while let Some(coord) = next_job(&ctx) {
        let out = build_ready_chunk(&ctx, coord);
        log::trace!(
            target: "perf",
            "gen chunk=({},{},{}) gen_ms={} mesh_ms={} quads={}",
            coord.cx,
            coord.cy,
            coord.cz,
            out.t_gen_ms,
            out.t_mesh_ms,
            out.mesh.quad_count()
        );
        let mut q = ctx.shared.lock();
        q.in_flight = None;
        q.ready.push_back(out);
        ctx.shared.generated.fetch_add(1, Ordering::Relaxed);
    }
    log::info!(target: "stream", "generation worker stopped");
}

pub(crate) fn spawn(ctx: WorkerCtx) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("tessera-gen".into())
        .spawn(move || run(ctx))
}
