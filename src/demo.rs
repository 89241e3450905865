use std::thread;
use std::time::Duration;

use tessera_geom::Vec3;
use tessera_runtime::{MeshUploader, RayHit, StreamingEngine, TickStats};

#[derive(Debug, Default)]
pub struct WalkReport {
    pub ticks: u32,
    pub uploaded: usize,
    pub disposed: usize,
    pub max_live: usize,
    pub ready_at: Option<u32>,
    pub broke: Option<RayHit>,
    pub placed: Option<RayHit>,
}

const SPAWN_READY_RADIUS: i32 = 1;
const FRAME: Duration = Duration::from_millis(2);

fn spawn_point<U: MeshUploader>(engine: &StreamingEngine<U>) -> Vec3 {
    let top = engine.terrain().surface_height(0, 0).unwrap_or(0);
    Vec3::new(0.5, top as f32 + 2.5, 0.5)
}

/// Runs `ticks` frames: waits for the spawn area, breaks and re-places the block under the
/// observer once, then walks diagonally at `speed` blocks per tick.
pub fn walk<U: MeshUploader>(engine: &mut StreamingEngine<U>, ticks: u32, speed: f32) -> WalkReport {
    let mut report = WalkReport::default();
    let mut pos = spawn_point(engine);
    let down = Vec3::new(0.0, -1.0, 0.0);
    let heading = Vec3::new(1.0, 0.0, 0.5).normalized();

    for tick in 0..ticks {
        let stats: TickStats = engine.update(pos);
        engine.render_all();
        report.ticks = tick + 1;
        report.uploaded += stats.uploaded;
        report.disposed += stats.disposed;
        report.max_live = report.max_live.max(engine.stats().live);

        if report.ready_at.is_none() {
            if !engine.is_area_ready(pos, SPAWN_READY_RADIUS) {
                thread::sleep(FRAME);
                continue;
            }
            report.ready_at = Some(tick);
            log::info!("spawn area ready after {} ticks", tick + 1);
            report.broke = engine.on_break(pos, down);
            report.placed = engine.on_place(pos, down);
        }

        pos += heading * speed;
        if tick % 60 == 0 {
            let s = engine.stats();
            log::info!(
                "tick {} pos=({:.1},{:.1},{:.1}) live={} pending={} queue={} uploads={} disposals={}",
                tick,
                pos.x,
                pos.y,
                pos.z,
                s.live,
                s.pending,
                s.generation_queue,
                s.upload_backlog,
                s.disposal_backlog
            );
        }
        thread::sleep(FRAME);
    }
    report
}
