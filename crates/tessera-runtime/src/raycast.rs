use tessera_blocks::Block;
use tessera_geom::Vec3;
use tessera_world::{ChunkCoord, ChunkDims, LocalPos};

/// What a ray sample found at one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Probe {
    Solid(Block),
    Open,
    /// Cell belongs to a chunk that is not live.
    Unloaded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    pub coord: ChunkCoord,
    pub local: LocalPos,
    pub block: Block,
    wx: i32,
    wy: i32,
    wz: i32,
}

impl RayHit {
    pub fn new(dims: ChunkDims, wx: i32, wy: i32, wz: i32, block: Block) -> Self {
        let (coord, local) = dims.split(wx, wy, wz);
        Self {
            coord,
            local,
            block,
            wx,
            wy,
            wz,
        }
    }

    #[inline]
    pub fn with_block(self, block: Block) -> Self {
        Self { block, ..self }
    }

    #[inline]
    pub fn world_pos(&self) -> (i32, i32, i32) {
        (self.wx, self.wy, self.wz)
    }
}

/// Result of a ray walk: first solid cell, and the last non-solid cell sampled before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayWalk {
    pub hit: (i32, i32, i32),
    pub block: Block,
    pub before: Option<(i32, i32, i32)>,
}

/// Upper bound on the samples one walk may take.
pub const MAX_RAY_SAMPLES: u32 = 1 << 16;

/// Samples `origin + dir·t` for `t = 0, step, 2·step, …` up to `max_dist` and returns the
/// first cell `probe` reports as solid. Unloaded cells are stepped through. A walk gives up
/// after [`MAX_RAY_SAMPLES`] samples.
pub fn march<F>(origin: Vec3, dir: Vec3, step: f32, max_dist: f32, mut probe: F) -> Option<RayWalk>
where
    F: FnMut(i32, i32, i32) -> Probe,
{
    if !(origin.is_finite() && dir.is_finite() && step > 0.0 && max_dist.is_finite()) {
        return None;
    }
    let d = dir.normalized();
    if d.length() < 1e-6 {
        return None;
    }
    let mut before = None;
    let mut last_cell = None;
    let mut i = 0u32;
    loop {
        let t = step * i as f32;
        if t > max_dist || i > MAX_RAY_SAMPLES {
            return None;
        }
        i += 1;
        let cell = origin.along(d, t).floor_cell();
        if last_cell == Some(cell) {
            continue;
        }
        last_cell = Some(cell);
        match probe(cell.0, cell.1, cell.2) {
            Probe::Solid(block) => {
                return Some(RayWalk {
                    hit: cell,
                    block,
                    before,
                });
            }
            Probe::Open | Probe::Unloaded => before = Some(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_at(target: (i32, i32, i32)) -> impl FnMut(i32, i32, i32) -> Probe {
        move |x, y, z| {
            if (x, y, z) == target {
                Probe::Solid(Block::Stone)
            } else {
                Probe::Open
            }
        }
    }

    #[test]
    fn hits_block_ahead_and_remembers_cell_before_it() {
        let w = march(
            Vec3::new(0.5, 0.5, -3.0),
            Vec3::new(0.0, 0.0, 1.0),
            0.1,
            8.0,
            solid_at((0, 0, 0)),
        )
        .unwrap();
        assert_eq!(w.hit, (0, 0, 0));
        assert_eq!(w.before, Some((0, 0, -1)));
    }

    #[test]
    fn misses_beyond_max_distance() {
        let w = march(
            Vec3::new(0.5, 0.5, -30.0),
            Vec3::new(0.0, 0.0, 1.0),
            0.1,
            8.0,
            solid_at((0, 0, 0)),
        );
        assert!(w.is_none());
    }

    #[test]
    fn origin_inside_solid_has_no_cell_before() {
        let w = march(
            Vec3::new(0.2, 0.2, 0.2),
            Vec3::new(1.0, 0.0, 0.0),
            0.1,
            8.0,
            solid_at((0, 0, 0)),
        )
        .unwrap();
        assert_eq!(w.before, None);
    }

    #[test]
    fn zero_direction_is_none() {
        let w = march(Vec3::ZERO, Vec3::ZERO, 0.1, 8.0, |_, _, _| Probe::Solid(Block::Dirt));
        assert!(w.is_none());
    }

    #[test]
    fn unloaded_cells_are_stepped_through() {
        let mut seen = 0;
        let w = march(
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(1.0, 0.0, 0.0),
            0.25,
            8.0,
            |x, _, _| {
                seen += 1;
                match x {
                    0..=2 => Probe::Unloaded,
                    3 => Probe::Solid(Block::Grass),
                    _ => Probe::Open,
                }
            },
        )
        .unwrap();
        assert_eq!(w.hit, (3, 0, 0));
        assert_eq!(w.block, Block::Grass);
        assert_eq!(w.before, Some((2, 0, 0)));
        // one probe per distinct cell
        assert_eq!(seen, 4);
    }

    #[test]
    fn unbounded_or_oversampled_walks_give_up() {
        let open = |_: i32, _: i32, _: i32| Probe::Open;
        assert!(march(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.1, f32::INFINITY, open).is_none());
        let mut probes = 0u32;
        let w = march(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1e-6, 1e9, |_, _, _| {
            probes += 1;
            Probe::Open
        });
        assert!(w.is_none());
        assert!(probes <= MAX_RAY_SAMPLES + 1);
    }

    #[test]
    fn ray_hit_splits_negative_world_positions() {
        let h = RayHit::new(ChunkDims::cube(16), 0, 0, -1, Block::Air);
        assert_eq!(h.coord, ChunkCoord::new(0, 0, -1));
        assert_eq!(h.local, LocalPos::new(0, 0, 15));
        assert_eq!(h.world_pos(), (0, 0, -1));
    }
}
