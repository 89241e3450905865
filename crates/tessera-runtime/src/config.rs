use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use tessera_blocks::Block;
use tessera_chunk::VoxelBuffer;
use tessera_world::{ChunkDims, WorldConfig};

use crate::raycast::MAX_RAY_SAMPLES;

pub const MAX_RENDER_DISTANCE: i32 = 32;
pub const MAX_VERTICAL_DISTANCE: i32 = 16;
/// Largest ring buffer, in blocks, the engine will allocate.
pub const MAX_BUFFER_BLOCKS: u64 = 1 << 28;

/// `[stream]` table: view distances, per-tick throttles, and interaction limits.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StreamConfig {
    /// Horizontal view distance `R` in chunks.
    #[serde(default = "default_render_distance")]
    pub render_distance: i32,
    /// Vertical view distance `V` in chunks.
    #[serde(default = "default_vertical_distance")]
    pub vertical_distance: i32,
    /// Chunks within this 3D radius are generated before the rest.
    #[serde(default = "default_near_radius")]
    pub near_radius: i32,
    #[serde(default = "default_per_tick")]
    pub uploads_per_tick: usize,
    #[serde(default = "default_per_tick")]
    pub disposals_per_tick: usize,
    #[serde(default = "default_ray_step")]
    pub ray_step: f32,
    #[serde(default = "default_ray_max_distance")]
    pub ray_max_distance: f32,
    #[serde(default = "default_place_block")]
    pub place_block: Block,
    #[serde(default = "default_worker_idle_ms")]
    pub worker_idle_ms: u64,
}

fn default_render_distance() -> i32 {
    4
}
fn default_vertical_distance() -> i32 {
    1
}
fn default_near_radius() -> i32 {
    2
}
fn default_per_tick() -> usize {
    2
}
fn default_ray_step() -> f32 {
    0.1
}
fn default_ray_max_distance() -> f32 {
    8.0
}
fn default_place_block() -> Block {
    Block::Stone
}
fn default_worker_idle_ms() -> u64 {
    2
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            render_distance: default_render_distance(),
            vertical_distance: default_vertical_distance(),
            near_radius: default_near_radius(),
            uploads_per_tick: default_per_tick(),
            disposals_per_tick: default_per_tick(),
            ray_step: default_ray_step(),
            ray_max_distance: default_ray_max_distance(),
            place_block: default_place_block(),
            worker_idle_ms: default_worker_idle_ms(),
        }
    }
}

impl StreamConfig {
    /// Horizontal keep radius (`R + 1`).
    #[inline]
    pub fn keep_distance(&self) -> i32 {
        self.render_distance + 1
    }

    /// Vertical keep radius (`V + 1`).
    #[inline]
    pub fn keep_vertical(&self) -> i32 {
        self.vertical_distance + 1
    }

    /// Ring buffer with a period of exactly `2·keep+1` chunks per axis, so no two keys of
    /// the keep set share storage.
    pub fn buffer_for(&self, dims: ChunkDims) -> VoxelBuffer {
        VoxelBuffer::for_view_distance(
            dims,
            self.keep_distance() as usize,
            self.keep_vertical() as usize,
        )
    }

    /// Block count of the buffer `buffer_for` would allocate; `None` on overflow.
    fn buffer_blocks(&self, dims: ChunkDims) -> Option<u64> {
        let span = |keep: i32, size: usize| {
            let chunks = u64::try_from(keep).ok()?.checked_mul(2)?.checked_add(1)?;
            chunks.checked_mul(u64::try_from(size).ok()?)
        };
        let x = span(self.keep_distance(), dims.sx)?;
        let y = span(self.keep_vertical(), dims.sy)?;
        let z = span(self.keep_distance(), dims.sz)?;
        x.checked_mul(y)?.checked_mul(z)
    }

    pub fn validate(&self, dims: ChunkDims) -> Result<(), ConfigError> {
        if dims.sx == 0 || dims.sy == 0 || dims.sz == 0 {
            return Err(ConfigError::ZeroChunkSize(dims));
        }
        if self.render_distance < 0 || self.vertical_distance < 0 || self.near_radius < 0 {
            return Err(ConfigError::NegativeDistance);
        }
        if self.render_distance > MAX_RENDER_DISTANCE {
            return Err(ConfigError::DistanceTooLarge {
                field: "render_distance",
                value: self.render_distance,
                max: MAX_RENDER_DISTANCE,
            });
        }
        if self.vertical_distance > MAX_VERTICAL_DISTANCE {
            return Err(ConfigError::DistanceTooLarge {
                field: "vertical_distance",
                value: self.vertical_distance,
                max: MAX_VERTICAL_DISTANCE,
            });
        }
        if self.near_radius >= self.render_distance {
            return Err(ConfigError::NearRadiusTooLarge {
                near: self.near_radius,
                render: self.render_distance,
            });
        }
        if self.uploads_per_tick == 0 || self.disposals_per_tick == 0 {
            return Err(ConfigError::ZeroThrottle);
        }
        if !(self.ray_step.is_finite() && self.ray_step > 0.0) {
            return Err(ConfigError::InvalidRayStep(self.ray_step));
        }
        if !(self.ray_max_distance.is_finite() && self.ray_max_distance > 0.0) {
            return Err(ConfigError::InvalidRayDistance(self.ray_max_distance));
        }
        let samples = f64::from(self.ray_max_distance) / f64::from(self.ray_step);
        if samples > f64::from(MAX_RAY_SAMPLES) {
            return Err(ConfigError::TooManyRaySamples {
                step: self.ray_step,
                max_distance: self.ray_max_distance,
            });
        }
        if !self.place_block.is_solid() {
            return Err(ConfigError::PlaceBlockNotSolid(self.place_block));
        }
        let blocks = self.buffer_blocks(dims);
        if blocks.is_none_or(|b| b > MAX_BUFFER_BLOCKS) {
            return Err(ConfigError::BufferTooLarge {
                blocks,
                max: MAX_BUFFER_BLOCKS,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ZeroChunkSize(ChunkDims),
    NegativeDistance,
    DistanceTooLarge { field: &'static str, value: i32, max: i32 },
    NearRadiusTooLarge { near: i32, render: i32 },
    ZeroThrottle,
    InvalidRayStep(f32),
    InvalidRayDistance(f32),
    TooManyRaySamples { step: f32, max_distance: f32 },
    PlaceBlockNotSolid(Block),
    BufferTooLarge { blocks: Option<u64>, max: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroChunkSize(d) => {
                write!(f, "chunk size must be non-zero, got {}x{}x{}", d.sx, d.sy, d.sz)
            }
            ConfigError::NegativeDistance => write!(f, "view distances must be non-negative"),
            ConfigError::DistanceTooLarge { field, value, max } => {
                write!(f, "{field} ({value}) exceeds the maximum of {max}")
            }
            ConfigError::NearRadiusTooLarge { near, render } => write!(
                f,
                "near_radius ({near}) must be smaller than render_distance ({render})"
            ),
            ConfigError::ZeroThrottle => {
                write!(f, "uploads_per_tick and disposals_per_tick must be at least 1")
            }
            ConfigError::InvalidRayStep(s) => write!(f, "ray_step must be positive, got {s}"),
            ConfigError::InvalidRayDistance(d) => {
                write!(f, "ray_max_distance must be finite and positive, got {d}")
            }
            ConfigError::TooManyRaySamples { step, max_distance } => write!(
                f,
                "ray_max_distance {max_distance} at ray_step {step} exceeds {MAX_RAY_SAMPLES} samples"
            ),
            ConfigError::PlaceBlockNotSolid(b) => {
                write!(f, "place_block must be solid, got {}", b.name())
            }
            ConfigError::BufferTooLarge { blocks: Some(n), max } => {
                write!(f, "voxel buffer would hold {n} blocks, limit is {max}")
            }
            ConfigError::BufferTooLarge { blocks: None, max } => {
                write!(f, "voxel buffer size overflows, limit is {max} blocks")
            }
        }
    }
}

impl Error for ConfigError {}

/// Whole config file: `[world]` and `[stream]` tables.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: EngineConfig = toml::from_str(s)?;
        cfg.stream.validate(cfg.world.dims())?;
        Ok(cfg)
    }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    EngineConfig::from_toml_str(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.validate(ChunkDims::default()), Ok(()));
        let b = cfg.buffer_for(ChunkDims::default());
        assert_eq!(b.period_chunks(), (11, 5, 11));
    }

    #[test]
    fn near_radius_must_be_below_render_distance() {
        let cfg = StreamConfig {
            near_radius: 4,
            ..StreamConfig::default()
        };
        assert_eq!(
            cfg.validate(ChunkDims::default()),
            Err(ConfigError::NearRadiusTooLarge { near: 4, render: 4 })
        );
    }

    #[test]
    fn rejects_zero_throttle_and_air_placement() {
        let dims = ChunkDims::default();
        let zero = StreamConfig {
            uploads_per_tick: 0,
            ..StreamConfig::default()
        };
        assert_eq!(zero.validate(dims), Err(ConfigError::ZeroThrottle));
        let air = StreamConfig {
            place_block: Block::Air,
            ..StreamConfig::default()
        };
        assert_eq!(air.validate(dims), Err(ConfigError::PlaceBlockNotSolid(Block::Air)));
        let ray = StreamConfig {
            ray_step: 0.0,
            ..StreamConfig::default()
        };
        assert!(ray.validate(dims).is_err());
    }

    #[test]
    fn rejects_unbounded_ray_walks() {
        let dims = ChunkDims::default();
        let inf = StreamConfig {
            ray_max_distance: f32::INFINITY,
            ..StreamConfig::default()
        };
        assert_eq!(
            inf.validate(dims),
            Err(ConfigError::InvalidRayDistance(f32::INFINITY))
        );
        let zero = StreamConfig {
            ray_max_distance: 0.0,
            ..StreamConfig::default()
        };
        assert!(zero.validate(dims).is_err());
        let tiny = StreamConfig {
            ray_step: 1e-12,
            ..StreamConfig::default()
        };
        assert!(matches!(
            tiny.validate(dims),
            Err(ConfigError::TooManyRaySamples { .. })
        ));
        assert!(EngineConfig::from_toml_str("[stream]\nray_max_distance = inf").is_err());
    }

    #[test]
    fn rejects_oversized_distances_and_buffers() {
        let wide = StreamConfig {
            render_distance: i32::MAX,
            ..StreamConfig::default()
        };
        assert!(matches!(
            wide.validate(ChunkDims::default()),
            Err(ConfigError::DistanceTooLarge { field: "render_distance", .. })
        ));
        let tall = StreamConfig {
            vertical_distance: 17,
            ..StreamConfig::default()
        };
        assert!(matches!(
            tall.validate(ChunkDims::default()),
            Err(ConfigError::DistanceTooLarge { field: "vertical_distance", .. })
        ));
        // within the distance limits but far too many blocks
        let big = StreamConfig {
            render_distance: MAX_RENDER_DISTANCE,
            vertical_distance: MAX_VERTICAL_DISTANCE,
            ..StreamConfig::default()
        };
        assert!(matches!(
            big.validate(ChunkDims::default()),
            Err(ConfigError::BufferTooLarge { blocks: Some(_), .. })
        ));
        assert!(matches!(
            StreamConfig::default().validate(ChunkDims::cube(usize::MAX)),
            Err(ConfigError::BufferTooLarge { blocks: None, .. })
        ));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = EngineConfig::from_toml_str(include_str!("../../../config/engine.toml")).unwrap();
        assert_eq!(cfg.stream, StreamConfig::default());
        assert_eq!(cfg.world, WorldConfig::default());
    }

    #[test]
    fn parses_both_tables_with_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [world]
            mode = "flat"
            flat_height = 3

            [stream]
            render_distance = 6
            place_block = "sand"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.stream.render_distance, 6);
        assert_eq!(cfg.stream.near_radius, 2);
        assert_eq!(cfg.stream.place_block, Block::Sand);
        assert_eq!(cfg.world.flat_height, 3);
        assert!(EngineConfig::from_toml_str("").is_ok());
        assert!(EngineConfig::from_toml_str("[stream]\nnear_radius = 9").is_err());
    }
}
