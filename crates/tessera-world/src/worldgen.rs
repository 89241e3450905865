use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::ChunkDims;

/// `[world]` table of the engine config file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct WorldConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: [usize; 3],
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default = "default_flat_height")]
    pub flat_height: i32,
    #[serde(default)]
    pub terrain: TerrainParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            mode: default_mode(),
            flat_height: default_flat_height(),
            terrain: TerrainParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Trig,
    Flat,
    Empty,
}

fn default_chunk_size() -> [usize; 3] {
    [16, 16, 16]
}
fn default_mode() -> Mode {
    Mode::Trig
}
fn default_flat_height() -> i32 {
    4
}

/// Shape of the trigonometric height field and the fixed water band.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TerrainParams {
    #[serde(default = "d_base_height")]
    pub base_height: f32,
    #[serde(default = "d_amplitude")]
    pub amplitude: f32,
    #[serde(default = "d_frequency_x")]
    pub frequency_x: f32,
    #[serde(default = "d_frequency_z")]
    pub frequency_z: f32,
    #[serde(default = "d_detail_amplitude")]
    pub detail_amplitude: f32,
    #[serde(default = "d_detail_frequency")]
    pub detail_frequency: f32,
    #[serde(default = "d_water_min_y")]
    pub water_min_y: i32,
    #[serde(default = "d_water_max_y")]
    pub water_max_y: i32,
    /// Number of dirt layers under the grass before stone begins.
    #[serde(default = "d_dirt_depth")]
    pub dirt_depth: i32,
}

fn d_base_height() -> f32 {
    8.0
}
fn d_amplitude() -> f32 {
    6.0
}
fn d_frequency_x() -> f32 {
    0.05
}
fn d_frequency_z() -> f32 {
    0.07
}
fn d_detail_amplitude() -> f32 {
    2.0
}
fn d_detail_frequency() -> f32 {
    0.13
}
fn d_water_min_y() -> i32 {
    3
}
fn d_water_max_y() -> i32 {
    5
}
fn d_dirt_depth() -> i32 {
    3
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height: d_base_height(),
            amplitude: d_amplitude(),
            frequency_x: d_frequency_x(),
            frequency_z: d_frequency_z(),
            detail_amplitude: d_detail_amplitude(),
            detail_frequency: d_detail_frequency(),
            water_min_y: d_water_min_y(),
            water_max_y: d_water_max_y(),
            dirt_depth: d_dirt_depth(),
        }
    }
}

/// Resolved generation strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldGenMode {
    Trig(TerrainParams),
    /// Grass at `height - 1`, dirt and stone below, no water.
    Flat { height: i32 },
    Empty,
}

impl WorldConfig {
    pub fn dims(&self) -> ChunkDims {
        let [sx, sy, sz] = self.chunk_size;
        ChunkDims::new(sx, sy, sz)
    }

    pub fn gen_mode(&self) -> WorldGenMode {
        match self.mode {
            Mode::Trig => WorldGenMode::Trig(self.terrain.clone()),
            Mode::Flat => WorldGenMode::Flat {
                height: self.flat_height,
            },
            Mode::Empty => WorldGenMode::Empty,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: WorldConfig = toml::from_str(s)?;
        if cfg.chunk_size.iter().any(|&s| s == 0) {
            return Err(format!("chunk_size must be non-zero, got {:?}", cfg.chunk_size).into());
        }
        Ok(cfg)
    }
}

pub fn load_world_config(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    WorldConfig::from_toml_str(&s)
}
