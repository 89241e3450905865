//! Block kinds and their render colors.
#![forbid(unsafe_code)]

pub mod color;

pub use color::{TINT_MAX, TINT_MIN, chunk_tint, face_color};

use serde::{Deserialize, Serialize};

/// Closed set of block kinds. `Air` is the empty sentinel; everything else is solid.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Water = 4,
    Sand = 5,
}

impl Block {
    pub const ALL: [Block; 6] = [
        Block::Air,
        Block::Grass,
        Block::Dirt,
        Block::Stone,
        Block::Water,
        Block::Sand,
    ];

    #[inline]
    pub fn is_solid(self) -> bool {
        self != Block::Air
    }

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_id(id: u8) -> Option<Block> {
        Block::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Block::Air => "air",
            Block::Grass => "grass",
            Block::Dirt => "dirt",
            Block::Stone => "stone",
            Block::Water => "water",
            Block::Sand => "sand",
        }
    }

    /// Flat RGB in `[0,1]` before any per-chunk tint.
    #[inline]
    pub fn base_color(self) -> [f32; 3] {
        match self {
            Block::Air => [0.0, 0.0, 0.0],
            Block::Grass => [0.36, 0.70, 0.25],
            Block::Dirt => [0.53, 0.38, 0.22],
            Block::Stone => [0.50, 0.50, 0.52],
            Block::Water => [0.20, 0.40, 0.85],
            Block::Sand => [0.86, 0.80, 0.55],
        }
    }
}
