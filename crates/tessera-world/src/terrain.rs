use tessera_blocks::Block;

use crate::worldgen::{TerrainParams, WorldGenMode};

/// Pure, position-derived terrain sampler. Safe to share across threads.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    mode: WorldGenMode,
}

impl TerrainGenerator {
    pub fn new(mode: WorldGenMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> &WorldGenMode {
        &self.mode
    }

    /// Surface height of column `(wx, wz)`: the world y of the topmost solid block,
    /// or `None` if the column is empty.
    pub fn surface_height(&self, wx: i32, wz: i32) -> Option<i32> {
        match &self.mode {
            WorldGenMode::Trig(p) => Some(trig_height(p, wx, wz)),
            WorldGenMode::Flat { height } => Some(*height - 1),
            WorldGenMode::Empty => None,
        }
    }

    /// Block at world y within a column whose surface sits at `surface`.
    pub fn block_in_column(&self, wy: i32, surface: Option<i32>) -> Block {
        let Some(h) = surface else {
            return Block::Air;
        };
        let (dirt_depth, water) = match &self.mode {
            WorldGenMode::Trig(p) => (p.dirt_depth, Some((p.water_min_y, p.water_max_y))),
            WorldGenMode::Flat { .. } => (TerrainParams::default().dirt_depth, None),
            WorldGenMode::Empty => return Block::Air,
        };
        let layered = if wy > h {
            Block::Air
        } else {
            match h - wy {
                0 => Block::Grass,
                d if d <= dirt_depth => Block::Dirt,
                _ => Block::Stone,
            }
        };
        match water {
            Some((lo, hi)) if (lo..=hi).contains(&wy) => match layered {
                Block::Air => Block::Water,
                Block::Grass => Block::Sand,
                other => other,
            },
            _ => layered,
        }
    }

    #[inline]
    pub fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Block {
        self.block_in_column(wy, self.surface_height(wx, wz))
    }
}

fn trig_height(p: &TerrainParams, wx: i32, wz: i32) -> i32 {
    let x = wx as f32;
    let z = wz as f32;
    let broad = (x * p.frequency_x).sin() * (z * p.frequency_z).cos();
    let detail = ((x + z) * p.detail_frequency).sin() * (x * p.detail_frequency * 0.5).cos();
    (p.base_height + p.amplitude * broad + p.detail_amplitude * detail).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_layers_grass_dirt_stone() {
        let g = TerrainGenerator::new(WorldGenMode::Flat { height: 6 });
        assert_eq!(g.block_at(3, 6, -9), Block::Air);
        assert_eq!(g.block_at(3, 5, -9), Block::Grass);
        assert_eq!(g.block_at(3, 4, -9), Block::Dirt);
        assert_eq!(g.block_at(3, 2, -9), Block::Dirt);
        assert_eq!(g.block_at(3, 1, -9), Block::Stone);
        assert_eq!(g.block_at(3, -40, -9), Block::Stone);
    }

    #[test]
    fn water_band_replaces_air_and_grass() {
        let p = TerrainParams {
            water_min_y: 3,
            water_max_y: 5,
            ..TerrainParams::default()
        };
        let g = TerrainGenerator::new(WorldGenMode::Trig(p));
        // Surface below the band: air above it inside the band becomes water.
        assert_eq!(g.block_in_column(4, Some(2)), Block::Water);
        assert_eq!(g.block_in_column(6, Some(2)), Block::Air);
        // Surface inside the band: grass becomes sand.
        assert_eq!(g.block_in_column(4, Some(4)), Block::Sand);
        assert_eq!(g.block_in_column(3, Some(4)), Block::Dirt);
        // Surface above the band: untouched.
        assert_eq!(g.block_in_column(10, Some(10)), Block::Grass);
    }

    #[test]
    fn empty_mode_is_all_air() {
        let g = TerrainGenerator::new(WorldGenMode::Empty);
        assert_eq!(g.surface_height(0, 0), None);
        assert_eq!(g.block_at(0, -100, 0), Block::Air);
    }
}
