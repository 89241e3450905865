use proptest::prelude::*;
use tessera_world::{ChunkDims, TerrainGenerator, TerrainParams, WorldConfig, WorldGenMode};

fn world_i32() -> impl Strategy<Value = i32> {
    -1_000_000i32..=1_000_000
}

fn dim() -> impl Strategy<Value = usize> {
    1usize..=32
}

proptest! {
    // split() and to_world() are inverse and local coords stay in range
    #[test]
    fn split_roundtrips(wx in world_i32(), wy in world_i32(), wz in world_i32(), sx in dim(), sy in dim(), sz in dim()) {
        let dims = ChunkDims::new(sx, sy, sz);
        let (coord, local) = dims.split(wx, wy, wz);
        prop_assert!(dims.contains_local(local.lx, local.ly, local.lz));
        prop_assert_eq!(dims.to_world(coord, local), (wx, wy, wz));
        prop_assert_eq!(dims.chunk_of(wx, wy, wz), coord);
    }

    // Terrain is a pure function of position
    #[test]
    fn trig_terrain_is_deterministic(wx in -10_000i32..10_000, wy in -64i32..64, wz in -10_000i32..10_000) {
        let a = TerrainGenerator::new(WorldGenMode::Trig(TerrainParams::default()));
        let b = TerrainGenerator::new(WorldGenMode::Trig(TerrainParams::default()));
        prop_assert_eq!(a.block_at(wx, wy, wz), b.block_at(wx, wy, wz));
    }
}

#[test]
fn config_defaults_fill_missing_fields() {
    let cfg = WorldConfig::from_toml_str("mode = \"flat\"\nflat_height = 7\n").unwrap();
    assert_eq!(cfg.chunk_size, [16, 16, 16]);
    assert_eq!(cfg.gen_mode(), WorldGenMode::Flat { height: 7 });
    assert_eq!(cfg.terrain, TerrainParams::default());
}

#[test]
fn config_rejects_zero_chunk_size() {
    assert!(WorldConfig::from_toml_str("chunk_size = [16, 0, 16]\n").is_err());
}
