use serde::{Deserialize, Serialize};
use tessera_blocks::Block;
use tessera_chunk::{VoxelBuffer, generate_chunk};
use tessera_edit::{EditOverlay, EditRecord};
use tessera_world::{ChunkCoord, ChunkDims, LocalPos, TerrainGenerator, WorldGenMode};

#[derive(Serialize, Deserialize)]
struct Doc {
    edits: Vec<EditRecord>,
}

fn regenerate(terrain: &TerrainGenerator, dims: ChunkDims, c: ChunkCoord, o: &EditOverlay) -> VoxelBuffer {
    let mut buf = VoxelBuffer::scratch(dims);
    let mut view = buf.view_mut(c);
    generate_chunk(terrain, &mut view);
    o.apply_to(&mut view);
    buf
}

#[test]
fn edits_survive_serialize_and_regeneration() {
    let dims = ChunkDims::cube(4);
    let terrain = TerrainGenerator::new(WorldGenMode::Flat { height: 2 });
    let c = ChunkCoord::new(2, 0, -1);
    let mut o = EditOverlay::new(dims);
    o.record_edit(c, LocalPos::new(1, 3, 1), Block::Sand);
    o.record_edit(c, LocalPos::new(2, 1, 2), Block::Stone);

    let text = toml::to_string(&Doc { edits: o.serialize() }).unwrap();
    let doc: Doc = toml::from_str(&text).unwrap();
    let mut fresh = EditOverlay::new(dims);
    fresh.deserialize(&doc.edits);

    let buf = regenerate(&terrain, dims, c, &fresh);
    let v = buf.view(c);
    assert_eq!(v.get(1, 3, 1), Block::Sand);
    assert_eq!(v.get(2, 1, 2), Block::Stone);
    // untouched cells keep terrain output
    assert_eq!(v.get(0, 1, 0), Block::Grass);
}

#[test]
fn carving_back_to_air_restores_terrain_default() {
    let dims = ChunkDims::cube(4);
    let terrain = TerrainGenerator::new(WorldGenMode::Flat { height: 2 });
    let c = ChunkCoord::new(0, 0, 0);
    let mut o = EditOverlay::new(dims);
    o.record_edit(c, LocalPos::new(0, 1, 0), Block::Stone);
    o.record_edit(c, LocalPos::new(0, 1, 0), Block::Air);

    let mut fresh = EditOverlay::new(dims);
    fresh.deserialize(&o.serialize());
    assert!(fresh.is_empty());
    let buf = regenerate(&terrain, dims, c, &fresh);
    assert_eq!(buf.view(c).get(0, 1, 0), Block::Grass);
}

#[test]
fn deserialize_replaces_rather_than_merges() {
    let dims = ChunkDims::cube(4);
    let c = ChunkCoord::new(0, 0, 0);
    let mut o = EditOverlay::new(dims);
    o.record_edit(c, LocalPos::new(0, 0, 0), Block::Stone);
    let other = vec![EditRecord {
        cx: 1,
        cy: 0,
        cz: 0,
        lx: 3,
        ly: 3,
        lz: 3,
        block: Block::Water,
    }];
    o.deserialize(&other);
    assert_eq!(o.get(c, LocalPos::new(0, 0, 0)), None);
    assert_eq!(o.serialize(), other);
}

#[test]
fn deserialize_skips_out_of_bounds_and_air() {
    let dims = ChunkDims::cube(4);
    let mut o = EditOverlay::new(dims);
    let rec = |lx, block| EditRecord {
        cx: 0,
        cy: 0,
        cz: 0,
        lx,
        ly: 0,
        lz: 0,
        block,
    };
    o.deserialize(&[rec(9, Block::Stone), rec(1, Block::Air), rec(2, Block::Dirt)]);
    assert_eq!(o.serialize(), vec![rec(2, Block::Dirt)]);
}

#[test]
fn apply_to_live_skips_non_live_chunks() {
    let dims = ChunkDims::cube(4);
    let mut buf = VoxelBuffer::for_view_distance(dims, 2, 1);
    let mut o = EditOverlay::new(dims);
    let live = ChunkCoord::new(0, 0, 0);
    let dead = ChunkCoord::new(1, 0, 0);
    o.record_edit(live, LocalPos::new(1, 1, 1), Block::Stone);
    o.record_edit(dead, LocalPos::new(1, 1, 1), Block::Stone);
    let touched = o.apply_to_live(&mut buf, |k| k == live);
    assert_eq!(touched, vec![live]);
    assert_eq!(buf.view(live).get(1, 1, 1), Block::Stone);
    assert_eq!(buf.view(dead).get(1, 1, 1), Block::Air);
}
