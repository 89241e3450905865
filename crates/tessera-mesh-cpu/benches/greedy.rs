use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use tessera_chunk::{VoxelBuffer, generate_chunk};
use tessera_mesh_cpu::build_chunk_mesh;
use tessera_world::{ChunkCoord, ChunkDims, TerrainGenerator, TerrainParams, WorldGenMode};

fn generated(mode: WorldGenMode, coord: ChunkCoord) -> VoxelBuffer {
    let terrain = TerrainGenerator::new(mode);
    let mut buf = VoxelBuffer::scratch(ChunkDims::cube(16));
    generate_chunk(&terrain, &mut buf.view_mut(coord));
    buf
}

fn bench_mesh_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_flat");
    let coord = ChunkCoord::new(0, 0, 0);
    let buf = generated(WorldGenMode::Flat { height: 8 }, coord);
    group.bench_function("flat_16", |b| {
        b.iter(|| black_box(build_chunk_mesh(&buf.view(coord))))
    });
    group.finish();
}

fn bench_mesh_trig(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_trig");
    let coord = ChunkCoord::new(3, 0, -2);
    let buf = generated(WorldGenMode::Trig(TerrainParams::default()), coord);
    group.bench_function("trig_16", |b| {
        b.iter(|| black_box(build_chunk_mesh(&buf.view(coord))))
    });
    group.finish();
}

fn bench_generate_trig(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_trig");
    let terrain = TerrainGenerator::new(WorldGenMode::Trig(TerrainParams::default()));
    let mut buf = VoxelBuffer::scratch(ChunkDims::cube(16));
    group.bench_function("generate_chunk_16", |b| {
        b.iter(|| black_box(generate_chunk(&terrain, &mut buf.view_mut(ChunkCoord::new(1, 0, 1)))))
    });
    group.finish();
}

fn config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(3))
}

criterion_group! {
    name = benches;
    config = config();
    targets = bench_mesh_flat, bench_mesh_trig, bench_generate_trig
}
criterion_main!(benches);
