use std::time::Instant;

use tessera_blocks::{chunk_tint, face_color};
use tessera_chunk::ChunkView;
use tessera_geom::Vec3;

use crate::face::Face;
use crate::mesh_build::MeshBuild;

/// Meshes one chunk. Top faces are greedily merged into rectangles; every other exposed
/// face is a unit quad. Cells outside the chunk count as open, so boundary faces are
/// always emitted. Positions are centered on the chunk (shifted by `-size/2` per axis).
pub fn build_chunk_mesh(view: &ChunkView<'_>) -> MeshBuild {
    let t0 = Instant::now();
    let dims = view.dims();
    let (sx, sy, sz) = (dims.sx, dims.sy, dims.sz);
    let coord = view.coord();
    let tint = chunk_tint(coord.cx, coord.cy, coord.cz);
    let center = Vec3::new(sx as f32 * 0.5, sy as f32 * 0.5, sz as f32 * 0.5);
    let cell = |x: usize, y: usize, z: usize| Vec3::new(x as f32, y as f32, z as f32) - center;

    let mut mesh = MeshBuild::default();
    let mut visited = vec![false; sx * sy * sz];
    let vidx = |x: usize, y: usize, z: usize| (y * sz + z) * sx + x;
    let top_exposed = |x: usize, y: usize, z: usize| {
        let (x, y, z) = (x as i32, y as i32, z as i32);
        view.is_solid(x, y, z) && !view.is_solid(x, y + 1, z)
    };

    let mut top_quads = 0usize;
    for y in 0..sy {
        for z in 0..sz {
            for x in 0..sx {
                if visited[vidx(x, y, z)] || !top_exposed(x, y, z) {
                    continue;
                }
                let block = view.get(x as i32, y as i32, z as i32);
                let same = |xx: usize, zz: usize| {
                    !visited[vidx(xx, y, zz)]
                        && view.get(xx as i32, y as i32, zz as i32) == block
                        && top_exposed(xx, y, zz)
                };
                let mut w = 1;
                while x + w < sx && same(x + w, z) {
                    w += 1;
                }
                let mut h = 1;
                while z + h < sz && (x..x + w).all(|xx| same(xx, z + h)) {
                    h += 1;
                }
                for zz in z..z + h {
                    for xx in x..x + w {
                        visited[vidx(xx, y, zz)] = true;
                    }
                }
                mesh.add_face_rect(
                    Face::PosY,
                    cell(x, y, z),
                    w as f32,
                    h as f32,
                    face_color(block, tint),
                );
                top_quads += 1;
            }
        }
    }

    for y in 0..sy {
        for z in 0..sz {
            for x in 0..sx {
                let (ix, iy, iz) = (x as i32, y as i32, z as i32);
                let block = view.get(ix, iy, iz);
                if !block.is_solid() {
                    continue;
                }
                let rgb = face_color(block, tint);
                for face in Face::UNMERGED {
                    let (dx, dy, dz) = face.delta();
                    if !view.is_solid(ix + dx, iy + dy, iz + dz) {
                        mesh.add_face_rect(face, cell(x, y, z), 1.0, 1.0, rgb);
                    }
                }
            }
        }
    }

    log::trace!(
        target: "perf",
        "mesh chunk=({},{},{}) quads={} top={} ms={}",
        coord.cx,
        coord.cy,
        coord.cz,
        mesh.quad_count(),
        top_quads,
        t0.elapsed().as_millis()
    );
    mesh
}
