use tessera_geom::Vec3;

use crate::face::Face;

/// Flat vertex/index arrays: 3 position floats and 3 color floats per vertex,
/// triangle-list indices.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub col: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a quad (two triangles). Corners are reordered so the winding faces `n`.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, n: Vec3, rgb: [f32; 3]) {
        let base = self.vertex_count() as u32;
        let mut vs = [a, b, c, d];
        let e1 = vs[1] - vs[0];
        let e2 = vs[2] - vs[0];
        let cross = Vec3::new(
            e1.y * e2.z - e1.z * e2.y,
            e1.z * e2.x - e1.x * e2.z,
            e1.x * e2.y - e1.y * e2.x,
        );
        if cross.dot(n) < 0.0 {
            vs.swap(1, 3);
        }
        for v in vs {
            self.pos.extend_from_slice(&[v.x, v.y, v.z]);
            self.col.extend_from_slice(&rgb);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Emits a face-aligned rectangle for `face` of the cell whose min corner is `origin`,
    /// spanning `u1` by `v1` cells along the face's in-plane axes.
    pub fn add_face_rect(&mut self, face: Face, origin: Vec3, u1: f32, v1: f32, rgb: [f32; 3]) {
        let (u, v) = face.plane_axes();
        let a = origin + face.plane_offset();
        let b = a + u * u1;
        let c = b + v * v1;
        let d = a + v * v1;
        self.add_quad(a, b, c, d, face.normal(), rgb);
    }
}
