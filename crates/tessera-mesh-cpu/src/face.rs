use tessera_geom::Vec3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY,
    NegY,
    PosX,
    NegX,
    PosZ,
    NegZ,
}

impl Face {
    /// Faces emitted as unit quads; `PosY` goes through the greedy pass.
    pub const UNMERGED: [Face; 5] = [Face::NegY, Face::PosX, Face::NegX, Face::PosZ, Face::NegZ];

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (dx, dy, dz) = self.delta();
        Vec3::new(dx as f32, dy as f32, dz as f32)
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// In-plane axes `(u, v)` used to lay out a rectangle on this face.
    #[inline]
    pub(crate) fn plane_axes(self) -> (Vec3, Vec3) {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = Vec3::new(0.0, 0.0, 1.0);
        match self {
            Face::PosY | Face::NegY => (x, z),
            Face::PosX | Face::NegX => (z, y),
            Face::PosZ | Face::NegZ => (x, y),
        }
    }

    /// Offset from a cell's min corner to the plane this face lies on.
    #[inline]
    pub(crate) fn plane_offset(self) -> Vec3 {
        match self {
            Face::PosY => Vec3::new(0.0, 1.0, 0.0),
            Face::PosX => Vec3::new(1.0, 0.0, 0.0),
            Face::PosZ => Vec3::new(0.0, 0.0, 1.0),
            Face::NegY | Face::NegX | Face::NegZ => Vec3::ZERO,
        }
    }
}
