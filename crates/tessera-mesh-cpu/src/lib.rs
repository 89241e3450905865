//! CPU meshing crate: greedy top-face mesher producing flat position/color/index arrays.
#![forbid(unsafe_code)]

mod build;
mod face;
mod mesh_build;

pub use build::build_chunk_mesh;
pub use face::Face;
pub use mesh_build::MeshBuild;
