//! Upload contract between the engine and whatever owns the rendering context.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tessera_mesh_cpu::MeshBuild;
use tessera_world::ChunkCoord;

/// Opaque handle built from one chunk mesh.
pub trait RenderResource {
    fn render(&self);
    fn dispose(self);
}

/// Builds render resources. Only ever called from the engine's owning thread.
pub trait MeshUploader {
    type Resource: RenderResource;

    fn upload(&mut self, coord: ChunkCoord, mesh: &MeshBuild) -> Self::Resource;
}

#[derive(Debug, Default)]
pub struct HeadlessCounters {
    pub uploads: AtomicUsize,
    pub disposals: AtomicUsize,
    pub draws: AtomicUsize,
    pub vertices: AtomicUsize,
}

impl HeadlessCounters {
    /// Resources uploaded and not yet disposed.
    pub fn resident(&self) -> usize {
        self.uploads
            .load(Ordering::Relaxed)
            .saturating_sub(self.disposals.load(Ordering::Relaxed))
    }
}

/// Uploader with no GPU behind it; counts what a real backend would do.
#[derive(Clone, Debug, Default)]
pub struct HeadlessUploader {
    counters: Arc<HeadlessCounters>,
}

impl HeadlessUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> Arc<HeadlessCounters> {
        self.counters.clone()
    }
}

#[derive(Debug)]
pub struct HeadlessMesh {
    pub coord: ChunkCoord,
    pub vertices: usize,
    pub indices: usize,
    counters: Arc<HeadlessCounters>,
}

impl RenderResource for HeadlessMesh {
    fn render(&self) {
        self.counters.draws.fetch_add(1, Ordering::Relaxed);
    }

    fn dispose(self) {
        self.counters.disposals.fetch_add(1, Ordering::Relaxed);
        self.counters
            .vertices
            .fetch_sub(self.vertices, Ordering::Relaxed);
    }
}

impl MeshUploader for HeadlessUploader {
    type Resource = HeadlessMesh;

    fn upload(&mut self, coord: ChunkCoord, mesh: &MeshBuild) -> HeadlessMesh {
        self.counters.uploads.fetch_add(1, Ordering::Relaxed);
        self.counters
            .vertices
            .fetch_add(mesh.vertex_count(), Ordering::Relaxed);
        HeadlessMesh {
            coord,
            vertices: mesh.vertex_count(),
            indices: mesh.idx.len(),
            counters: self.counters.clone(),
        }
    }
}
