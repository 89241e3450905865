//! Chunk streaming runtime: planning, the generation worker, throttled uploads and
//! disposals, and ray-driven block edits.
#![forbid(unsafe_code)]

mod config;
mod engine;
mod interact;
pub mod raycast;
pub mod render;
mod worker;

pub use config::{ConfigError, EngineConfig, StreamConfig, load_engine_config};
pub use engine::{EngineError, EngineStats, LiveChunk, StreamingEngine, TickStats};
pub use raycast::{Probe, RayHit};
pub use render::{HeadlessMesh, HeadlessUploader, MeshUploader, RenderResource};
pub use worker::ReadyChunk;
