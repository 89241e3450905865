use clap::Parser;
use std::path::PathBuf;

/// Headless voxel streaming host: walks an observer through the world and streams chunks.
#[derive(Parser, Debug, Clone)]
#[command(name = "tessera", version, about)]
pub struct Args {
    /// Engine config file with `[world]` and `[stream]` tables.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Edit list loaded at startup and written back on exit.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Number of update ticks to run.
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,

    /// Observer speed in blocks per tick once the spawn area is ready.
    #[arg(long, default_value_t = 0.25)]
    pub speed: f32,

    /// Print the effective config as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}
