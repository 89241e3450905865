mod cli;
mod demo;

use clap::Parser;
use std::error::Error;
use std::sync::atomic::Ordering;

use tessera_runtime::{EngineConfig, HeadlessUploader, StreamingEngine, load_engine_config};

fn run(args: cli::Args) -> Result<(), Box<dyn Error>> {
    let cfg = match &args.config {
        Some(path) => load_engine_config(path)?,
        None => EngineConfig::default(),
    };
    if args.print_config {
        print!("{}", toml::to_string_pretty(&cfg)?);
        return Ok(());
    }

    let uploader = HeadlessUploader::new();
    let counters = uploader.counters();
    let mut engine = StreamingEngine::new(&cfg.world, cfg.stream.clone(), uploader)?;

    if let Some(path) = &args.save {
        let edits = tessera_io::load_edits(path);
        engine.load_edits(&edits);
    }

    let report = demo::walk(&mut engine, args.ticks, args.speed);
    log::info!(
        "walk done: ticks={} uploaded={} disposed={} max_live={} ready_at={:?}",
        report.ticks,
        report.uploaded,
        report.disposed,
        report.max_live,
        report.ready_at
    );
    if let Some(hit) = report.broke {
        log::info!("broke {:?} at {:?}", hit.block, hit.world_pos());
    }
    if let Some(hit) = report.placed {
        log::info!("placed {:?} at {:?}", hit.block, hit.world_pos());
    }

    if let Some(path) = &args.save {
        tessera_io::save_edits(path, &engine.edits())?;
    }
    engine.shutdown();
    log::info!(
        "render resources: uploads={} disposals={} resident={}",
        counters.uploads.load(Ordering::Relaxed),
        counters.disposals.load(Ordering::Relaxed),
        counters.resident()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
