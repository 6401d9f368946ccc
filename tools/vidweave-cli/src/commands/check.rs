//! Check system capabilities.

use vidweave_common::config::AppConfig;
use vidweave_render_pipeline::engine::{FfmpegEngine, TranscodeEngine};

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load();
    let engine = FfmpegEngine::with_binary(&config.engine.binary);

    println!("Engine binary: {}", config.engine.binary);
    if engine.is_available() {
        println!("  Available: yes");
    } else {
        println!("  Available: NO (not found in PATH)");
    }

    println!("Working directory: {}", config.work_dir.display());
    match std::fs::create_dir_all(&config.work_dir) {
        Ok(()) => println!("  Writable: yes"),
        Err(e) => println!("  Writable: NO ({e})"),
    }

    println!("Font file: {}", config.engine.font_file.display());
    if config.engine.font_file.exists() {
        println!("  Present: yes");
    } else {
        println!("  Present: NO (text overlays will fail)");
    }

    Ok(())
}
