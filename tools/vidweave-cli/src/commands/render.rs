//! Render a composition request to a video file.

use std::path::PathBuf;

use vidweave_common::config::AppConfig;
use vidweave_composition_model::CompositionRequest;
use vidweave_render_pipeline::render_composition;

pub async fn run(
    request_path: PathBuf,
    output: Option<PathBuf>,
    work_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(dir) = work_dir {
        config.work_dir = dir;
    }

    let content = std::fs::read_to_string(&request_path).map_err(|e| {
        anyhow::anyhow!("Failed to read request {}: {e}", request_path.display())
    })?;
    let request: CompositionRequest = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse request: {e}"))?;

    println!("Rendering composition from: {}", request_path.display());
    println!("  Items: {}", request.media_items.len());
    println!("  Total duration: {}s", request.total_duration());
    println!("  Resolution: {}", request.resolution.token());

    match render_composition(&request, &config).await {
        Ok(rendered) => {
            let final_path = match output {
                Some(target) => {
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::copy(&rendered, &target)?;
                    std::fs::remove_file(&rendered)?;
                    target
                }
                None => rendered,
            };
            println!("Render complete: {}", final_path.display());
            Ok(())
        }
        Err(e) => {
            println!("Render failed ({})", e.category().as_str());
            Err(e.into())
        }
    }
}
