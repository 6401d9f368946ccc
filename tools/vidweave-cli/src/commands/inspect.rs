//! Summarize a composition request without rendering it.

use std::path::PathBuf;

use vidweave_composition_model::CompositionRequest;

pub fn run(request_path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&request_path).map_err(|e| {
        anyhow::anyhow!("Failed to read request {}: {e}", request_path.display())
    })?;
    let request: CompositionRequest = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse request: {e}"))?;

    println!("Request: {}", request_path.display());
    println!("  Resolution: {}", request.resolution.token());
    println!("  Total duration: {}s", request.total_duration());

    println!("  Media items: {}", request.media_items.len());
    for (index, item) in request.media_items.iter().enumerate() {
        let kind = if item.is_image { "image" } else { "video" };
        let audio = if item.has_attached_audio() {
            "attached audio"
        } else if item.mute {
            "muted"
        } else {
            "own audio"
        };
        println!(
            "    [{index}] {} ({kind}, {}s, {audio})",
            item.file_name,
            item.clip_duration()
        );
    }

    if !request.overlays.is_empty() {
        println!("  Overlays: {}", request.overlays.len());
        for overlay in &request.overlays {
            println!(
                "    \"{}\" {}s..{}s fade={}s",
                overlay.text, overlay.from, overlay.until, overlay.fade
            );
        }
    }

    if !request.background_audio_items.is_empty() {
        println!(
            "  Background tracks: {}",
            request.background_audio_items.len()
        );
        for track in &request.background_audio_items {
            println!(
                "    {} start={}s window={}s..{}s volume={}",
                track.file_name,
                track.start,
                track.from,
                track.from + track.duration,
                track.volume
            );
        }
    }

    Ok(())
}
