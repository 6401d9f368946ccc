//! Text overlay composition.

use std::path::{Path, PathBuf};

use vidweave_common::error::VidweaveResult;
use vidweave_composition_model::TextOverlay;

use crate::artifacts::ArtifactTracker;
use crate::engine::{EngineJob, TranscodeEngine};
use crate::filter;

/// Draw every overlay over the video in one pass.
///
/// The per-overlay `drawtext` nodes are chained in input order, so
/// later overlays draw on top of earlier ones. The audio stream is
/// copied untouched and the duration is unchanged. Callers skip this
/// stage entirely when the overlay list is empty.
pub fn apply_overlays(
    engine: &dyn TranscodeEngine,
    work_dir: &Path,
    timestamp: i64,
    input: &Path,
    overlays: &[TextOverlay],
    font_file: &Path,
    artifacts: &mut ArtifactTracker,
) -> VidweaveResult<PathBuf> {
    let chain = filter::overlay_chain(overlays, font_file);
    let output = work_dir.join(format!("final_{timestamp}.mp4"));

    let job = EngineJob::new(&output)
        .input(input, &[])
        .video_filter(chain)
        .codec(&["-c:a", "copy"]);

    tracing::debug!(overlays = overlays.len(), "Applying text overlays");
    engine.run(&job)?;
    artifacts.register(&output);
    Ok(output)
}
