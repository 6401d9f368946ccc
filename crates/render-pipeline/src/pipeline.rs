//! Pipeline orchestration: request validation through final merge and
//! cleanup.

use std::path::PathBuf;

use vidweave_common::config::AppConfig;
use vidweave_common::error::{VidweaveError, VidweaveResult};
use vidweave_composition_model::CompositionRequest;

use crate::artifacts::{ArtifactTracker, CleanupGuard};
use crate::clip::ClipRenderer;
use crate::engine::{FfmpegEngine, TranscodeEngine};
use crate::{audio, concat, overlay};

/// Sequences the pipeline stages for one request at a time: clip
/// rendering per item, concatenation, overlays when present, and the
/// background-audio merge always.
///
/// Processing is strictly sequential; every engine invocation blocks
/// until the engine exits. The pipeline owns one artifact tracker per
/// request and reclaims intermediates on every exit path.
pub struct CompositionPipeline<'a> {
    engine: &'a dyn TranscodeEngine,
    work_dir: PathBuf,
    font_file: PathBuf,
}

impl<'a> CompositionPipeline<'a> {
    pub fn new(
        engine: &'a dyn TranscodeEngine,
        work_dir: impl Into<PathBuf>,
        font_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            work_dir: work_dir.into(),
            font_file: font_file.into(),
        }
    }

    /// Render a request, namespacing artifacts by the current Unix
    /// timestamp.
    pub fn render(&self, request: &CompositionRequest) -> VidweaveResult<PathBuf> {
        self.render_at(request, chrono::Utc::now().timestamp())
    }

    /// Render with an explicit request identifier.
    ///
    /// The identifier namespaces every artifact path under the shared
    /// working directory; callers must keep it unique across
    /// concurrently processed requests.
    pub fn render_at(
        &self,
        request: &CompositionRequest,
        timestamp: i64,
    ) -> VidweaveResult<PathBuf> {
        validate(request)?;
        std::fs::create_dir_all(&self.work_dir)?;

        // The guard reclaims every registered artifact when it drops,
        // whichever way this function exits.
        let mut guard = CleanupGuard::new();
        let result = self.run_stages(request, timestamp, guard.tracker());
        if let Ok(output) = &result {
            guard.preserve(output);
        }
        result
    }

    fn run_stages(
        &self,
        request: &CompositionRequest,
        timestamp: i64,
        artifacts: &mut ArtifactTracker,
    ) -> VidweaveResult<PathBuf> {
        let started = std::time::Instant::now();

        let renderer = ClipRenderer {
            engine: self.engine,
            work_dir: &self.work_dir,
            resolution: request.resolution,
            timestamp,
        };
        let mut clips = Vec::with_capacity(request.media_items.len());
        for (index, item) in request.media_items.iter().enumerate() {
            clips.push(renderer.render(item, index, artifacts)?);
        }

        let concatenated =
            concat::concatenate(self.engine, &self.work_dir, timestamp, &clips, artifacts)?;

        let total_duration = request.total_duration();

        let visual = if request.overlays.is_empty() {
            concatenated
        } else {
            overlay::apply_overlays(
                self.engine,
                &self.work_dir,
                timestamp,
                &concatenated,
                &request.overlays,
                &self.font_file,
                artifacts,
            )?
        };

        let background = if request.background_audio_items.is_empty() {
            audio::synthesize_silence_bed(
                self.engine,
                &self.work_dir,
                timestamp,
                total_duration,
                artifacts,
            )?
        } else {
            audio::prepare_background_tracks(
                self.engine,
                &self.work_dir,
                timestamp,
                &request.background_audio_items,
                artifacts,
            )?
        };

        let merged = audio::merge_with_background(
            self.engine,
            &self.work_dir,
            timestamp,
            &visual,
            &background,
            total_duration,
            artifacts,
        )?;

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            total_duration,
            clips = request.media_items.len(),
            overlays = request.overlays.len(),
            background_tracks = request.background_audio_items.len(),
            "Composition rendered"
        );
        Ok(merged)
    }
}

fn validate(request: &CompositionRequest) -> VidweaveResult<()> {
    if request.media_items.is_empty() {
        return Err(VidweaveError::validation(
            "At least one media item is required",
        ));
    }
    for (index, item) in request.media_items.iter().enumerate() {
        let duration = item.clip_duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VidweaveError::validation(format!(
                "Media item {index} has a non-positive trim window"
            )));
        }
    }
    Ok(())
}

/// Render a composition request end to end with the configured engine.
///
/// This is the main entry point.
pub async fn render_composition(
    request: &CompositionRequest,
    config: &AppConfig,
) -> VidweaveResult<PathBuf> {
    let engine = FfmpegEngine::with_binary(&config.engine.binary);
    if !engine.is_available() {
        return Err(VidweaveError::engine(format!(
            "No transcoding engine found (expected `{}` in PATH)",
            config.engine.binary
        )));
    }

    tracing::info!(
        engine = engine.name(),
        items = request.media_items.len(),
        overlays = request.overlays.len(),
        background_tracks = request.background_audio_items.len(),
        "Starting composition"
    );

    let pipeline = CompositionPipeline::new(&engine, &config.work_dir, &config.engine.font_file);
    pipeline.render(request)
}
