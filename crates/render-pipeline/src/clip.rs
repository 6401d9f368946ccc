//! Clip rendering: one media item to one normalized clip.
//!
//! Every rendered clip has exactly one video stream and exactly one
//! audio stream of exactly the item's trim-window duration, so the
//! concatenator downstream can stream-copy without inspecting anything.

use std::path::{Path, PathBuf};

use vidweave_common::error::{VidweaveError, VidweaveResult};
use vidweave_composition_model::{MediaItem, Resolution};

use crate::artifacts::ArtifactTracker;
use crate::engine::{EngineJob, TranscodeEngine};
use crate::filter;
use crate::payload;

/// Encode settings for clips rendered from still images.
const STILL_ENCODE: &[&str] = &["-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p"];

/// Still-image clips are emitted at a fixed frame rate; video clips
/// keep their native rate.
const STILL_FRAME_RATE: &str = "30";

/// How a media item's video and audio streams are produced, decided
/// once per item from `is_image`, `mute`, and attached-audio presence.
///
/// The six variants make the branch matrix exhaustive: a clip is never
/// rendered with silent video *and* a missing audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipStrategy {
    /// Looped still frame over synthesized silence.
    StillSilent,
    /// Looped still frame over the attached track.
    StillAttached,
    /// Trimmed video over synthesized silence.
    MutedSilent,
    /// Trimmed video over the attached track only.
    MutedAttached,
    /// Trimmed video keeping its own audio.
    NativeAudio,
    /// Trimmed video with its own audio mixed against the attached
    /// track.
    MixedAudio,
}

impl ClipStrategy {
    pub fn for_item(item: &MediaItem) -> Self {
        match (item.is_image, item.mute, item.has_attached_audio()) {
            (true, _, false) => ClipStrategy::StillSilent,
            (true, _, true) => ClipStrategy::StillAttached,
            (false, true, false) => ClipStrategy::MutedSilent,
            (false, true, true) => ClipStrategy::MutedAttached,
            (false, false, false) => ClipStrategy::NativeAudio,
            (false, false, true) => ClipStrategy::MixedAudio,
        }
    }

    /// Whether this strategy consumes the item's attached audio track.
    pub fn uses_attached_audio(self) -> bool {
        matches!(
            self,
            ClipStrategy::StillAttached | ClipStrategy::MutedAttached | ClipStrategy::MixedAudio
        )
    }
}

/// Renders media items into normalized clips inside one request's
/// working namespace.
pub struct ClipRenderer<'a> {
    pub engine: &'a dyn TranscodeEngine,
    pub work_dir: &'a Path,
    pub resolution: Resolution,
    pub timestamp: i64,
}

impl ClipRenderer<'_> {
    /// Materialize the item's payloads, run the engine once, and return
    /// the rendered clip path. Source, attached audio, and output are
    /// all registered with the tracker.
    pub fn render(
        &self,
        item: &MediaItem,
        index: usize,
        artifacts: &mut ArtifactTracker,
    ) -> VidweaveResult<PathBuf> {
        let strategy = ClipStrategy::for_item(item);

        let input_path = self.work_dir.join(format!(
            "input_{}_{}_{}",
            self.timestamp, index, item.file_name
        ));
        let bytes = payload::decode(&item.base64_content, || format!("media item {index}"))?;
        std::fs::write(&input_path, bytes)?;
        artifacts.register(&input_path);

        let audio_path = if strategy.uses_attached_audio() {
            let path = self
                .work_dir
                .join(format!("audio_{}_{}.mp3", self.timestamp, index));
            let audio = item.audio_base64.as_deref().unwrap_or_default();
            let bytes =
                payload::decode(audio, || format!("attached audio of media item {index}"))?;
            std::fs::write(&path, bytes)?;
            artifacts.register(&path);
            Some(path)
        } else {
            None
        };

        let output = self
            .work_dir
            .join(format!("trimmed_{}_{}.mp4", self.timestamp, index));

        tracing::debug!(
            index,
            strategy = ?strategy,
            duration = item.clip_duration(),
            "Rendering clip"
        );

        let job = self.build_job(item, strategy, &input_path, audio_path.as_deref(), &output)?;
        self.engine.run(&job)?;
        artifacts.register(&output);
        Ok(output)
    }

    fn build_job(
        &self,
        item: &MediaItem,
        strategy: ClipStrategy,
        input: &Path,
        attached: Option<&Path>,
        output: &Path,
    ) -> VidweaveResult<EngineJob> {
        let duration = item.clip_duration();
        let from = format!("{}", item.from);
        let until = format!("{}", item.until);

        let mut job = match strategy {
            ClipStrategy::StillSilent => EngineJob::new(output)
                .input(input, &["-loop", "1"])
                .silence(duration)
                .map("0:v:0")
                .map("1:a:0")
                .output_arg(&["-shortest", "-r", STILL_FRAME_RATE])
                .codec(STILL_ENCODE)
                .cap(duration),

            ClipStrategy::StillAttached => {
                let mut job = EngineJob::new(output)
                    .input(input, &["-loop", "1"])
                    .input(require_attached(attached)?, &[]);
                if item.attached_volume != 1.0 {
                    job = job.audio_filter(filter::volume(item.attached_volume));
                }
                job.map("0:v:0")
                    .map("1:a:0")
                    .output_arg(&["-shortest", "-r", STILL_FRAME_RATE])
                    .codec(STILL_ENCODE)
                    .cap(duration)
            }

            ClipStrategy::MutedSilent => EngineJob::new(output)
                .input(input, &["-ss", &from, "-to", &until])
                .silence(duration)
                .map("0:v:0")
                .map("1:a:0")
                .cap(duration),

            ClipStrategy::MutedAttached => {
                let mut job = EngineJob::new(output)
                    .input(input, &["-ss", &from, "-to", &until])
                    .input(require_attached(attached)?, &[]);
                if item.attached_volume != 1.0 {
                    job = job.audio_filter(filter::volume(item.attached_volume));
                }
                job.map("0:v:0").map("1:a:0").cap(duration)
            }

            ClipStrategy::NativeAudio => {
                let mut job =
                    EngineJob::new(output).input(input, &["-ss", &from, "-to", &until]);
                if item.clip_volume != 1.0 {
                    job = job.audio_filter(filter::volume(item.clip_volume));
                }
                job.cap(duration)
            }

            ClipStrategy::MixedAudio => EngineJob::new(output)
                .input(input, &["-ss", &from, "-to", &until])
                .input(require_attached(attached)?, &[])
                .complex_filter(filter::clip_audio_mix(
                    item.clip_volume,
                    item.attached_volume,
                ))
                .map("0:v:0")
                .map(filter::MIX_OUTPUT)
                .cap(duration),
        };

        if let Some((width, height)) = self.resolution.dimensions() {
            job = job.video_filter(filter::scale(width, height));
        }
        Ok(job)
    }
}

fn require_attached(attached: Option<&Path>) -> VidweaveResult<&Path> {
    attached.ok_or_else(|| {
        VidweaveError::pipeline("attached audio path missing for an attached-audio strategy")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(is_image: bool, mute: bool, attached: bool) -> MediaItem {
        MediaItem {
            file_name: "clip.mp4".to_string(),
            is_image,
            from: 1.0,
            until: 5.0,
            base64_content: "AAAA".to_string(),
            audio_base64: attached.then(|| "BBBB".to_string()),
            mute,
            clip_volume: 1.0,
            attached_volume: 1.0,
        }
    }

    #[test]
    fn test_strategy_matrix_is_exhaustive() {
        assert_eq!(
            ClipStrategy::for_item(&item(true, false, false)),
            ClipStrategy::StillSilent
        );
        assert_eq!(
            ClipStrategy::for_item(&item(true, true, true)),
            ClipStrategy::StillAttached
        );
        assert_eq!(
            ClipStrategy::for_item(&item(false, true, false)),
            ClipStrategy::MutedSilent
        );
        assert_eq!(
            ClipStrategy::for_item(&item(false, true, true)),
            ClipStrategy::MutedAttached
        );
        assert_eq!(
            ClipStrategy::for_item(&item(false, false, false)),
            ClipStrategy::NativeAudio
        );
        assert_eq!(
            ClipStrategy::for_item(&item(false, false, true)),
            ClipStrategy::MixedAudio
        );
    }

    #[test]
    fn test_mute_is_irrelevant_for_still_images() {
        assert_eq!(
            ClipStrategy::for_item(&item(true, true, false)),
            ClipStrategy::StillSilent
        );
        assert_eq!(
            ClipStrategy::for_item(&item(true, false, true)),
            ClipStrategy::StillAttached
        );
    }

    #[test]
    fn test_attached_audio_usage_flags() {
        assert!(ClipStrategy::StillAttached.uses_attached_audio());
        assert!(ClipStrategy::MutedAttached.uses_attached_audio());
        assert!(ClipStrategy::MixedAudio.uses_attached_audio());
        assert!(!ClipStrategy::StillSilent.uses_attached_audio());
        assert!(!ClipStrategy::MutedSilent.uses_attached_audio());
        assert!(!ClipStrategy::NativeAudio.uses_attached_audio());
    }
}
