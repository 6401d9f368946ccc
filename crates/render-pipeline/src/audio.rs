//! Background audio preparation and the final merge.
//!
//! Background tracks are independently timed and may not cover the
//! composition, so two normalization stages run before the merge: each
//! track is trimmed, shifted, and gained on its own, then the combined
//! bed is padded against a silence bed of the full composition
//! duration. The merge itself is uniform — a request without
//! background audio feeds a synthesized silent bed through the same
//! path.

use std::path::{Path, PathBuf};

use vidweave_common::error::VidweaveResult;
use vidweave_composition_model::{delay_millis, BackgroundAudioItem};

use crate::artifacts::ArtifactTracker;
use crate::engine::{EngineJob, TranscodeEngine};
use crate::filter::{self, MixDuration};
use crate::payload;

/// Re-encode settings for intermediate audio artifacts.
const MP3_ENCODE: &[&str] = &["-c:a", "libmp3lame", "-q:a", "4"];

/// Re-encode settings for the multi-track background mix.
const MIX_ENCODE: &[&str] = &[
    "-c:a",
    "libmp3lame",
    "-ar",
    "44100",
    "-ac",
    "2",
    "-b:a",
    "192k",
];

/// Codec choice for the final merge: video copied, audio re-encoded.
const MERGE_ENCODE: &[&str] = &["-c:v", "copy", "-c:a", "aac"];

/// Turn the request's background tracks into one mixed track.
///
/// Per track: extract `[from, from+duration)` with a stream copy, then
/// front-pad by the track's start offset and apply its gain. Multiple
/// tracks are mixed under a duration=longest policy, so shorter tracks
/// end in silence instead of being stretched; a single track is used
/// directly.
pub fn prepare_background_tracks(
    engine: &dyn TranscodeEngine,
    work_dir: &Path,
    timestamp: i64,
    items: &[BackgroundAudioItem],
    artifacts: &mut ArtifactTracker,
) -> VidweaveResult<PathBuf> {
    let mut shifted_tracks = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let input_path = work_dir.join(format!(
            "input_bg_audio_{}_{}_{}",
            timestamp, index, item.file_name
        ));
        let bytes = payload::decode(&item.base64_content, || {
            format!("background track {index}")
        })?;
        std::fs::write(&input_path, bytes)?;
        artifacts.register(&input_path);

        let trimmed = work_dir.join(format!("trimmed_bg_audio_{timestamp}_{index}.mp3"));
        let trim_job = EngineJob::new(&trimmed)
            .input(&input_path, &[])
            .output_arg(&[
                "-ss",
                &format!("{}", item.from),
                "-t",
                &format!("{}", item.duration),
            ])
            .codec(&["-c", "copy"]);
        engine.run(&trim_job)?;
        artifacts.register(&trimmed);

        let shifted = work_dir.join(format!("delayed_bg_audio_{timestamp}_{index}.mp3"));
        let shift_job = EngineJob::new(&shifted)
            .input(&trimmed, &[])
            .audio_filter(filter::delay_then_volume(
                delay_millis(item.start),
                item.volume,
            ))
            .codec(MP3_ENCODE);
        engine.run(&shift_job)?;
        artifacts.register(&shifted);
        shifted_tracks.push(shifted);
    }

    if shifted_tracks.len() == 1 {
        return Ok(shifted_tracks.remove(0));
    }

    let mixed = work_dir.join(format!("mixed_bg_audio_{timestamp}.mp3"));
    let mut mix_job = EngineJob::new(&mixed);
    for track in &shifted_tracks {
        mix_job = mix_job.input(track, &[]);
    }
    let mix_job = mix_job
        .complex_filter(filter::mix(shifted_tracks.len(), MixDuration::Longest))
        .map(filter::MIX_OUTPUT)
        .codec(MIX_ENCODE);

    tracing::debug!(tracks = shifted_tracks.len(), "Mixing background tracks");
    engine.run(&mix_job)?;
    artifacts.register(&mixed);
    Ok(mixed)
}

/// Synthesize a silent stereo bed of exactly `total_duration` seconds.
///
/// Used when the request carries no background audio, so the merge
/// stage runs the same path either way.
pub fn synthesize_silence_bed(
    engine: &dyn TranscodeEngine,
    work_dir: &Path,
    timestamp: i64,
    total_duration: f64,
    artifacts: &mut ArtifactTracker,
) -> VidweaveResult<PathBuf> {
    let output = work_dir.join(format!("silent_bg_audio_{timestamp}.mp3"));
    let job = EngineJob::new(&output)
        .silence(total_duration)
        .codec(MP3_ENCODE);
    engine.run(&job)?;
    artifacts.register(&output);
    Ok(output)
}

/// Pad the background bed to the full composition and merge it into
/// the visual timeline's audio.
///
/// The pad mixes the bed against silence of exactly `total_duration`
/// under duration=longest, so real content always wins over silence
/// where both exist. The merge then mixes under duration=first and
/// caps the output at `total_duration`, copying the video stream. The
/// superseded pre-merge video is deleted immediately, not deferred to
/// final cleanup.
pub fn merge_with_background(
    engine: &dyn TranscodeEngine,
    work_dir: &Path,
    timestamp: i64,
    video: &Path,
    background: &Path,
    total_duration: f64,
    artifacts: &mut ArtifactTracker,
) -> VidweaveResult<PathBuf> {
    let padded = work_dir.join(format!("padded_bg_audio_{timestamp}.mp3"));
    let pad_job = EngineJob::new(&padded)
        .input(background, &[])
        .silence(total_duration)
        .complex_filter(filter::mix_labeled_pair(MixDuration::Longest))
        .map(filter::MIX_OUTPUT)
        .codec(MP3_ENCODE);
    engine.run(&pad_job)?;
    artifacts.register(&padded);

    let output = work_dir.join(format!("final_with_bg_audio_{timestamp}.mp4"));
    let merge_job = EngineJob::new(&output)
        .input(video, &[])
        .input(&padded, &[])
        .complex_filter(filter::mix_labeled_pair(MixDuration::First))
        .map("0:v:0")
        .map(filter::MIX_OUTPUT)
        .codec(MERGE_ENCODE)
        .cap(total_duration);

    tracing::debug!(total_duration, "Merging background audio");
    engine.run(&merge_job)?;
    artifacts.register(&output);

    match std::fs::remove_file(video) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %video.display(), error = %e, "Failed to delete superseded video");
        }
    }

    Ok(output)
}
