//! Stream-copy concatenation of rendered clips.

use std::path::{Path, PathBuf};

use vidweave_common::error::VidweaveResult;

use crate::artifacts::ArtifactTracker;
use crate::engine::{EngineJob, TranscodeEngine};

/// Join the rendered clips into one continuous video, in order, with
/// hard cuts and no re-encode.
///
/// Clips are pre-normalized to the same codec and container by the
/// renderer, so both streams are copied straight through; the output
/// duration is the exact sum of the inputs.
pub fn concatenate(
    engine: &dyn TranscodeEngine,
    work_dir: &Path,
    timestamp: i64,
    clips: &[PathBuf],
    artifacts: &mut ArtifactTracker,
) -> VidweaveResult<PathBuf> {
    let manifest = work_dir.join(format!("concat_list_{timestamp}.txt"));
    let listing = clips
        .iter()
        .map(|clip| format!("file '{}'", clip.display().to_string().replace('\\', "/")))
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(&manifest, listing)?;
    artifacts.register(&manifest);

    let output = work_dir.join(format!("concatenated_{timestamp}.mp4"));
    let job = EngineJob::new(&output)
        .input(&manifest, &["-f", "concat", "-safe", "0"])
        .codec(&["-c", "copy"]);

    tracing::debug!(clips = clips.len(), "Concatenating clips");
    engine.run(&job)?;
    artifacts.register(&output);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_lines_are_ordered_and_quoted() {
        let clips = vec![
            PathBuf::from("/work/trimmed_7_0.mp4"),
            PathBuf::from("/work/trimmed_7_1.mp4"),
        ];
        let listing = clips
            .iter()
            .map(|clip| format!("file '{}'", clip.display().to_string().replace('\\', "/")))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(
            listing,
            "file '/work/trimmed_7_0.mp4'\nfile '/work/trimmed_7_1.mp4'"
        );
    }
}
