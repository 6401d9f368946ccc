//! Transcoding engine contract and the ffmpeg implementation.
//!
//! The pipeline never interprets codec or filter syntax itself; it
//! submits [`EngineJob`]s — ordered inputs, filter expressions, stream
//! mappings, one output — to a [`TranscodeEngine`] and observes
//! success or failure. Tests substitute a recording mock for the real
//! engine.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use vidweave_common::error::{VidweaveError, VidweaveResult};

/// Synthetic source producing stereo silence at 44.1 kHz.
pub const SILENCE_SOURCE: &str = "anullsrc=channel_layout=stereo:sample_rate=44100";

/// One labeled input to an engine invocation.
#[derive(Debug, Clone)]
pub enum EngineInput {
    /// A file on disk, with flags applied ahead of it (seek, trim,
    /// loop, demuxer selection).
    File {
        path: PathBuf,
        pre_args: Vec<String>,
    },
    /// Synthesized stereo silence for `seconds`.
    Silence { seconds: f64 },
}

/// Filter expressions attached to an invocation, by graph kind.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    /// Simple video filtergraph (`-vf`).
    pub video: Option<String>,
    /// Simple audio filtergraph (`-filter:a`).
    pub audio: Option<String>,
    /// Complex filtergraph over labeled streams (`-filter_complex`).
    pub complex: Option<String>,
}

/// A single engine invocation: inputs, filters, stream mapping, codec
/// flags, an optional duration cap, and exactly one output file.
#[derive(Debug, Clone)]
pub struct EngineJob {
    pub inputs: Vec<EngineInput>,
    pub filters: Filters,
    /// Explicit output stream selections (`-map` operands).
    pub maps: Vec<String>,
    /// Codec and stream-copy flags, in argv form.
    pub codec_args: Vec<String>,
    /// Remaining output-side flags (frame rate, `-shortest`, output
    /// seeks).
    pub output_args: Vec<String>,
    /// Hard cap on output duration in seconds.
    pub duration_cap: Option<f64>,
    pub output: PathBuf,
}

impl EngineJob {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: Vec::new(),
            filters: Filters::default(),
            maps: Vec::new(),
            codec_args: Vec::new(),
            output_args: Vec::new(),
            duration_cap: None,
            output: output.into(),
        }
    }

    pub fn input(mut self, path: impl Into<PathBuf>, pre_args: &[&str]) -> Self {
        self.inputs.push(EngineInput::File {
            path: path.into(),
            pre_args: pre_args.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn silence(mut self, seconds: f64) -> Self {
        self.inputs.push(EngineInput::Silence { seconds });
        self
    }

    pub fn video_filter(mut self, expr: impl Into<String>) -> Self {
        self.filters.video = Some(expr.into());
        self
    }

    pub fn audio_filter(mut self, expr: impl Into<String>) -> Self {
        self.filters.audio = Some(expr.into());
        self
    }

    pub fn complex_filter(mut self, expr: impl Into<String>) -> Self {
        self.filters.complex = Some(expr.into());
        self
    }

    pub fn map(mut self, selection: impl Into<String>) -> Self {
        self.maps.push(selection.into());
        self
    }

    pub fn codec(mut self, args: &[&str]) -> Self {
        self.codec_args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn output_arg(mut self, args: &[&str]) -> Self {
        self.output_args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn cap(mut self, seconds: f64) -> Self {
        self.duration_cap = Some(seconds);
        self
    }

    /// Serialize to an ffmpeg argv.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-hide_banner", "-loglevel", "error"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        for input in &self.inputs {
            match input {
                EngineInput::File { path, pre_args } => {
                    args.extend(pre_args.iter().cloned());
                    args.push("-i".to_string());
                    args.push(path.display().to_string());
                }
                EngineInput::Silence { seconds } => {
                    args.push("-f".to_string());
                    args.push("lavfi".to_string());
                    args.push("-t".to_string());
                    args.push(format!("{seconds}"));
                    args.push("-i".to_string());
                    args.push(SILENCE_SOURCE.to_string());
                }
            }
        }

        if let Some(complex) = &self.filters.complex {
            args.push("-filter_complex".to_string());
            args.push(complex.clone());
        }
        if let Some(video) = &self.filters.video {
            args.push("-vf".to_string());
            args.push(video.clone());
        }
        if let Some(audio) = &self.filters.audio {
            args.push("-filter:a".to_string());
            args.push(audio.clone());
        }

        for selection in &self.maps {
            args.push("-map".to_string());
            args.push(selection.clone());
        }

        args.extend(self.codec_args.iter().cloned());
        args.extend(self.output_args.iter().cloned());

        if let Some(cap) = self.duration_cap {
            args.push("-t".to_string());
            args.push(format!("{cap}"));
        }

        args.push(self.output.display().to_string());
        args
    }
}

/// The external decoding/encoding/filtering engine, addressed as a
/// command-based black box.
///
/// `run` blocks until the engine process exits; the engine alone
/// interprets codec and filter syntax. Object-safe so tests can swap
/// in a mock.
pub trait TranscodeEngine: Send + Sync {
    /// Run one invocation to completion.
    fn run(&self, job: &EngineJob) -> VidweaveResult<()>;

    /// Check if this engine is available on the system.
    fn is_available(&self) -> bool;

    /// Engine name.
    fn name(&self) -> &str;
}

/// ffmpeg driven as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    binary: String,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscodeEngine for FfmpegEngine {
    fn run(&self, job: &EngineJob) -> VidweaveResult<()> {
        let args = job.to_args();
        tracing::debug!(args = ?args, "Running engine");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                VidweaveError::engine(format!("Failed to start {}: {e}", self.binary))
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| VidweaveError::engine("Failed to capture engine stderr"))?;

        // Drain stderr concurrently so the engine never blocks on a full
        // pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = stderr;
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read engine stderr: {err}>"),
            }
        });

        let status = child
            .wait()
            .map_err(|e| VidweaveError::engine(format!("Failed to wait on engine: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(VidweaveError::engine(format!(
                "{} failed (status {}): {}",
                self.binary,
                status,
                stderr_output.trim()
            )));
        }

        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists(&self.binary)
    }

    fn name(&self) -> &str {
        &self.binary
    }
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_args_prologue_and_output() {
        let args = EngineJob::new("/work/out.mp4").to_args();
        assert_eq!(&args[..4], &["-y", "-hide_banner", "-loglevel", "error"]);
        assert_eq!(args.last().unwrap(), "/work/out.mp4");
    }

    #[test]
    fn test_job_args_inputs_in_order() {
        let args = EngineJob::new("out.mp4")
            .input("clip.mp4", &["-ss", "1.5", "-to", "6.5"])
            .silence(5.0)
            .to_args();
        let joined = args.join(" ");
        assert!(joined.contains("-ss 1.5 -to 6.5 -i clip.mp4"));
        assert!(joined.contains(&format!("-f lavfi -t 5 -i {SILENCE_SOURCE}")));
        let file = joined.find("clip.mp4").unwrap();
        let silence = joined.find("lavfi").unwrap();
        assert!(file < silence);
    }

    #[test]
    fn test_job_args_filters_maps_and_cap() {
        let args = EngineJob::new("out.mp4")
            .input("in.mp4", &[])
            .complex_filter("[0:a][1:a]amix=inputs=2:duration=first[aout]")
            .video_filter("scale=1280:720")
            .map("0:v:0")
            .map("[aout]")
            .codec(&["-c:v", "copy", "-c:a", "aac"])
            .cap(10.0)
            .to_args();
        let joined = args.join(" ");
        assert!(joined.contains("-filter_complex [0:a][1:a]amix=inputs=2:duration=first[aout]"));
        assert!(joined.contains("-vf scale=1280:720"));
        assert!(joined.contains("-map 0:v:0 -map [aout]"));
        assert!(joined.contains("-c:v copy -c:a aac"));
        assert!(joined.ends_with("-t 10 out.mp4"));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = FfmpegEngine::with_binary("definitely-not-a-real-engine-binary");
        assert!(!engine.is_available());
    }
}
