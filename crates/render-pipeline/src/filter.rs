//! Filter-expression construction for the transcoding engine.
//!
//! Every textual filter the pipeline submits is assembled here, so
//! escaping and parameter substitution stay in one place and can be
//! tested without spawning the engine.

use std::path::Path;

use vidweave_composition_model::TextOverlay;

/// Stream label the audio mix expressions bind their result to.
pub const MIX_OUTPUT: &str = "[aout]";

/// `amix` duration policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixDuration {
    /// Output spans the longest input; shorter inputs end in silence.
    Longest,
    /// Output ends with the shortest input.
    Shortest,
    /// Output length follows the first input.
    First,
}

impl MixDuration {
    pub fn as_str(self) -> &'static str {
        match self {
            MixDuration::Longest => "longest",
            MixDuration::Shortest => "shortest",
            MixDuration::First => "first",
        }
    }
}

/// Fixed-dimension scaling filter.
pub fn scale(width: u32, height: u32) -> String {
    format!("scale={width}:{height}")
}

/// Audio gain filter.
pub fn volume(gain: f64) -> String {
    format!("volume={gain}")
}

/// Front-pad both stereo channels by `millis`, then apply `gain`.
pub fn delay_then_volume(millis: i64, gain: f64) -> String {
    format!("adelay={millis}|{millis},volume={gain}")
}

/// Mix `inputs` unlabeled streams under the given duration policy.
pub fn mix(inputs: usize, duration: MixDuration) -> String {
    format!(
        "amix=inputs={inputs}:duration={}{MIX_OUTPUT}",
        duration.as_str()
    )
}

/// Mix the first two inputs' audio streams under the given policy.
pub fn mix_labeled_pair(duration: MixDuration) -> String {
    format!(
        "[0:a][1:a]amix=inputs=2:duration={}{MIX_OUTPUT}",
        duration.as_str()
    )
}

/// Equal-weight mix of a clip's own audio with its attached track,
/// ending at the shorter of the two.
///
/// A unity attached gain skips the second volume node, feeding the
/// attached stream into the mix untouched.
pub fn clip_audio_mix(clip_gain: f64, attached_gain: f64) -> String {
    if attached_gain != 1.0 {
        format!(
            "[0:a]volume={clip_gain}[ca];[1:a]volume={attached_gain}[aa];[ca][aa]amix=inputs=2:duration=shortest{MIX_OUTPUT}"
        )
    } else {
        format!(
            "[0:a]volume={clip_gain}[ca];[ca][1:a]amix=inputs=2:duration=shortest{MIX_OUTPUT}"
        )
    }
}

/// One `drawtext` node covering a single overlay.
#[derive(Debug, Clone)]
pub struct DrawText {
    pub text: String,
    pub font_file: String,
    pub color: String,
    pub font_size: u32,
    pub x: String,
    pub y: String,
    pub from: f64,
    pub until: f64,
    pub fade: f64,
}

impl DrawText {
    /// Build the node for an overlay, applying the centered-position and
    /// white-color defaults.
    pub fn from_overlay(overlay: &TextOverlay, font_file: &Path) -> Self {
        let (x, y) = overlay.position_exprs();
        Self {
            text: overlay.text.clone(),
            font_file: font_file.display().to_string(),
            color: overlay.color_or_default().to_string(),
            font_size: overlay.font_size,
            x,
            y,
            from: overlay.from,
            until: overlay.until,
            fade: overlay.fade,
        }
    }

    /// Serialize to the engine's `drawtext` syntax. Visibility is gated
    /// to exactly `[from, until)` and opacity follows the overlay's fade
    /// envelope.
    pub fn to_expr(&self) -> String {
        format!(
            "drawtext=text='{}':fontfile='{}':fontcolor={}:fontsize={}:x={}:y={}:enable='between(t\\,{}\\,{})':alpha='{}'",
            escape_text(&self.text),
            self.font_file,
            self.color,
            self.font_size,
            self.x,
            self.y,
            self.from,
            self.until,
            fade_alpha_expr(self.from, self.until, self.fade),
        )
    }
}

/// Chain one `drawtext` node per overlay, in input order. Later
/// overlays draw on top of earlier ones.
pub fn overlay_chain(overlays: &[TextOverlay], font_file: &Path) -> String {
    overlays
        .iter()
        .map(|overlay| DrawText::from_overlay(overlay, font_file).to_expr())
        .collect::<Vec<_>>()
        .join(",")
}

/// The three-segment piecewise-linear opacity envelope: ramp up over
/// `fade` seconds, hold, ramp down over the final `fade` seconds.
/// `fade == 0` is a hard cut (constant 1; the `enable` gate supplies
/// the cutoff).
pub fn fade_alpha_expr(from: f64, until: f64, fade: f64) -> String {
    if fade > 0.0 {
        let rise_end = from + fade;
        let fall_start = until - fade;
        format!(
            "if(lt(t\\,{rise_end}),(t-{from})/{fade},if(lt(t\\,{fall_start}),1,if(lt(t\\,{until}),({until}-t)/{fade},0)))"
        )
    } else {
        "1".to_string()
    }
}

/// Escape text for embedding in a single-quoted `drawtext` option.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("'\\''"),
            _ => escaped.push(c),
        }
    }
    escaped
}
