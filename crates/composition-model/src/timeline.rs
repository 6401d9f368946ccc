//! Timeline arithmetic and derived parameters.
//!
//! Pure functions only: durations, delay offsets, fade envelopes, and
//! the fixed scale presets. Everything here is computed without I/O so
//! the pipeline stages can be tested against exact values.

use serde::{Deserialize, Serialize};

use crate::request::MediaItem;

/// Output resolution selector.
///
/// Unrecognized tokens fall back to [`Resolution::Automatic`], which
/// applies no scaling and preserves source dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Resolution {
    Hd720,
    FullHd1080,
    Qhd1440,
    Uhd4k,
    #[default]
    Automatic,
}

impl Resolution {
    pub fn parse(token: &str) -> Self {
        match token {
            "720p" => Resolution::Hd720,
            "1080p" => Resolution::FullHd1080,
            "1440p" => Resolution::Qhd1440,
            "4k" => Resolution::Uhd4k,
            _ => Resolution::Automatic,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::FullHd1080 => "1080p",
            Resolution::Qhd1440 => "1440p",
            Resolution::Uhd4k => "4k",
            Resolution::Automatic => "automatic",
        }
    }

    /// Fixed output dimensions, or `None` for pass-through.
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            Resolution::Hd720 => Some((1280, 720)),
            Resolution::FullHd1080 => Some((1920, 1080)),
            Resolution::Qhd1440 => Some((2560, 1440)),
            Resolution::Uhd4k => Some((3840, 2160)),
            Resolution::Automatic => None,
        }
    }
}

impl From<String> for Resolution {
    fn from(token: String) -> Self {
        Resolution::parse(&token)
    }
}

impl From<Resolution> for String {
    fn from(resolution: Resolution) -> Self {
        resolution.token().to_string()
    }
}

/// Sum of every item's trim window, in seconds.
///
/// Computed once per request and reused by every stage that pads or
/// truncates audio to fit the visual timeline.
pub fn total_duration(items: &[MediaItem]) -> f64 {
    items.iter().map(MediaItem::clip_duration).sum()
}

/// Overlay opacity at time `t` for a window `[from, until)` with a fade
/// of `fade` seconds on each end.
///
/// Zero outside the window. With `fade == 0` the overlay cuts hard to
/// full opacity. Otherwise the envelope ramps 0→1 over
/// `[from, from+fade)`, holds 1 over `[from+fade, until-fade)`, and
/// ramps 1→0 over `[until-fade, until)`; it is continuous at the
/// segment boundaries whenever `fade <= (until - from) / 2`. When
/// `fade` exceeds half the window the ramps overlap and the result is
/// unspecified.
pub fn fade_alpha(t: f64, from: f64, until: f64, fade: f64) -> f64 {
    if t < from || t >= until {
        return 0.0;
    }
    if fade <= 0.0 {
        return 1.0;
    }
    if t < from + fade {
        (t - from) / fade
    } else if t < until - fade {
        1.0
    } else {
        (until - t) / fade
    }
}

/// A track's start offset converted to whole milliseconds, as consumed
/// by audio delay filters.
pub fn delay_millis(start: f64) -> i64 {
    (start * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(from: f64, until: f64) -> MediaItem {
        MediaItem {
            file_name: "clip.mp4".to_string(),
            is_image: false,
            from,
            until,
            base64_content: String::new(),
            audio_base64: None,
            mute: false,
            clip_volume: 1.0,
            attached_volume: 1.0,
        }
    }

    #[test]
    fn test_total_duration_sums_trim_windows() {
        let items = vec![item(0.0, 4.0), item(2.0, 8.0), item(1.5, 2.0)];
        assert!((total_duration(&items) - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_presets() {
        assert_eq!(Resolution::parse("720p").dimensions(), Some((1280, 720)));
        assert_eq!(Resolution::parse("1080p").dimensions(), Some((1920, 1080)));
        assert_eq!(Resolution::parse("1440p").dimensions(), Some((2560, 1440)));
        assert_eq!(Resolution::parse("4k").dimensions(), Some((3840, 2160)));
    }

    #[test]
    fn test_unknown_resolution_is_pass_through() {
        assert_eq!(Resolution::parse("automatic"), Resolution::Automatic);
        assert_eq!(Resolution::parse("8k"), Resolution::Automatic);
        assert_eq!(Resolution::parse(""), Resolution::Automatic);
        assert_eq!(Resolution::Automatic.dimensions(), None);
    }

    #[test]
    fn test_fade_alpha_hard_cut() {
        assert_eq!(fade_alpha(1.9, 2.0, 8.0, 0.0), 0.0);
        assert_eq!(fade_alpha(2.0, 2.0, 8.0, 0.0), 1.0);
        assert_eq!(fade_alpha(5.0, 2.0, 8.0, 0.0), 1.0);
        assert_eq!(fade_alpha(8.0, 2.0, 8.0, 0.0), 0.0);
    }

    #[test]
    fn test_fade_alpha_envelope_segments() {
        // from=2, until=8, fade=1: ramp 2→3, hold 3→7, ramp 7→8.
        assert_eq!(fade_alpha(2.0, 2.0, 8.0, 1.0), 0.0);
        assert!((fade_alpha(2.5, 2.0, 8.0, 1.0) - 0.5).abs() < 1e-9);
        assert!((fade_alpha(3.0, 2.0, 8.0, 1.0) - 1.0).abs() < 1e-9);
        assert_eq!(fade_alpha(5.0, 2.0, 8.0, 1.0), 1.0);
        assert!((fade_alpha(7.5, 2.0, 8.0, 1.0) - 0.5).abs() < 1e-9);
        assert!(fade_alpha(7.999, 2.0, 8.0, 1.0) < 0.01);
        assert_eq!(fade_alpha(8.0, 2.0, 8.0, 1.0), 0.0);
    }

    #[test]
    fn test_fade_alpha_continuous_at_segment_boundaries() {
        let (from, until, fade) = (1.0, 9.0, 2.0);
        for boundary in [from + fade, until - fade] {
            let before = fade_alpha(boundary - 1e-7, from, until, fade);
            let after = fade_alpha(boundary + 1e-7, from, until, fade);
            assert!((before - after).abs() < 1e-5);
        }
    }

    #[test]
    fn test_delay_millis_rounds() {
        assert_eq!(delay_millis(0.0), 0);
        assert_eq!(delay_millis(5.0), 5000);
        assert_eq!(delay_millis(1.2345), 1235);
        assert_eq!(delay_millis(0.0004), 0);
    }

    proptest! {
        #[test]
        fn prop_fade_alpha_bounded_and_zero_outside(
            from in 0.0f64..100.0,
            window in 0.1f64..50.0,
            fade_frac in 0.0f64..0.5,
            t in -10.0f64..200.0,
        ) {
            let until = from + window;
            let fade = window * fade_frac;
            let alpha = fade_alpha(t, from, until, fade);
            prop_assert!((0.0..=1.0).contains(&alpha));
            if t < from || t >= until {
                prop_assert_eq!(alpha, 0.0);
            }
        }
    }
}
