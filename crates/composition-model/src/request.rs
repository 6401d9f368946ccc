//! Composition request types.
//!
//! A request is the top-level unit of work: an ordered list of media
//! items, optional text overlays, optional background audio tracks, and
//! a resolution selector. Binary payloads travel as base64 strings and
//! are decoded by the pipeline when an item is materialized, not here.

use serde::{Deserialize, Serialize};

use crate::timeline::Resolution;

/// One timeline clip: a video or a still image with its trim window
/// and audio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Original file name; kept so the materialized input preserves its
    /// container extension.
    pub file_name: String,

    /// Still image instead of a video source.
    #[serde(default)]
    pub is_image: bool,

    /// Trim window start in seconds into the source.
    pub from: f64,

    /// Trim window end in seconds into the source. Must exceed `from`.
    pub until: f64,

    /// Base64-encoded source bytes.
    pub base64_content: String,

    /// Base64-encoded attached audio track, if any.
    #[serde(default)]
    pub audio_base64: Option<String>,

    /// Drop the clip's own audio track.
    #[serde(default)]
    pub mute: bool,

    /// Gain applied to the clip's own audio track.
    #[serde(default = "default_gain")]
    pub clip_volume: f64,

    /// Gain applied to the attached audio track.
    #[serde(default = "default_gain")]
    pub attached_volume: f64,
}

impl MediaItem {
    /// Trim-window length in seconds. Drives every downstream trim and
    /// pad operation for this item.
    pub fn clip_duration(&self) -> f64 {
        self.until - self.from
    }

    /// Whether a non-empty attached audio payload is present.
    pub fn has_attached_audio(&self) -> bool {
        self.audio_base64
            .as_deref()
            .is_some_and(|audio| !audio.trim().is_empty())
    }
}

/// A caption drawn over the composed timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub text: String,

    /// Visibility start, in seconds on the final composed timeline.
    pub from: f64,

    /// Visibility end, in seconds on the final composed timeline.
    pub until: f64,

    pub font_size: u32,

    /// Font color; "white" when absent.
    #[serde(default)]
    pub color: Option<String>,

    /// Seconds of fade-in and fade-out. 0 = hard cut.
    #[serde(default)]
    pub fade: f64,

    /// Two whitespace-separated x/y position expressions. Absent =
    /// screen-centered.
    #[serde(default)]
    pub position: Option<String>,
}

impl TextOverlay {
    pub fn color_or_default(&self) -> &str {
        match self.color.as_deref() {
            Some(color) if !color.trim().is_empty() => color,
            _ => "white",
        }
    }

    /// The x/y position expressions, defaulting to screen-centered.
    pub fn position_exprs(&self) -> (String, String) {
        if let Some(position) = self.position.as_deref() {
            let mut parts = position.split_whitespace();
            if let (Some(x), Some(y)) = (parts.next(), parts.next()) {
                return (x.to_string(), y.to_string());
            }
        }
        ("(w-text_w)/2".to_string(), "(h-text_h)/2".to_string())
    }
}

/// One background audio track with its own placement and trim window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundAudioItem {
    pub file_name: String,

    /// Seconds into the final timeline where this track begins playing.
    pub start: f64,

    /// Seconds into the source file where extraction begins.
    pub from: f64,

    /// Length of the extracted window in seconds.
    pub duration: f64,

    /// Base64-encoded source bytes.
    pub base64_content: String,

    /// Gain applied to this track.
    #[serde(default = "default_gain")]
    pub volume: f64,
}

/// The top-level unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    /// Ordered clips; at least one is required.
    pub media_items: Vec<MediaItem>,

    #[serde(default)]
    pub overlays: Vec<TextOverlay>,

    #[serde(default)]
    pub background_audio_items: Vec<BackgroundAudioItem>,

    #[serde(default)]
    pub resolution: Resolution,
}

impl CompositionRequest {
    /// Total composed duration: the sum of every item's trim window.
    pub fn total_duration(&self) -> f64 {
        crate::timeline::total_duration(&self.media_items)
    }
}

fn default_gain() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_defaults() {
        let json = r#"{
            "fileName": "clip.mp4",
            "from": 1.5,
            "until": 6.5,
            "base64Content": "AAAA"
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_image);
        assert!(!item.mute);
        assert!(item.audio_base64.is_none());
        assert_eq!(item.clip_volume, 1.0);
        assert_eq!(item.attached_volume, 1.0);
        assert_eq!(item.clip_duration(), 5.0);
    }

    #[test]
    fn test_blank_attached_audio_counts_as_absent() {
        let json = r#"{
            "fileName": "clip.mp4",
            "from": 0.0,
            "until": 2.0,
            "base64Content": "AAAA",
            "audioBase64": "   "
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert!(!item.has_attached_audio());
    }

    #[test]
    fn test_overlay_position_and_color_defaults() {
        let overlay = TextOverlay {
            text: "hello".to_string(),
            from: 0.0,
            until: 3.0,
            font_size: 42,
            color: None,
            fade: 0.0,
            position: None,
        };
        assert_eq!(overlay.color_or_default(), "white");
        let (x, y) = overlay.position_exprs();
        assert_eq!(x, "(w-text_w)/2");
        assert_eq!(y, "(h-text_h)/2");
    }

    #[test]
    fn test_overlay_explicit_position_splits_on_whitespace() {
        let overlay = TextOverlay {
            text: "corner".to_string(),
            from: 0.0,
            until: 3.0,
            font_size: 24,
            color: Some("red".to_string()),
            fade: 0.5,
            position: Some("10  h-text_h-10".to_string()),
        };
        let (x, y) = overlay.position_exprs();
        assert_eq!(x, "10");
        assert_eq!(y, "h-text_h-10");
    }

    #[test]
    fn test_request_round_trip_with_resolution() {
        let json = r#"{
            "mediaItems": [
                {"fileName": "a.mp4", "from": 0, "until": 4, "base64Content": "AAAA"},
                {"fileName": "b.jpg", "isImage": true, "from": 0, "until": 6, "base64Content": "BBBB"}
            ],
            "resolution": "1080p"
        }"#;
        let request: CompositionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.media_items.len(), 2);
        assert!(request.overlays.is_empty());
        assert!(request.background_audio_items.is_empty());
        assert_eq!(request.resolution, Resolution::FullHd1080);
        assert_eq!(request.total_duration(), 10.0);
    }

    #[test]
    fn test_request_resolution_defaults_to_automatic() {
        let json = r#"{"mediaItems": [{"fileName": "a.mp4", "from": 0, "until": 1, "base64Content": "AAAA"}]}"#;
        let request: CompositionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.resolution, Resolution::Automatic);
    }
}
