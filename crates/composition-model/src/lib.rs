//! Vidweave Composition Model
//!
//! The declarative description of a composite video: media items with
//! trim windows and audio configuration, text overlays with fade
//! envelopes, background audio tracks, and the timeline arithmetic
//! derived from them. No I/O happens in this crate.

pub mod request;
pub mod timeline;

pub use request::{BackgroundAudioItem, CompositionRequest, MediaItem, TextOverlay};
pub use timeline::{delay_millis, fade_alpha, total_duration, Resolution};
