//! Vidweave Render Pipeline
//!
//! The composition pipeline: turns a declarative request into one
//! rendered video by driving an external transcoding engine through a
//! fixed sequence of stages.
//!
//! # Pipeline Architecture
//!
//! ```text
//! media items ──► Clip Renderer (per item, in order)
//!                        │
//!                        ▼
//!                  Concatenator (stream copy)
//!                        │
//!                        ▼
//! overlays ──────► Overlay Compositor (skipped when empty)
//!                        │
//!                        ▼
//! background ────► Background Audio Mixer (silent bed when absent)
//!                        │
//!                        ▼
//!                 Temp Artifact Cleanup
//!                        │
//!                        ▼
//!                 final_with_bg_audio_{ts}.mp4
//! ```

pub mod artifacts;
pub mod audio;
pub mod clip;
pub mod concat;
pub mod engine;
pub mod filter;
pub mod overlay;
pub mod pipeline;

mod payload;

pub use pipeline::{render_composition, CompositionPipeline};
