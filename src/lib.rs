//! # sideline
//!
//! AI-assisted sports video annotation — sample frames, detect subjects
//! with a vision backend, and rebuild annotated footage.
//!
//! `sideline` takes a clip, decodes it with FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, sends every
//! Nth frame to a vision backend for bounding-box detection, interpolates
//! the boxes across the frames in between, overlays them, and re-encodes a
//! full-length annotated video. A separate whole-clip "strategic" analysis
//! drives a single annotated key-frame still with coaching advice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sideline::{DirectoryStore, GeminiAnalyzer, Pipeline};
//!
//! # async fn example() -> Result<(), sideline::SidelineError> {
//! let analyzer = GeminiAnalyzer::from_env()?;
//! let store = DirectoryStore::new("./blobs")?;
//!
//! let report = Pipeline::new(analyzer, store)
//!     .process("uploads/match.mp4")
//!     .await?;
//!
//! println!("annotated video: {}", report.processed_video);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pieces
//!
//! - **Decode & sample** ([`media`], [`sampler`]) — every frame decoded to
//!   RGB8, every Nth frame JPEG-encoded for analysis.
//! - **Tolerant parsing** ([`detection`]) — the backend's fenced,
//!   occasionally malformed JSON degrades to empty detection sets, never
//!   aborts a run.
//! - **Concurrent fan-out** ([`fanout`]) — one request per sampled frame,
//!   ordered join, capped per run.
//! - **Interpolation** ([`interpolate`]) — positional (index-paired) box
//!   interpolation between samples, with a deliberate lead-forward /
//!   no-lead-back asymmetry.
//! - **Annotation** ([`annotate`]) — normalized 0-1000 boxes converted to
//!   pixel space and drawn with labels.
//! - **Reassembly** ([`assemble`]) — codec fallback chains per container
//!   (VP8→VP9 for WebM, H.264→MPEG-4 otherwise).
//! - **Key frame** ([`keyframe`], [`strategic`]) — an independent
//!   seek-and-annotate path driven by the strategic analysis.
//! - **Collaborators** ([`analyzer`], [`storage`]) — the vision backend and
//!   blob store behind async traits, with Gemini and local-directory
//!   implementations in the box.
//!
//! Detection order is a positional correspondence key, not an identity:
//! when the backend reorders subjects between two samples, their boxes
//! visibly swap. That is an inherited, documented limitation — see
//! [`interpolate`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system; see the
//! `ffmpeg-next` documentation for platform specifics.

pub mod analyzer;
pub mod annotate;
pub mod assemble;
pub mod detection;
pub mod error;
pub mod fanout;
pub mod ffmpeg;
pub mod interpolate;
pub mod keyframe;
pub mod media;
pub mod pipeline;
pub mod sampler;
pub mod storage;
pub mod strategic;
mod utilities;

pub use analyzer::{GeminiAnalyzer, VisionAnalyzer};
pub use annotate::{ADVICE_STYLE, BoxStyle, DETECTION_STYLE, draw_labeled_box};
pub use assemble::{AssembleOptions, CodecProfile, assemble_video, profiles_for_container};
pub use detection::{Detection, NormalizedBox, ParseOutcome, parse_detections, strip_code_fence};
pub use error::SidelineError;
pub use fanout::{DEFAULT_ANALYSIS_CAP, analyze_frames};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use interpolate::boxes_for_frame;
pub use keyframe::annotate_key_frame;
pub use media::{ClipMetadata, SourceVideo};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use sampler::{FrameSequence, decode_frames, jpeg_payloads, sampled_indices};
pub use storage::{BlobStore, DirectoryStore};
pub use strategic::{KeyFrameAdvice, StrategicReport, parse_strategic};
