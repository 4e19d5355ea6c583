//! Opening source footage.
//!
//! [`SourceVideo`] owns the demuxer context for one input file and caches
//! the video-stream metadata the pipeline needs: dimensions, frame rate,
//! and an estimated frame count. It is the entry point for both the bulk
//! decode path ([`decode_frames`](crate::sampler::decode_frames)) and the
//! single key-frame path ([`crate::keyframe`]).
//!
//! # Example
//!
//! ```no_run
//! use sideline::SourceVideo;
//!
//! let source = SourceVideo::open("match.mp4")?;
//! let meta = source.metadata();
//! println!("{}x{} @ {:.2} fps", meta.width, meta.height, meta.fps);
//! # Ok::<(), sideline::SidelineError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::error::SidelineError;

/// Cached properties of the video stream, extracted once at open time.
#[derive(Debug, Clone)]
pub struct ClipMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second, derived from the stream's average frame rate.
    pub fps: f64,
    /// Estimated total frame count (duration x fps; 0 when unknown).
    pub frame_count: u64,
    /// Container-level duration.
    pub duration: Duration,
    /// Name of the video codec (e.g. "h264").
    pub codec: String,
}

/// An opened video file.
///
/// Holds the FFmpeg demuxer context and the cached [`ClipMetadata`]. The
/// decoder handles created from it are owned by the operation that opens
/// them and released when that operation returns, on success or error.
pub struct SourceVideo {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input: Input,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: ClipMetadata,
    /// Index of the best video stream.
    pub(crate) stream_index: usize,
    /// Path to the opened file (kept for error messages).
    pub(crate) path: PathBuf,
}

impl Debug for SourceVideo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SourceVideo")
            .field("metadata", &self.metadata)
            .field("stream_index", &self.stream_index)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SourceVideo {
    /// Open a video file for processing.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, locates the
    /// best video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`SidelineError::FileOpen`] if the container cannot be opened.
    /// - [`SidelineError::NoVideoStream`] if the file carries no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SidelineError> {
        let path = path.as_ref();
        let owned_path = path.to_path_buf();

        ffmpeg_next::init().map_err(|error| SidelineError::FileOpen {
            path: owned_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| SidelineError::FileOpen {
            path: owned_path.clone(),
            reason: error.to_string(),
        })?;

        let stream_index = input
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(SidelineError::NoVideoStream)?;

        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let stream = input.stream(stream_index).ok_or(SidelineError::NoVideoStream)?;
        let decoder_context =
            CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                SidelineError::FileOpen {
                    path: owned_path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| SidelineError::FileOpen {
                path: owned_path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        // Average frame rate, falling back to the raw rate field for
        // containers that do not record an average.
        let average = stream.avg_frame_rate();
        let fps = if average.denominator() != 0 {
            average.numerator() as f64 / average.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = if fps > 0.0 {
            (duration.as_secs_f64() * fps) as u64
        } else {
            0
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = ClipMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            frame_count,
            duration,
            codec,
        };

        log::debug!(
            "Opened {:?}: {}x{} @ {:.3} fps, ~{} frames ({})",
            owned_path,
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input,
            metadata,
            stream_index,
            path: owned_path,
        })
    }

    /// Get a reference to the cached metadata.
    ///
    /// Extracted once during [`open`](SourceVideo::open); no additional
    /// decoding is performed.
    pub fn metadata(&self) -> &ClipMetadata {
        &self.metadata
    }
}
