//! Error types for the `sideline` crate.
//!
//! This module defines [`SidelineError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context to
//! diagnose a failure without extra logging at the call site.
//!
//! Malformed analysis-backend output is deliberately *not* represented here:
//! per-frame parsing degrades to an empty detection set (see
//! [`ParseOutcome`](crate::detection::ParseOutcome)) and never aborts a run.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `sideline` operations.
///
/// Every public method that can fail returns `Result<T, SidelineError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SidelineError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::SourceVideo::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// Video encoding failed after an encoder was opened.
    #[error("Video encoding failed: {0}")]
    Encode(String),

    /// No codec profile in the fallback chain could be opened.
    #[error("No encoder available for '{container}' output (tried {tried})")]
    CodecUnavailable {
        /// Target container extension.
        container: String,
        /// Names of the profiles that were attempted.
        tried: String,
    },

    /// A request to the external analysis backend failed.
    ///
    /// Fatal to the whole analysis batch; the caller decides whether to
    /// retry the batch.
    #[error("Analysis backend request failed: {0}")]
    Analysis(String),

    /// The requested timestamp lies outside the video.
    #[error("Timestamp {seconds}s is beyond the video (frame {frame} of {total})")]
    InvalidTimestamp {
        /// The requested timestamp in seconds.
        seconds: f64,
        /// The frame index the timestamp maps to.
        frame: u64,
        /// Total frames in the video.
        total: u64,
    },

    /// A sample interval of zero was provided.
    #[error("Sample interval must be greater than zero")]
    InvalidSampleRate,

    /// A blob-store operation failed.
    #[error("Storage operation failed for '{name}': {reason}")]
    Storage {
        /// The blob name involved.
        name: String,
        /// Underlying reason.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion or saving.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// A background decode/encode task panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<FfmpegError> for SidelineError {
    fn from(error: FfmpegError) -> Self {
        SidelineError::Ffmpeg(error.to_string())
    }
}
