//! FFmpeg native log control.
//!
//! FFmpeg has its own logging system, separate from the Rust [`log`] facade.
//! By default it prints warnings to stderr, which is noisy when decoding
//! user-supplied sports footage. This wrapper lets callers tune that output
//! without importing `ffmpeg-next` directly.
//!
//! Rust-side diagnostics from this crate go through [`log`] as usual.

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// No native output at all.
    Quiet,
    /// Unrecoverable errors only.
    Fatal,
    /// Recoverable errors.
    #[default]
    Error,
    /// Warnings (FFmpeg's own default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Debug => Level::Debug,
        }
    }
}

/// Set the verbosity of FFmpeg's native stderr output.
///
/// Affects the whole process. Safe to call before or after any
/// [`SourceVideo::open`](crate::SourceVideo::open).
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
