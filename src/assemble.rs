//! Reassembling annotated frames into an output container.
//!
//! Codec selection is data-driven: each container extension maps to an
//! ordered chain of [`CodecProfile`]s, tried in sequence until one opens.
//! Adding a future format (say AV1 for WebM) is a table change, not new
//! branching. If no profile opens, assembly fails and no partial output
//! file is left behind.
//!
//! # Example
//!
//! ```no_run
//! use image::RgbImage;
//! use sideline::assemble::{AssembleOptions, assemble_video};
//!
//! let frames = vec![RgbImage::new(320, 240); 30];
//! assemble_video(&frames, "out.webm", &AssembleOptions::new(30.0))?;
//! # Ok::<(), sideline::SidelineError>(())
//! ```

use std::path::Path;

use ffmpeg_next::{
    Packet, Rational,
    codec::{Id, context::Context as CodecContext},
    format::{Flags as FormatFlags, Pixel},
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::SidelineError;

/// One encoder candidate in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecProfile {
    /// FFmpeg codec identifier.
    pub id: Id,
    /// Human-readable name, used in logs and errors.
    pub name: &'static str,
}

/// VP8 first for WebM; some FFmpeg builds ship it without VP9.
const WEBM_PROFILES: [CodecProfile; 2] = [
    CodecProfile { id: Id::VP8, name: "vp8" },
    CodecProfile { id: Id::VP9, name: "vp9" },
];

/// H.264 with a plain MPEG-4 fallback for everything else.
const DEFAULT_PROFILES: [CodecProfile; 2] = [
    CodecProfile { id: Id::H264, name: "h264" },
    CodecProfile { id: Id::MPEG4, name: "mpeg4" },
];

/// The codec fallback chain for a container extension.
pub fn profiles_for_container(extension: &str) -> &'static [CodecProfile] {
    match extension {
        "webm" => &WEBM_PROFILES,
        _ => &DEFAULT_PROFILES,
    }
}

/// Encoder settings for reassembly.
#[derive(Debug, Clone)]
#[must_use]
pub struct AssembleOptions {
    /// Output frames per second. Fractional rates (29.97) are preserved.
    pub fps: f64,
    /// Target bitrate in bits per second.
    pub bitrate: usize,
}

impl AssembleOptions {
    /// Options for the given frame rate, with a 2 Mbps default bitrate.
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            bitrate: 2_000_000,
        }
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = bitrate;
        self
    }
}

/// Encode frames into the container implied by the output extension.
///
/// Empty input is a no-op: nothing is written and no error is raised.
/// Frames are written in input order; all frames must share the first
/// frame's dimensions.
///
/// # Errors
///
/// - [`SidelineError::CodecUnavailable`] if no profile in the chain opens.
/// - [`SidelineError::Encode`] for failures after an encoder opened.
///
/// No output file exists after an error.
pub fn assemble_video<P: AsRef<Path>>(
    frames: &[RgbImage],
    path: P,
    options: &AssembleOptions,
) -> Result<(), SidelineError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    assemble_with_profiles(frames, path, options, profiles_for_container(&extension))
}

/// Encode frames, trying each profile in order; the first that opens wins.
pub fn assemble_with_profiles(
    frames: &[RgbImage],
    path: &Path,
    options: &AssembleOptions,
    profiles: &[CodecProfile],
) -> Result<(), SidelineError> {
    if frames.is_empty() {
        log::warn!("No frames to assemble; skipping {path:?}");
        return Ok(());
    }
    if options.fps <= 0.0 {
        return Err(SidelineError::Encode(format!(
            "invalid frame rate {}",
            options.fps
        )));
    }

    let width = frames[0].width();
    let height = frames[0].height();
    for (index, frame) in frames.iter().enumerate() {
        if frame.width() != width || frame.height() != height {
            return Err(SidelineError::Encode(format!(
                "frame {index} is {}x{}, expected {width}x{height}",
                frame.width(),
                frame.height(),
            )));
        }
    }

    ffmpeg_next::init()?;

    for profile in profiles {
        match write_with_profile(frames, path, options, *profile) {
            Ok(()) => {
                log::info!(
                    "Wrote {} frames to {:?} ({} @ {:.3} fps)",
                    frames.len(),
                    path,
                    profile.name,
                    options.fps,
                );
                return Ok(());
            }
            Err(error) => {
                log::warn!("Codec '{}' failed for {path:?}: {error}", profile.name);
                // The format context may already have created the file.
                let _ = std::fs::remove_file(path);
            }
        }
    }

    Err(SidelineError::CodecUnavailable {
        container: path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("?")
            .to_string(),
        tried: profiles
            .iter()
            .map(|profile| profile.name)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// One full encode attempt with a single codec.
fn write_with_profile(
    frames: &[RgbImage],
    path: &Path,
    options: &AssembleOptions,
    profile: CodecProfile,
) -> Result<(), SidelineError> {
    let width = frames[0].width();
    let height = frames[0].height();

    let rate = Rational::new((options.fps * 1000.0).round() as i32, 1000);
    let time_base = Rational::new(rate.denominator(), rate.numerator());

    let mut output = ffmpeg_next::format::output(&path)
        .map_err(|error| SidelineError::Encode(format!("cannot open output: {error}")))?;

    // Checked before add_stream to avoid a borrow conflict.
    let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

    let encoder_codec = ffmpeg_next::encoder::find(profile.id).ok_or_else(|| {
        SidelineError::Encode(format!("encoder '{}' not available", profile.name))
    })?;

    let mut stream = output
        .add_stream(encoder_codec)
        .map_err(|error| SidelineError::Encode(format!("cannot add stream: {error}")))?;
    let stream_index = stream.index();

    let mut encoder = CodecContext::from_parameters(stream.parameters())
        .map_err(|error| SidelineError::Encode(format!("cannot create codec context: {error}")))?
        .encoder()
        .video()
        .map_err(|error| SidelineError::Encode(format!("cannot create video encoder: {error}")))?;

    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(Pixel::YUV420P);
    encoder.set_time_base(time_base);
    encoder.set_frame_rate(Some(rate));
    encoder.set_bit_rate(options.bitrate);

    if needs_global_header {
        unsafe {
            (*encoder.as_mut_ptr()).flags |= ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
        }
    }

    let mut opened = encoder
        .open_as(encoder_codec)
        .map_err(|error| SidelineError::Encode(format!("cannot open encoder: {error}")))?;

    stream.set_parameters(&opened);

    output
        .write_header()
        .map_err(|error| SidelineError::Encode(format!("cannot write header: {error}")))?;

    let mut scaler = ScalingContext::get(
        Pixel::RGB24,
        width,
        height,
        Pixel::YUV420P,
        width,
        height,
        ScalingFlags::BILINEAR,
    )
    .map_err(|error| SidelineError::Encode(format!("cannot create scaler: {error}")))?;

    let stream_time_base = output
        .stream(stream_index)
        .map(|stream| stream.time_base())
        .unwrap_or(time_base);

    for (index, frame) in frames.iter().enumerate() {
        // Copy the packed RGB rows into an FFmpeg frame, honoring stride.
        let mut rgb_frame = VideoFrame::new(Pixel::RGB24, width, height);
        let stride = rgb_frame.stride(0);
        let row_len = (width as usize) * 3;
        let source = frame.as_raw();
        let destination = rgb_frame.data_mut(0);
        for row in 0..height as usize {
            destination[row * stride..row * stride + row_len]
                .copy_from_slice(&source[row * row_len..(row + 1) * row_len]);
        }

        let mut yuv_frame = VideoFrame::empty();
        scaler
            .run(&rgb_frame, &mut yuv_frame)
            .map_err(|error| SidelineError::Encode(format!("scaling failed: {error}")))?;
        yuv_frame.set_pts(Some(index as i64));

        opened
            .send_frame(&yuv_frame)
            .map_err(|error| SidelineError::Encode(format!("send_frame failed: {error}")))?;

        let mut packet = Packet::empty();
        while opened.receive_packet(&mut packet).is_ok() {
            packet.set_stream(stream_index);
            packet.rescale_ts(time_base, stream_time_base);
            packet
                .write_interleaved(&mut output)
                .map_err(|error| SidelineError::Encode(format!("write packet failed: {error}")))?;
        }
    }

    // Flush the encoder and finalize the container.
    opened
        .send_eof()
        .map_err(|error| SidelineError::Encode(format!("send_eof failed: {error}")))?;

    let mut packet = Packet::empty();
    while opened.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(time_base, stream_time_base);
        packet
            .write_interleaved(&mut output)
            .map_err(|error| SidelineError::Encode(format!("write flush packet failed: {error}")))?;
    }

    output
        .write_trailer()
        .map_err(|error| SidelineError::Encode(format!("cannot write trailer: {error}")))?;

    Ok(())
}
