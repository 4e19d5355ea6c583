//! Key-frame extraction and annotation.
//!
//! The strategic pass nominates a single moment worth coaching: a timestamp,
//! an optional region, and a line of advice. This module seeks to that exact
//! frame, overlays the advice region, and writes a still image. It shares no
//! state with the bulk annotation pipeline — it re-opens the source and is
//! driven entirely by the strategic-analysis result.
//!
//! # Example
//!
//! ```no_run
//! use sideline::keyframe::annotate_key_frame;
//!
//! annotate_key_frame("match.mp4", 12.4, None, "Keep your elbow in", "advice.jpg")?;
//! # Ok::<(), sideline::SidelineError>(())
//! ```

use std::path::Path;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::{
    annotate::{ADVICE_STYLE, draw_labeled_box},
    detection::NormalizedBox,
    error::SidelineError,
    media::SourceVideo,
    utilities,
};

/// Extract the frame at `timestamp_seconds`, annotate it, and save a still.
///
/// The timestamp maps to `round(timestamp_seconds * fps)`. Without a region
/// the still is written unannotated. The output format is inferred from the
/// output path's extension.
///
/// # Errors
///
/// - [`SidelineError::InvalidTimestamp`] when the timestamp falls outside
///   the video.
/// - [`SidelineError::Decode`] when the seek lands but no frame can be read
///   (corrupt tail).
///
/// No output file exists after an error.
pub fn annotate_key_frame<P: AsRef<Path>, Q: AsRef<Path>>(
    source_path: P,
    timestamp_seconds: f64,
    region: Option<&NormalizedBox>,
    label: &str,
    output_path: Q,
) -> Result<(), SidelineError> {
    let mut source = SourceVideo::open(source_path)?;
    let fps = source.metadata.fps;
    let total = source.metadata.frame_count;

    let frame_number = (timestamp_seconds * fps).round();
    if timestamp_seconds < 0.0 || !frame_number.is_finite() || frame_number < 0.0 {
        return Err(SidelineError::InvalidTimestamp {
            seconds: timestamp_seconds,
            frame: 0,
            total,
        });
    }
    let frame_number = frame_number as u64;
    if total > 0 && frame_number >= total {
        return Err(SidelineError::InvalidTimestamp {
            seconds: timestamp_seconds,
            frame: frame_number,
            total,
        });
    }

    log::debug!(
        "Extracting key frame {frame_number} ({timestamp_seconds:.2}s) from {:?}",
        source.path,
    );

    let mut frame = read_single_frame(&mut source, frame_number)?;
    draw_labeled_box(&mut frame, region, label, &ADVICE_STYLE);
    frame.save(output_path)?;
    Ok(())
}

/// Seek to the nearest keyframe before the target and decode forward until
/// the target (or the closest frame after it) is reached.
fn read_single_frame(
    source: &mut SourceVideo,
    frame_number: u64,
) -> Result<RgbImage, SidelineError> {
    let stream_index = source.stream_index;
    let width = source.metadata.width;
    let height = source.metadata.height;
    let fps = source.metadata.fps;

    let stream = source
        .input
        .stream(stream_index)
        .ok_or(SidelineError::NoVideoStream)?;
    let time_base = stream.time_base();
    let decoder_context = CodecContext::from_parameters(stream.parameters())?;
    let mut decoder = decoder_context.decoder().video()?;

    let mut scaler = ScalingContext::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        Pixel::RGB24,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;

    let target = utilities::frame_number_to_stream_timestamp(frame_number, fps, time_base);
    source.input.seek(target, ..target)?;

    let mut decoded = VideoFrame::empty();
    let mut rgb = VideoFrame::empty();

    let mut convert =
        |decoded: &VideoFrame, rgb: &mut VideoFrame| -> Result<RgbImage, SidelineError> {
            scaler.run(decoded, rgb)?;
            let buffer = utilities::frame_to_rgb_buffer(rgb, width, height);
            RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
                SidelineError::Decode(
                    "Failed to construct RGB image from decoded frame data".to_string(),
                )
            })
        };

    for (stream, packet) in source.input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            let pts = decoded.pts().unwrap_or(0);
            let current = utilities::pts_to_frame_number(pts, time_base, fps);
            if current >= frame_number {
                return convert(&decoded, &mut rgb);
            }
        }
    }

    // Flush: the target may sit in the decoder's tail.
    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded).is_ok() {
        let pts = decoded.pts().unwrap_or(0);
        let current = utilities::pts_to_frame_number(pts, time_base, fps);
        if current >= frame_number {
            return convert(&decoded, &mut rgb);
        }
    }

    Err(SidelineError::Decode(format!(
        "Could not locate frame {frame_number} in the video stream"
    )))
}
