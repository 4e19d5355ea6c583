//! Full-sequence decoding and fixed-stride frame sampling.
//!
//! The analysis pipeline keeps every decoded frame in memory: sampled frames
//! (every Nth) are shipped to the vision backend, while the frames between
//! them are annotated with interpolated boxes and re-encoded. This module
//! provides the decode step, the sampling arithmetic, and the JPEG payload
//! encoding for the analysis wire format.
//!
//! # Example
//!
//! ```no_run
//! use sideline::{SourceVideo, sampler};
//!
//! let mut source = SourceVideo::open("match.mp4")?;
//! let sequence = sampler::decode_frames(&mut source)?;
//! let payloads = sampler::jpeg_payloads(&sequence.frames, 5, 90)?;
//! println!("{} frames, {} sampled", sequence.frames.len(), payloads.len());
//! # Ok::<(), sideline::SidelineError>(())
//! ```

use std::io::Cursor;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{RgbImage, codecs::jpeg::JpegEncoder};

use crate::{error::SidelineError, media::SourceVideo, utilities};

/// Every decoded frame of a source video, in presentation order, plus the
/// source frame rate.
///
/// Frame buffers are independent objects; the annotation stage mutates them
/// in place before reassembly.
#[derive(Debug)]
pub struct FrameSequence {
    /// All frames, RGB8, full resolution.
    pub frames: Vec<RgbImage>,
    /// Source frames per second.
    pub fps: f64,
}

/// Decode every frame of the source into RGB8 images.
///
/// Frames are converted from the source pixel format to tightly-packed RGB
/// via FFmpeg's software scaler. A video with zero readable frames yields an
/// empty sequence, not an error. The decoder is created and released inside
/// this call.
///
/// # Errors
///
/// - [`SidelineError::NoVideoStream`] if the stream disappeared between
///   open and decode (corrupt container).
/// - [`SidelineError::Decode`] if a frame cannot be converted.
pub fn decode_frames(source: &mut SourceVideo) -> Result<FrameSequence, SidelineError> {
    let stream_index = source.stream_index;
    let width = source.metadata.width;
    let height = source.metadata.height;
    let fps = source.metadata.fps;

    let stream = source
        .input
        .stream(stream_index)
        .ok_or(SidelineError::NoVideoStream)?;
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

    let mut frames = Vec::new();
    let mut decoded = VideoFrame::empty();
    let mut rgb = VideoFrame::empty();

    let mut collect =
        |decoded: &VideoFrame, rgb: &mut VideoFrame, frames: &mut Vec<RgbImage>| -> Result<(), SidelineError> {
            scaler.run(decoded, rgb)?;
            let buffer = utilities::frame_to_rgb_buffer(rgb, width, height);
            let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
                SidelineError::Decode(
                    "Failed to construct RGB image from decoded frame data".to_string(),
                )
            })?;
            frames.push(image);
            Ok(())
        };

    for (stream, packet) in source.input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            collect(&decoded, &mut rgb, &mut frames)?;
        }
    }

    // Flush the decoder.
    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded).is_ok() {
        collect(&decoded, &mut rgb, &mut frames)?;
    }

    log::debug!("Decoded {} frames at {:.3} fps", frames.len(), fps);

    Ok(FrameSequence { frames, fps })
}

/// Indices of the frames selected at a fixed stride.
///
/// Index `i` is sampled iff `i % sample_rate == 0`, so a sequence of `F`
/// frames yields `ceil(F / sample_rate)` sampled frames.
///
/// # Errors
///
/// Returns [`SidelineError::InvalidSampleRate`] for a stride of zero.
pub fn sampled_indices(frame_count: usize, sample_rate: usize) -> Result<Vec<usize>, SidelineError> {
    if sample_rate == 0 {
        return Err(SidelineError::InvalidSampleRate);
    }
    Ok((0..frame_count).step_by(sample_rate).collect())
}

/// Encode each sampled frame as JPEG bytes for the analysis backend.
///
/// # Errors
///
/// Returns [`SidelineError::InvalidSampleRate`] for a stride of zero, or
/// [`SidelineError::Image`] if JPEG encoding fails.
pub fn jpeg_payloads(
    frames: &[RgbImage],
    sample_rate: usize,
    quality: u8,
) -> Result<Vec<Vec<u8>>, SidelineError> {
    let indices = sampled_indices(frames.len(), sample_rate)?;
    let mut payloads = Vec::with_capacity(indices.len());

    for index in indices {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
        encoder.encode_image(&frames[index])?;
        payloads.push(bytes);
    }

    Ok(payloads)
}
