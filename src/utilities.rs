//! Internal helpers shared by the decode and encode paths.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from a scaled RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width x 3);
/// this strips it so the result can go straight into
/// [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_len = (width as usize) * 3;
    let data = frame.data(0);

    if stride == row_len {
        data[..row_len * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_len * (height as usize));
        for row in 0..(height as usize) {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_len]);
        }
        buffer
    }
}

/// Convert a frame number to a seek timestamp in the stream's time base.
pub(crate) fn frame_number_to_stream_timestamp(
    frame_number: u64,
    fps: f64,
    time_base: Rational,
) -> i64 {
    let seconds = frame_number as f64 / fps;
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (seconds * denominator / numerator) as i64
}

/// Rescale a PTS value from the stream time base to a frame number.
pub(crate) fn pts_to_frame_number(pts: i64, time_base: Rational, fps: f64) -> u64 {
    let seconds = pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    (seconds * fps) as u64
}
