//! Rendering boxes and labels onto frames.
//!
//! Boxes arrive on the backend's normalized 0-1000 scale and are converted
//! to pixel space against the actual frame dimensions here, immediately
//! before drawing. Frames are mutated in place; this is the only stage that
//! writes to a decoded pixel buffer.

use std::sync::LazyLock;

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut},
    rect::Rect,
};

use crate::detection::NormalizedBox;

/// Label text height in pixels.
const FONT_HEIGHT: f32 = 14.0;

/// Height of the filled label background strip.
const LABEL_BAND: u32 = 18;

static FONT: LazyLock<FontRef<'static>> = LazyLock::new(|| {
    let font_data = include_bytes!("../assets/DejaVuSansMono.ttf");
    FontRef::try_from_slice(font_data).expect("embedded font is valid")
});

/// How a box and its label are drawn.
#[derive(Debug, Clone, Copy)]
pub struct BoxStyle {
    /// Outline and label-background color.
    pub color: Rgb<u8>,
    /// Label text color.
    pub text_color: Rgb<u8>,
    /// Outline thickness in pixels.
    pub thickness: u32,
}

/// Green, 2 px: per-frame subject detections.
pub const DETECTION_STYLE: BoxStyle = BoxStyle {
    color: Rgb([0, 255, 0]),
    text_color: Rgb([0, 0, 0]),
    thickness: 2,
};

/// Red, 3 px: the strategic-advice region on the key frame.
pub const ADVICE_STYLE: BoxStyle = BoxStyle {
    color: Rgb([255, 0, 0]),
    text_color: Rgb([255, 255, 255]),
    thickness: 3,
};

/// Draw one labeled box onto the frame, mutating it in place.
///
/// Normalized components map to pixels as `n * dimension / 1000`
/// (x-components against the width, y-components against the height),
/// clamped to the raster. An absent box is a no-op: the frame passes
/// through unmodified. Degenerate rectangles (zero area after clamping)
/// are skipped.
pub fn draw_labeled_box(
    frame: &mut RgbImage,
    box_2d: Option<&NormalizedBox>,
    label: &str,
    style: &BoxStyle,
) {
    let Some(box_2d) = box_2d else {
        return;
    };

    let width = frame.width() as i64;
    let height = frame.height() as i64;
    if width == 0 || height == 0 {
        return;
    }

    let x0 = (box_2d.xmin as i64 * width / 1000).clamp(0, width - 1);
    let y0 = (box_2d.ymin as i64 * height / 1000).clamp(0, height - 1);
    let x1 = (box_2d.xmax as i64 * width / 1000).clamp(0, width - 1);
    let y1 = (box_2d.ymax as i64 * height / 1000).clamp(0, height - 1);

    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let box_width = (x1 - x0) as u32;
    let box_height = (y1 - y0) as u32;

    // Outline, drawn as nested 1px rectangles for thickness.
    for t in 0..style.thickness {
        let inner_width = box_width.saturating_sub(2 * t);
        let inner_height = box_height.saturating_sub(2 * t);
        if inner_width == 0 || inner_height == 0 {
            break;
        }
        let rect = Rect::at((x0 + t as i64) as i32, (y0 + t as i64) as i32)
            .of_size(inner_width, inner_height);
        draw_hollow_rect_mut(frame, rect, style.color);
    }

    if label.is_empty() {
        return;
    }

    // Label band above the box's top-left corner, or just inside the frame
    // when the box touches the top edge.
    let band_y = if y0 >= LABEL_BAND as i64 {
        y0 - LABEL_BAND as i64
    } else {
        y0
    };
    let band_width = ((label.len() as u32) * 9 + 6).min(frame.width() - x0 as u32);
    if band_width == 0 {
        return;
    }
    let band = Rect::at(x0 as i32, band_y as i32).of_size(band_width, LABEL_BAND);
    draw_filled_rect_mut(frame, band, style.color);

    draw_text_mut(
        frame,
        style.text_color,
        x0 as i32 + 3,
        band_y as i32 + 2,
        PxScale::from(FONT_HEIGHT),
        &*FONT,
        label,
    );
}
