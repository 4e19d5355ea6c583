//! Positional box interpolation between sampled frames.
//!
//! Detection sets exist only for sampled frames; every frame in between
//! gets boxes by linear interpolation between the two bounding sets.
//! Correspondence is *positional* — detection `j` of one sample is paired
//! with detection `j` of the next, with no object identity involved. If the
//! backend reorders subjects between samples, boxes visibly jump between
//! them; that is inherited behavior, not something this module repairs.
//!
//! The fade rule is asymmetric on purpose: a detection present only in the
//! earlier sample keeps drawing unmodified until the next sample, but a
//! detection that first appears in the later sample is never drawn early.
//! Boxes lead forward from where they were seen; they do not anticipate.

use crate::detection::Detection;

/// Compute the boxes to draw on the frame at `frame_index`.
///
/// `sets` holds one detection set per *analyzed* sampled frame, in sample
/// order; `sample_rate` is the sampling stride. Frames at or after the last
/// analyzed sample reuse its set unmodified; frames whose covering sample
/// was never analyzed (the analysis cap was hit) get no boxes.
///
/// # Panics
///
/// Panics if `sample_rate` is zero; callers validate the stride when the
/// sequence is sampled.
pub fn boxes_for_frame(
    sets: &[Vec<Detection>],
    frame_index: usize,
    sample_rate: usize,
) -> Vec<Detection> {
    assert!(sample_rate > 0, "sample rate must be positive");

    let covering = frame_index / sample_rate;

    // Interpolate only when the *next* sample was analyzed too.
    if covering + 1 < sets.len() {
        let progress = (frame_index % sample_rate) as f64 / sample_rate as f64;
        let current = &sets[covering];
        let next = &sets[covering + 1];

        let mut boxes = Vec::with_capacity(current.len().max(next.len()));
        for j in 0..current.len().max(next.len()) {
            match (current.get(j), next.get(j)) {
                (Some(a), Some(b)) => boxes.push(Detection {
                    box_2d: a.box_2d.lerp(b.box_2d, progress),
                    label: a.label.clone(),
                }),
                // Present only in the earlier sample: hold it, no fade-out.
                (Some(a), None) => boxes.push(a.clone()),
                // Present only in the later sample: no fade-in.
                (None, Some(_)) => {}
                (None, None) => {}
            }
        }
        boxes
    } else {
        // At or past the last analyzed sample: its set, unmodified.
        sets.get(covering).cloned().unwrap_or_default()
    }
}
