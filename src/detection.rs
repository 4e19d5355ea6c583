//! Bounding-box detections and tolerant response parsing.
//!
//! The vision backend replies with free text that *usually* contains a JSON
//! list of `{"box_2d": [ymin, xmin, ymax, xmax], "label": "..."}` objects,
//! often wrapped in a markdown code fence and occasionally malformed. This
//! module turns one such reply into a [`ParseOutcome`]: parsing never fails
//! the pipeline, it degrades to an empty detection set.
//!
//! Box coordinates use the backend's normalized scale: each component is an
//! integer fraction of the frame dimension scaled by 1000, in
//! `(ymin, xmin, ymax, xmax)` order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bounding box on the backend's normalized 0-1000 scale.
///
/// Components are `(ymin, xmin, ymax, xmax)`, each an integer fraction of
/// the frame height/width scaled by 1000. Serialized as a 4-element array,
/// matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct NormalizedBox {
    /// Top edge.
    pub ymin: i32,
    /// Left edge.
    pub xmin: i32,
    /// Bottom edge.
    pub ymax: i32,
    /// Right edge.
    pub xmax: i32,
}

impl From<[i32; 4]> for NormalizedBox {
    fn from([ymin, xmin, ymax, xmax]: [i32; 4]) -> Self {
        Self { ymin, xmin, ymax, xmax }
    }
}

impl From<NormalizedBox> for [i32; 4] {
    fn from(value: NormalizedBox) -> Self {
        [value.ymin, value.xmin, value.ymax, value.xmax]
    }
}

impl NormalizedBox {
    /// Linearly interpolate each component towards `other`.
    ///
    /// `progress` is 0.0 at `self` and approaches 1.0 just before `other`;
    /// components are rounded to the nearest integer.
    pub fn lerp(self, other: NormalizedBox, progress: f64) -> NormalizedBox {
        let mix = |a: i32, b: i32| -> i32 { (a as f64 + (b - a) as f64 * progress).round() as i32 };
        NormalizedBox {
            ymin: mix(self.ymin, other.ymin),
            xmin: mix(self.xmin, other.xmin),
            ymax: mix(self.ymax, other.ymax),
            xmax: mix(self.xmax, other.xmax),
        }
    }
}

/// One labeled bounding box for one sampled frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Where the subject is, on the normalized scale.
    pub box_2d: NormalizedBox,
    /// What the backend says it is.
    pub label: String,
}

/// The result of parsing one analysis response.
///
/// The ordering of detections within a set carries no identity meaning; it
/// is only the positional correspondence key used by
/// [`boxes_for_frame`](crate::interpolate::boxes_for_frame).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The response contained a JSON list; every well-formed entry is kept.
    Detections(Vec<Detection>),
    /// The response was not parseable as JSON at all.
    Malformed,
    /// The response parsed, but the top-level value was not a list.
    WrongShape,
}

impl ParseOutcome {
    /// Degrade to a detection set, mapping both failure arms to empty.
    pub fn into_detections(self) -> Vec<Detection> {
        match self {
            ParseOutcome::Detections(detections) => detections,
            ParseOutcome::Malformed | ParseOutcome::WrongShape => Vec::new(),
        }
    }
}

/// Strip a markdown code fence from a backend response.
///
/// If the text contains a ```` ```json ```` marker, the content between it
/// and the next ```` ``` ```` is returned; otherwise, if it contains a bare
/// ```` ``` ```` fence, the content between the first pair; otherwise the
/// text verbatim. An unterminated fence runs to the end of the text.
pub fn strip_code_fence(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + "```json".len()..];
        match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        }
    } else if let Some(start) = text.find("```") {
        let rest = &text[start + "```".len()..];
        match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        }
    } else {
        text
    }
}

/// Parse one raw analysis response into detections.
///
/// Tolerant by contract: any malformed payload degrades rather than erring.
/// List entries are kept only when they are objects carrying a 4-integer
/// `box_2d` and a string `label`; anything else is skipped with a warning.
pub fn parse_detections(raw: &str) -> ParseOutcome {
    let cleaned = strip_code_fence(raw).trim();

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(error) => {
            log::warn!("Analysis response is not valid JSON ({error}); ignoring");
            return ParseOutcome::Malformed;
        }
    };

    let Value::Array(items) = value else {
        log::warn!("Analysis response is JSON but not a list; ignoring");
        return ParseOutcome::WrongShape;
    };

    let mut detections = Vec::with_capacity(items.len());
    for item in items {
        match detection_from_value(&item) {
            Some(detection) => detections.push(detection),
            None => log::warn!("Skipping malformed detection entry: {item}"),
        }
    }

    ParseOutcome::Detections(detections)
}

/// Validate a single list entry. Partial success is expected, not an error.
fn detection_from_value(item: &Value) -> Option<Detection> {
    let object = item.as_object()?;
    let label = object.get("label")?.as_str()?.to_string();

    let components = object.get("box_2d")?.as_array()?;
    if components.len() != 4 {
        return None;
    }
    let mut box_2d = [0i32; 4];
    for (slot, component) in box_2d.iter_mut().zip(components) {
        *slot = i32::try_from(component.as_i64()?).ok()?;
    }

    Some(Detection {
        box_2d: box_2d.into(),
        label,
    })
}
