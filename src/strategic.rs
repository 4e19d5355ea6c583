//! Parsing the whole-clip strategic analysis.
//!
//! The strategic pass returns a JSON object with a performance summary, a
//! key-frame timestamp, an optional improvement region, and advice text —
//! or, on a bad day, fenced JSON, partial JSON, or prose. Parsing degrades
//! to a text-only report rather than failing: the raw response becomes the
//! summary and the key-frame path is skipped.

use serde::Deserialize;

use crate::detection::{NormalizedBox, strip_code_fence};

/// Label used when the backend names a region but offers no advice text.
pub const DEFAULT_ADVICE_LABEL: &str = "Improvement Area";

/// What the backend actually sent, all fields optional.
#[derive(Debug, Deserialize)]
struct StrategicPayload {
    summary: Option<String>,
    key_frame_timestamp: Option<f64>,
    improvement_box_2d: Option<NormalizedBox>,
    advice: Option<String>,
}

/// The moment the coach wants annotated.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrameAdvice {
    /// Where in the clip, in seconds.
    pub timestamp_seconds: f64,
    /// The region to highlight; `None` still produces an unannotated still.
    pub region: Option<NormalizedBox>,
    /// Advice text drawn as the region label.
    pub label: String,
}

/// The usable result of one strategic analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategicReport {
    /// Performance summary; falls back to the raw response text when the
    /// payload is unparseable or carries no summary field.
    pub summary: String,
    /// Key-frame advice, present only when the payload named a timestamp.
    pub advice: Option<KeyFrameAdvice>,
}

/// Parse one raw strategic response.
///
/// Never fails: malformed payloads yield a text-only report.
pub fn parse_strategic(raw: &str) -> StrategicReport {
    let cleaned = strip_code_fence(raw).trim();

    let payload: StrategicPayload = match serde_json::from_str(cleaned) {
        Ok(payload) => payload,
        Err(error) => {
            log::warn!("Strategic response is not the expected JSON ({error}); using raw text");
            return StrategicReport {
                summary: raw.to_string(),
                advice: None,
            };
        }
    };

    let advice = payload
        .key_frame_timestamp
        .map(|timestamp_seconds| KeyFrameAdvice {
            timestamp_seconds,
            region: payload.improvement_box_2d,
            label: payload
                .advice
                .unwrap_or_else(|| DEFAULT_ADVICE_LABEL.to_string()),
        });

    StrategicReport {
        summary: payload.summary.unwrap_or_else(|| raw.to_string()),
        advice,
    }
}
