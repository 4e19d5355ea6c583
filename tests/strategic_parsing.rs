//! Strategic-report parsing integration tests.

use sideline::{NormalizedBox, parse_strategic, strategic::DEFAULT_ADVICE_LABEL};

const FULL: &str = r#"{
    "summary": "Strong backhand, weak footwork.",
    "key_frame_timestamp": 12.5,
    "improvement_box_2d": [100, 200, 300, 400],
    "advice": "Bend your knees earlier."
}"#;

#[test]
fn full_payload_parses_completely() {
    let report = parse_strategic(FULL);

    assert_eq!(report.summary, "Strong backhand, weak footwork.");
    let advice = report.advice.expect("advice present");
    assert_eq!(advice.timestamp_seconds, 12.5);
    assert_eq!(
        advice.region,
        Some(NormalizedBox { ymin: 100, xmin: 200, ymax: 300, xmax: 400 })
    );
    assert_eq!(advice.label, "Bend your knees earlier.");
}

#[test]
fn fenced_payload_matches_unfenced() {
    let fenced = format!("```json\n{FULL}\n```");
    assert_eq!(parse_strategic(&fenced), parse_strategic(FULL));
}

#[test]
fn prose_degrades_to_text_only() {
    let raw = "The player shows promise but lacks consistency.";
    let report = parse_strategic(raw);

    assert_eq!(report.summary, raw);
    assert!(report.advice.is_none());
}

#[test]
fn missing_timestamp_means_no_advice() {
    let raw = r#"{"summary": "Solid game.", "advice": "n/a"}"#;
    let report = parse_strategic(raw);

    assert_eq!(report.summary, "Solid game.");
    assert!(report.advice.is_none());
}

#[test]
fn missing_summary_falls_back_to_raw_text() {
    let raw = r#"{"key_frame_timestamp": 3.0}"#;
    let report = parse_strategic(raw);

    assert_eq!(report.summary, raw);
    let advice = report.advice.expect("advice present");
    assert!(advice.region.is_none());
    assert_eq!(advice.label, DEFAULT_ADVICE_LABEL);
}

#[test]
fn malformed_region_degrades_the_whole_payload() {
    // A three-element box fails the payload; the raw text becomes the summary.
    let raw = r#"{"summary": "ok", "key_frame_timestamp": 1.0, "improvement_box_2d": [1, 2, 3]}"#;
    let report = parse_strategic(raw);

    assert_eq!(report.summary, raw);
    assert!(report.advice.is_none());
}

#[test]
fn region_is_optional() {
    let raw = r#"{"summary": "ok", "key_frame_timestamp": 2.0, "advice": "watch the ball"}"#;
    let advice = parse_strategic(raw).advice.expect("advice present");

    assert!(advice.region.is_none());
    assert_eq!(advice.label, "watch the ball");
}
