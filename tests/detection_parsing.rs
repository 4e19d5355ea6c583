//! Detection-parser integration tests.
//!
//! The backend's responses are untrusted text; every malformed shape must
//! degrade to an empty set rather than erring.

use sideline::{Detection, NormalizedBox, ParseOutcome, parse_detections, strip_code_fence};

fn person(ymin: i32, xmin: i32, ymax: i32, xmax: i32) -> Detection {
    Detection {
        box_2d: NormalizedBox { ymin, xmin, ymax, xmax },
        label: "person".to_string(),
    }
}

#[test]
fn valid_list_yields_one_detection_per_object() {
    let raw = r#"[{"box_2d": [0, 0, 100, 100], "label": "person"},
                  {"box_2d": [200, 300, 400, 500], "label": "ball"}]"#;
    let ParseOutcome::Detections(detections) = parse_detections(raw) else {
        panic!("expected detections");
    };
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0], person(0, 0, 100, 100));
    assert_eq!(detections[1].label, "ball");
}

#[test]
fn fenced_json_matches_unfenced() {
    let unfenced = r#"[{"box_2d": [0, 0, 100, 100], "label": "person"}]"#;
    let fenced = format!("```json\n{unfenced}\n```");
    assert_eq!(parse_detections(&fenced), parse_detections(unfenced));
}

#[test]
fn bare_fence_matches_unfenced() {
    let unfenced = r#"[{"box_2d": [0, 0, 100, 100], "label": "person"}]"#;
    let fenced = format!("Here you go:\n```\n{unfenced}\n```\nHope that helps!");
    assert_eq!(parse_detections(&fenced), parse_detections(unfenced));
}

#[test]
fn unterminated_fence_still_parses() {
    let raw = "```json\n[{\"box_2d\": [0, 0, 100, 100], \"label\": \"person\"}]";
    assert_eq!(
        parse_detections(raw).into_detections(),
        vec![person(0, 0, 100, 100)]
    );
}

#[test]
fn bare_scalar_is_wrong_shape() {
    assert_eq!(parse_detections("123"), ParseOutcome::WrongShape);
    assert!(parse_detections("123").into_detections().is_empty());
}

#[test]
fn top_level_object_is_wrong_shape() {
    let raw = r#"{"box_2d": [0, 0, 0, 0], "label": "person"}"#;
    assert_eq!(parse_detections(raw), ParseOutcome::WrongShape);
}

#[test]
fn malformed_json_is_malformed() {
    assert_eq!(parse_detections(r#"[{"box_2d":..."#), ParseOutcome::Malformed);
    assert_eq!(parse_detections("not json at all"), ParseOutcome::Malformed);
}

#[test]
fn invalid_items_are_skipped_not_fatal() {
    let raw = r#"[
        {"box_2d": [0, 0, 100, 100], "label": "person"},
        {"label": "no box"},
        {"box_2d": [1, 2, 3], "label": "short box"},
        {"box_2d": [1, 2, 3, 4, 5], "label": "long box"},
        {"box_2d": [1, 2, 3, "four"], "label": "stringy box"},
        {"box_2d": [5, 6, 7, 8]},
        "just a string",
        {"box_2d": [10, 20, 30, 40], "label": "person"}
    ]"#;
    let detections = parse_detections(raw).into_detections();
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0], person(0, 0, 100, 100));
    assert_eq!(detections[1], person(10, 20, 30, 40));
}

#[test]
fn empty_list_is_a_valid_empty_set() {
    assert_eq!(parse_detections("[]"), ParseOutcome::Detections(Vec::new()));
}

#[test]
fn fence_extraction_is_verbatim_without_fences() {
    assert_eq!(strip_code_fence("plain text"), "plain text");
    assert_eq!(strip_code_fence("```json\nabc\n```"), "\nabc\n");
    assert_eq!(strip_code_fence("x ``` y ``` z"), " y ");
}

#[test]
fn box_serializes_as_four_element_array() {
    let detection = person(1, 2, 3, 4);
    let json = serde_json::to_string(&detection).unwrap();
    assert_eq!(json, r#"{"box_2d":[1,2,3,4],"label":"person"}"#);
}
