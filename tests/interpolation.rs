//! Box-interpolation integration tests.
//!
//! The asymmetric fade rule is observable behavior: boxes lead forward from
//! the sample that detected them and never anticipate the next one.

use sideline::{Detection, NormalizedBox, boxes_for_frame};

fn labeled(label: &str, ymin: i32, xmin: i32, ymax: i32, xmax: i32) -> Detection {
    Detection {
        box_2d: NormalizedBox { ymin, xmin, ymax, xmax },
        label: label.to_string(),
    }
}

fn boxed(ymin: i32, xmin: i32, ymax: i32, xmax: i32) -> Detection {
    labeled("person", ymin, xmin, ymax, xmax)
}

#[test]
fn midpoint_interpolation_is_linear() {
    let sets = vec![vec![boxed(0, 0, 100, 100)], vec![boxed(100, 100, 200, 200)]];

    // Frame 2 of a 5-frame gap: progress 0.4.
    let boxes = boxes_for_frame(&sets, 2, 5);
    assert_eq!(boxes, vec![boxed(40, 40, 140, 140)]);
}

#[test]
fn progress_zero_at_the_covering_sample() {
    let sets = vec![vec![boxed(0, 0, 100, 100)], vec![boxed(100, 100, 200, 200)]];
    assert_eq!(boxes_for_frame(&sets, 0, 5), vec![boxed(0, 0, 100, 100)]);
}

#[test]
fn components_round_to_nearest() {
    let sets = vec![vec![boxed(0, 0, 0, 0)], vec![boxed(1, 2, 5, 9)]];
    // progress = 1/3: 0.33 -> 0, 0.67 -> 1, 1.67 -> 2, 3.0 -> 3.
    assert_eq!(boxes_for_frame(&sets, 1, 3), vec![boxed(0, 1, 2, 3)]);
}

#[test]
fn label_comes_from_the_earlier_sample() {
    let sets = vec![
        vec![labeled("goalkeeper", 0, 0, 100, 100)],
        vec![labeled("striker", 100, 100, 200, 200)],
    ];
    assert_eq!(boxes_for_frame(&sets, 2, 5)[0].label, "goalkeeper");
}

#[test]
fn extra_detection_in_earlier_sample_holds_unmodified() {
    let sets = vec![
        vec![boxed(0, 0, 100, 100), boxed(500, 500, 600, 600)],
        vec![boxed(100, 100, 200, 200)],
    ];

    for offset in 1..5 {
        let boxes = boxes_for_frame(&sets, offset, 5);
        assert_eq!(boxes.len(), 2, "offset {offset}");
        // The unpaired second detection is drawn as-is, no fade-out.
        assert_eq!(boxes[1], boxed(500, 500, 600, 600), "offset {offset}");
    }
}

#[test]
fn extra_detection_in_later_sample_never_appears_early() {
    let sets = vec![
        vec![boxed(0, 0, 100, 100)],
        vec![boxed(100, 100, 200, 200), boxed(500, 500, 600, 600)],
    ];

    for offset in 0..5 {
        let boxes = boxes_for_frame(&sets, offset, 5);
        assert_eq!(boxes.len(), 1, "offset {offset}: no fade-in before sample 1");
    }

    // From sample 1 itself (the tail), both are drawn.
    assert_eq!(boxes_for_frame(&sets, 5, 5).len(), 2);
}

#[test]
fn frames_at_and_after_the_last_sample_reuse_its_set() {
    let sets = vec![vec![boxed(0, 0, 100, 100)], vec![boxed(100, 100, 200, 200)]];

    for frame_index in 5..10 {
        assert_eq!(
            boxes_for_frame(&sets, frame_index, 5),
            vec![boxed(100, 100, 200, 200)],
            "frame {frame_index}"
        );
    }
}

#[test]
fn frames_past_the_analyzed_range_get_nothing() {
    // Two analyzed samples; the run was capped before sample 2.
    let sets = vec![vec![boxed(0, 0, 100, 100)], vec![boxed(100, 100, 200, 200)]];
    assert!(boxes_for_frame(&sets, 10, 5).is_empty());
    assert!(boxes_for_frame(&sets, 23, 5).is_empty());
}

#[test]
fn empty_sets_yield_empty_boxes() {
    assert!(boxes_for_frame(&[], 0, 5).is_empty());
    let sets = vec![Vec::new(), vec![boxed(0, 0, 10, 10)]];
    assert!(boxes_for_frame(&sets, 2, 5).is_empty());
}
