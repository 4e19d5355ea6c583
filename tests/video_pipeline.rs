//! End-to-end pipeline integration tests with a canned analysis backend
//! and a directory-backed blob store.
//!
//! Fixtures are generated through the assembler; tests skip when the
//! platform build has no usable encoder.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use sideline::{
    AssembleOptions, BlobStore, DirectoryStore, Pipeline, PipelineOptions, SidelineError,
    VisionAnalyzer, assemble_video,
};

fn synthetic_frames(count: usize, width: u32, height: u32) -> Vec<RgbImage> {
    (0..count)
        .map(|index| {
            let shade = (index * 20 % 256) as u8;
            RgbImage::from_pixel(width, height, Rgb([shade, 128, 255 - shade]))
        })
        .collect()
}

fn write_sample(path: &Path) -> bool {
    match assemble_video(&synthetic_frames(12, 128, 96), path, &AssembleOptions::new(12.0)) {
        Ok(()) => true,
        Err(error) => {
            eprintln!("Skipping: cannot generate fixture ({error})");
            false
        }
    }
}

/// Canned backend: fenced detections per frame, a full strategic report.
struct CannedAnalyzer {
    frame_calls: AtomicUsize,
    strategic_fails: bool,
}

impl CannedAnalyzer {
    fn new(strategic_fails: bool) -> Self {
        Self {
            frame_calls: AtomicUsize::new(0),
            strategic_fails,
        }
    }
}

#[async_trait]
impl VisionAnalyzer for CannedAnalyzer {
    async fn analyze_frame(&self, _frame_jpeg: &[u8]) -> Result<String, SidelineError> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        Ok("```json\n[{\"box_2d\": [100, 100, 600, 600], \"label\": \"person\"}]\n```".to_string())
    }

    async fn analyze_clip(&self, _video_uri: &str) -> Result<String, SidelineError> {
        if self.strategic_fails {
            return Err(SidelineError::Analysis("backend offline".to_string()));
        }
        Ok(r#"{
            "summary": "Good pace, late reactions.",
            "key_frame_timestamp": 0.25,
            "improvement_box_2d": [200, 200, 700, 700],
            "advice": "React on the bounce."
        }"#
        .to_string())
    }
}

async fn stage_source(store: &DirectoryStore, fixture: &Path) -> String {
    let source = "uploads/match.mp4".to_string();
    store.put(&source, fixture).await.expect("stage source");
    source
}

#[tokio::test]
async fn full_run_produces_video_summary_and_advice() {
    let scratch = tempfile::tempdir().unwrap();
    let fixture = scratch.path().join("fixture.mp4");
    if !write_sample(&fixture) {
        return;
    }

    let store = DirectoryStore::new(scratch.path().join("blobs")).unwrap();
    let source = stage_source(&store, &fixture).await;

    let analyzer = CannedAnalyzer::new(false);
    let report = Pipeline::new(analyzer, store.clone())
        .with_options(PipelineOptions::default().container("mp4"))
        .process(&source)
        .await
        .expect("pipeline run");

    assert_eq!(report.processed_video, "processed/match/annotated.mp4");
    assert_eq!(report.summary.as_deref(), Some("Good pace, late reactions."));
    assert_eq!(report.advice_image.as_deref(), Some("processed/match/advice.jpg"));

    // Both outputs are durably in the store.
    let fetched = scratch.path().join("check.mp4");
    store.get(&report.processed_video, &fetched).await.unwrap();
    assert!(std::fs::metadata(&fetched).unwrap().len() > 0);

    let advice = scratch.path().join("check.jpg");
    store.get("processed/match/advice.jpg", &advice).await.unwrap();
    assert!(std::fs::metadata(&advice).unwrap().len() > 0);
}

#[tokio::test]
async fn analysis_cap_bounds_the_request_count() {
    let scratch = tempfile::tempdir().unwrap();
    let fixture = scratch.path().join("fixture.mp4");
    if !write_sample(&fixture) {
        return;
    }

    let store = DirectoryStore::new(scratch.path().join("blobs")).unwrap();
    let source = stage_source(&store, &fixture).await;

    let analyzer = std::sync::Arc::new(CannedAnalyzer::new(false));

    // 12 frames at stride 2 is 6 sampled frames; the cap keeps it at 2.
    let options = PipelineOptions::default()
        .container("mp4")
        .sample_rate(2)
        .analysis_cap(2);
    let report = Pipeline::new(analyzer.clone(), store)
        .with_options(options)
        .process(&source)
        .await
        .expect("pipeline run");

    assert_eq!(analyzer.frame_calls.load(Ordering::SeqCst), 2);
    assert!(report.processed_video.ends_with("annotated.mp4"));
}

#[tokio::test]
async fn strategic_failure_degrades_to_detection_only() {
    let scratch = tempfile::tempdir().unwrap();
    let fixture = scratch.path().join("fixture.mp4");
    if !write_sample(&fixture) {
        return;
    }

    let store = DirectoryStore::new(scratch.path().join("blobs")).unwrap();
    let source = stage_source(&store, &fixture).await;

    let report = Pipeline::new(CannedAnalyzer::new(true), store)
        .with_options(PipelineOptions::default().container("mp4"))
        .process(&source)
        .await
        .expect("pipeline still succeeds");

    assert!(report.processed_video.ends_with("annotated.mp4"));
    assert!(report.summary.is_none());
    assert!(report.advice_image.is_none());
}

#[tokio::test]
async fn missing_source_blob_fails_the_run() {
    let scratch = tempfile::tempdir().unwrap();
    let store = DirectoryStore::new(scratch.path().join("blobs")).unwrap();

    let result = Pipeline::new(CannedAnalyzer::new(false), store)
        .process("uploads/ghost.mp4")
        .await;

    assert!(matches!(result, Err(SidelineError::Storage { .. })));
}
