//! The end-to-end analysis pipeline.
//!
//! Given a blob-store reference to a source video, [`Pipeline::process`]
//! decodes every frame, ships every Nth frame to the vision backend,
//! interpolates detections across the gaps, overlays boxes, re-encodes a
//! full-length annotated video, and runs the independent strategic pass to
//! produce a single annotated key-frame still.
//!
//! Failure policy (per stage):
//! - decode, fan-out, assembly, and storage of the processed video are
//!   fatal to the run;
//! - per-frame detection parsing always degrades to an empty set;
//! - the strategic/key-frame path is best-effort — any failure there is
//!   logged and the corresponding report fields come back empty.
//!
//! All scratch files live in a [`tempfile::TempDir`] that is removed on
//! every exit path, success or error.

use std::path::Path;

use crate::{
    analyzer::VisionAnalyzer,
    annotate::{self, DETECTION_STYLE},
    assemble::{self, AssembleOptions},
    detection::{self, Detection},
    error::SidelineError,
    fanout,
    interpolate,
    keyframe,
    media::SourceVideo,
    sampler,
    storage::BlobStore,
    strategic,
};

/// Tuning knobs for a pipeline run.
///
/// # Example
///
/// ```
/// use sideline::PipelineOptions;
///
/// let options = PipelineOptions::default().sample_rate(10).analysis_cap(6);
/// assert_eq!(options.sample_rate, 10);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct PipelineOptions {
    /// Sampling stride: every Nth frame is analyzed (default 5).
    pub sample_rate: usize,
    /// Maximum sampled frames analyzed per run (default
    /// [`fanout::DEFAULT_ANALYSIS_CAP`]).
    pub analysis_cap: usize,
    /// Output container extension (default "webm").
    pub container: String,
    /// JPEG quality for analysis payloads (default 90).
    pub jpeg_quality: u8,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sample_rate: 5,
            analysis_cap: fanout::DEFAULT_ANALYSIS_CAP,
            container: "webm".to_string(),
            jpeg_quality: 90,
        }
    }
}

impl PipelineOptions {
    /// Set the sampling stride.
    pub fn sample_rate(mut self, sample_rate: usize) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the analysis request cap.
    pub fn analysis_cap(mut self, analysis_cap: usize) -> Self {
        self.analysis_cap = analysis_cap;
        self
    }

    /// Set the output container extension.
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Set the JPEG quality for analysis payloads.
    pub fn jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }
}

/// What a completed run hands back to the routing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Blob reference of the annotated full-length video.
    pub processed_video: String,
    /// Strategic summary; `None` when the strategic call itself failed.
    pub summary: Option<String>,
    /// Blob reference of the annotated key-frame still, when produced.
    pub advice_image: Option<String>,
}

/// The assembled pipeline: a vision backend, a blob store, and options.
///
/// Stateless between runs; each [`process`](Pipeline::process) call is
/// independent.
pub struct Pipeline<A, S> {
    analyzer: A,
    store: S,
    options: PipelineOptions,
}

impl<A, S> Pipeline<A, S>
where
    A: VisionAnalyzer,
    S: BlobStore,
{
    /// Build a pipeline with default options.
    pub fn new(analyzer: A, store: S) -> Self {
        Self {
            analyzer,
            store,
            options: PipelineOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full pipeline against the blob named `source`.
    ///
    /// # Errors
    ///
    /// Propagates decode, fan-out, assembly, and storage failures; see the
    /// module docs for what degrades instead of failing.
    pub async fn process(&self, source: &str) -> Result<PipelineReport, SidelineError> {
        let workspace = tempfile::tempdir()?;
        let input_path = workspace.path().join("source_video");
        self.store.get(source, &input_path).await?;

        // Decode everything up front; frame buffers are independent, so the
        // annotation stage can mutate them in place later.
        let decode_path = input_path.clone();
        let sequence = tokio::task::spawn_blocking(move || {
            let mut opened = SourceVideo::open(&decode_path)?;
            sampler::decode_frames(&mut opened)
        })
        .await
        .map_err(|error| SidelineError::Task(error.to_string()))??;

        log::info!(
            "Processing '{source}': {} frames @ {:.3} fps, sampling every {}",
            sequence.frames.len(),
            sequence.fps,
            self.options.sample_rate,
        );

        let payloads = sampler::jpeg_payloads(
            &sequence.frames,
            self.options.sample_rate,
            self.options.jpeg_quality,
        )?;

        let responses =
            fanout::analyze_frames(&self.analyzer, &payloads, self.options.analysis_cap).await?;

        let sets: Vec<Vec<Detection>> = responses
            .iter()
            .map(|response| detection::parse_detections(response).into_detections())
            .collect();

        // Annotate every frame and reassemble at the source frame rate.
        let output_path = workspace
            .path()
            .join(format!("annotated.{}", self.options.container));
        let assemble_path = output_path.clone();
        let sample_rate = self.options.sample_rate;
        let fps = sequence.fps;
        let mut frames = sequence.frames;
        tokio::task::spawn_blocking(move || -> Result<(), SidelineError> {
            for (index, frame) in frames.iter_mut().enumerate() {
                for detection in interpolate::boxes_for_frame(&sets, index, sample_rate) {
                    annotate::draw_labeled_box(
                        frame,
                        Some(&detection.box_2d),
                        &detection.label,
                        &DETECTION_STYLE,
                    );
                }
            }
            assemble::assemble_video(&frames, &assemble_path, &AssembleOptions::new(fps))
        })
        .await
        .map_err(|error| SidelineError::Task(error.to_string()))??;

        if !output_path.exists() {
            return Err(SidelineError::Encode(
                "pipeline produced no output video".to_string(),
            ));
        }

        let stem = blob_stem(source);
        let processed_video = self
            .store
            .put(
                &format!("processed/{stem}/annotated.{}", self.options.container),
                &output_path,
            )
            .await?;

        // Independent strategic pass; everything below is best-effort.
        let (summary, advice_image) = self
            .strategic_pass(source, &stem, &input_path, workspace.path())
            .await;

        Ok(PipelineReport {
            processed_video,
            summary,
            advice_image,
        })
    }

    /// Run the strategic analysis and key-frame annotation, degrading on
    /// every failure.
    async fn strategic_pass(
        &self,
        source: &str,
        stem: &str,
        input_path: &Path,
        workspace: &Path,
    ) -> (Option<String>, Option<String>) {
        let raw = match self.analyzer.analyze_clip(source).await {
            Ok(raw) => raw,
            Err(error) => {
                log::warn!("Strategic analysis failed: {error}; returning detection-only result");
                return (None, None);
            }
        };

        let report = strategic::parse_strategic(&raw);

        let Some(advice) = report.advice else {
            return (Some(report.summary), None);
        };

        let advice_path = workspace.join("advice.jpg");
        let keyframe_source = input_path.to_path_buf();
        let keyframe_output = advice_path.clone();
        let annotated = tokio::task::spawn_blocking(move || {
            keyframe::annotate_key_frame(
                &keyframe_source,
                advice.timestamp_seconds,
                advice.region.as_ref(),
                &advice.label,
                &keyframe_output,
            )
        })
        .await
        .map_err(|error| SidelineError::Task(error.to_string()))
        .and_then(|result| result);

        if let Err(error) = annotated {
            log::warn!("Key-frame annotation failed: {error}; omitting advice image");
            return (Some(report.summary), None);
        }

        match self
            .store
            .put(&format!("processed/{stem}/advice.jpg"), &advice_path)
            .await
        {
            Ok(reference) => (Some(report.summary), Some(reference)),
            Err(error) => {
                log::warn!("Storing advice image failed: {error}; omitting advice image");
                (Some(report.summary), None)
            }
        }
    }
}

/// Derive a stable output prefix from a blob name: the final path
/// component without its extension.
fn blob_stem(source: &str) -> String {
    let name = source.rsplit('/').next().unwrap_or(source);
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
        .to_string()
}
