//! The external vision-analysis collaborator.
//!
//! [`VisionAnalyzer`] is the seam between the pipeline and whatever model
//! backend produces detections: one call per sampled frame, plus one
//! whole-clip call for the strategic coaching pass. Both return *raw text* —
//! the backend is allowed to reply with fenced or malformed JSON, and
//! downstream parsing ([`crate::detection`], [`crate::strategic`]) owns the
//! tolerance.
//!
//! [`GeminiAnalyzer`] is the stock implementation against Google's
//! generative-language REST API.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::SidelineError;

/// Prompt sent alongside each sampled frame.
const FRAME_PROMPT: &str = "Detect sportsmen bounding boxes. Return JSON format: \
    [{'box_2d': [ymin, xmin, ymax, xmax], 'label': 'person'}]";

/// Prompt for the whole-clip strategic pass.
const STRATEGIC_PROMPT: &str = "\
Analyze this sports video and provide a strategic summary.
Identify one key frame where the player could improve their technique.
Return a JSON object with the following fields:
- summary: A strategic summary of the performance.
- key_frame_timestamp: The timestamp (in seconds) of the key frame to improve.
- improvement_box_2d: A bounding box [ymin, xmin, ymax, xmax] (0-1000 scale) identifying the area of improvement.
- advice: Specific advice for that frame.

Ensure the response is valid JSON.";

/// A backend that can analyze sports footage.
///
/// Implementations must be shareable across the concurrent fan-out
/// ([`crate::fanout::analyze_frames`]); any timeout or retry policy lives in
/// the implementation or its caller, not in the pipeline.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze one sampled frame (encoded JPEG bytes), returning the raw
    /// text response.
    async fn analyze_frame(&self, frame_jpeg: &[u8]) -> Result<String, SidelineError>;

    /// Analyze a whole clip by reference (an upload URI the backend can
    /// read), returning the raw strategic-analysis text.
    async fn analyze_clip(&self, video_uri: &str) -> Result<String, SidelineError>;
}

#[async_trait]
impl<T: VisionAnalyzer + ?Sized> VisionAnalyzer for std::sync::Arc<T> {
    async fn analyze_frame(&self, frame_jpeg: &[u8]) -> Result<String, SidelineError> {
        (**self).analyze_frame(frame_jpeg).await
    }

    async fn analyze_clip(&self, video_uri: &str) -> Result<String, SidelineError> {
        (**self).analyze_clip(video_uri).await
    }
}

/// Gemini REST client.
///
/// # Example
///
/// ```no_run
/// use sideline::GeminiAnalyzer;
///
/// let analyzer = GeminiAnalyzer::from_env()?;
/// # Ok::<(), sideline::SidelineError>(())
/// ```
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
            file_data: None,
        }
    }

    fn jpeg(bytes: &[u8]) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: BASE64.encode(bytes),
            }),
            file_data: None,
        }
    }

    fn video_uri(uri: &str) -> Self {
        Part {
            text: None,
            inline_data: None,
            file_data: Some(FileData {
                mime_type: "video/mp4".to_string(),
                file_uri: uri.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiAnalyzer {
    /// Default public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Default model for both the frame and strategic passes.
    pub const DEFAULT_MODEL: &'static str = "gemini-3-pro-preview";

    /// Create a client reading the API key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`SidelineError::Analysis`] when the variable is unset.
    pub fn from_env() -> Result<Self, SidelineError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| SidelineError::Analysis("GEMINI_API_KEY not set".to_string()))?;
        Ok(Self::new(api_key))
    }

    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the endpoint base URL (primarily for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// POST one generateContent request and pull out the first candidate's
    /// text.
    async fn generate(&self, parts: Vec<Part>) -> Result<String, SidelineError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|error| SidelineError::Analysis(format!("request failed: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SidelineError::Analysis(format!(
                "backend returned {status}: {body}"
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|error| SidelineError::Analysis(format!("unreadable response: {error}")))?;

        payload
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| SidelineError::Analysis("no content in response".to_string()))
    }
}

#[async_trait]
impl VisionAnalyzer for GeminiAnalyzer {
    async fn analyze_frame(&self, frame_jpeg: &[u8]) -> Result<String, SidelineError> {
        self.generate(vec![Part::jpeg(frame_jpeg), Part::text(FRAME_PROMPT)])
            .await
    }

    async fn analyze_clip(&self, video_uri: &str) -> Result<String, SidelineError> {
        log::debug!("Requesting strategic analysis for {video_uri}");
        self.generate(vec![Part::video_uri(video_uri), Part::text(STRATEGIC_PROMPT)])
            .await
    }
}
