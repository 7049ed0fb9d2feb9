use std::path::Path;

use base64::Engine;
use thiserror::Error;

use crate::rasterize::PageImage;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("MissingCredentials: {0}")]
    MissingCredentials(String),
    #[error("request failed: {0}")]
    Http(String),
    #[error("text detection error: {0}")]
    Service(String),
}

/// External text-detection seam. One call per page image, returning the
/// full recognized text.
pub trait TextDetector: Send + Sync {
    fn detect_text(&self, image: &[u8], language_hints: &[String]) -> Result<String, OcrError>;
}

const VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Google Cloud Vision TEXT_DETECTION over the REST endpoint.
pub struct VisionClient {
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    /// Build a client from a credentials JSON file holding an `api_key`.
    ///
    /// A missing or unreadable file is a fatal, job-aborting condition;
    /// callers check this once per batch, never per page.
    pub fn from_credentials(path: &Path) -> Result<VisionClient, OcrError> {
        if !path.exists() {
            return Err(OcrError::MissingCredentials(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OcrError::MissingCredentials(format!("{}: {}", path.display(), e)))?;
        let creds: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| OcrError::MissingCredentials(format!("{}: {}", path.display(), e)))?;
        let api_key = creds
            .get("api_key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                OcrError::MissingCredentials(format!("{}: no api_key field", path.display()))
            })?
            .to_string();
        Ok(VisionClient {
            endpoint: VISION_ENDPOINT.to_string(),
            api_key,
        })
    }

    /// Point the client at a different annotate endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: &str) -> VisionClient {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl TextDetector for VisionClient {
    fn detect_text(&self, image: &[u8], language_hints: &[String]) -> Result<String, OcrError> {
        let content = base64::engine::general_purpose::STANDARD.encode(image);
        let body = serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [{ "type": "TEXT_DETECTION" }],
                "imageContext": { "languageHints": language_hints },
            }]
        });

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response: serde_json::Value = ureq::post(&url)
            .send_json(body)
            .map_err(|e| OcrError::Http(e.to_string()))?
            .into_json()
            .map_err(|e| OcrError::Http(e.to_string()))?;

        let first = response
            .get("responses")
            .and_then(|r| r.get(0))
            .ok_or_else(|| OcrError::Service("empty response".to_string()))?;
        if let Some(err) = first.get("error").and_then(|e| e.get("message")) {
            return Err(OcrError::Service(err.as_str().unwrap_or("unknown").to_string()));
        }
        if let Some(text) = first
            .pointer("/fullTextAnnotation/text")
            .and_then(|t| t.as_str())
        {
            if !text.trim().is_empty() {
                return Ok(text.to_string());
            }
        }
        // Fall back to the first (whole-image) text annotation.
        if let Some(text) = first
            .pointer("/textAnnotations/0/description")
            .and_then(|t| t.as_str())
        {
            if !text.trim().is_empty() {
                return Ok(text.to_string());
            }
        }
        // A well-formed response with no text is an empty page, not a
        // failure; the dispatcher renders the empty-page marker for it.
        Ok(String::new())
    }
}

/// Outcome for one page: either recognized text or an inline error marker
/// that takes the page's place in the assembled document.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number, matching the source image index.
    pub index: usize,
    pub text: String,
    pub ok: bool,
}

/// Marker for a page where the service returned nothing.
pub fn empty_page_marker(page: usize) -> String {
    format!("*페이지 {}에서 텍스트를 추출하지 못했습니다.*", page)
}

/// Marker for a page whose OCR call failed outright.
pub fn failed_page_marker(page: usize, err: &OcrError) -> String {
    format!("*페이지 {}에서 텍스트 추출 중 오류가 발생했습니다: {}*", page, err)
}

/// Default per-file page pool size.
pub fn default_page_workers() -> usize {
    num_cpus::get().min(4)
}

/// OCR every page concurrently on a bounded pool and reassemble strictly by
/// page index.
///
/// Worker count is proportional to the page count, capped by `max_workers`.
/// Each page's outcome is captured independently: a failure or empty result
/// becomes that page's inline marker and never cancels sibling pages. The
/// ordered collect guarantees output slot N corresponds to input image N
/// regardless of which call finishes first.
pub fn extract_pages(
    detector: &dyn TextDetector,
    pages: &[PageImage],
    language_hints: &[String],
    max_workers: usize,
) -> Vec<PageText> {
    let workers = max_workers.min(pages.len()).max(1);

    let run = || {
        use rayon::prelude::*;
        pages
            .par_iter()
            .map(|page| match detector.detect_text(&page.bytes, language_hints) {
                Ok(text) if !text.trim().is_empty() => PageText {
                    index: page.index,
                    text,
                    ok: true,
                },
                Ok(_) => PageText {
                    index: page.index,
                    text: empty_page_marker(page.index),
                    ok: false,
                },
                Err(err) => PageText {
                    index: page.index,
                    text: failed_page_marker(page.index, &err),
                    ok: false,
                },
            })
            .collect::<Vec<_>>()
    };

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        // Pool construction failing degrades to the caller's thread.
        Err(_) => run(),
    }
}
