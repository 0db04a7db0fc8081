use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("summarization service returned {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("summarization service returned no content")]
    Empty,
}

/// Capability boundary for the external summarization call. Handlers only
/// see this trait; provider specifics live in the concrete adapters.
#[async_trait]
pub trait SummarizationService: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError>;
}

// -- Gemini adapter --

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Default, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl SummarizationService for GeminiClient {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizerError> {
        let url = format!("{GEMINI_BASE}/{}:generateContent", self.model);

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizerError::Empty);
        }
        Ok(text.to_string())
    }
}
