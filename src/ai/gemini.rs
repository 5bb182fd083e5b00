// src/ai/gemini.rs
//! Gemini provider over the REST `generateContent` endpoint. Requires
//! `GEMINI_API_KEY`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_prompt, strip_code_fences, IdeaBatch, IdeaGenerator};
use crate::ingest::cultural::CalendarEvent;
use crate::ingest::types::Post;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY missing")?;
        Self::new(api_key, model, DEFAULT_BASE_URL)
    }

    /// Base URL override for tests.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("trend-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// Pull the first candidate's text out of a `generateContent` body.
    fn extract_text(body: &str) -> Result<String> {
        let resp: GenerateResponse =
            serde_json::from_str(body).context("parsing generateContent response")?;
        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .context("empty gemini response")
    }

    /// Parse a `generateContent` response body into an [`IdeaBatch`].
    pub fn parse_response(body: &str) -> Result<IdeaBatch> {
        let text = Self::extract_text(body)?;
        serde_json::from_str(strip_code_fences(&text)).context("parsing idea batch json")
    }

    /// One-shot text generation: send a prompt, return the fence-stripped
    /// reply. Used by callers that parse their own response shapes.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let req = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let body = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .context("gemini request failed")?
            .error_for_status()
            .context("gemini http status")?
            .text()
            .await
            .context("gemini body .text()")?;

        let text = Self::extract_text(&body)?;
        Ok(strip_code_fences(&text).to_string())
    }
}

#[async_trait]
impl IdeaGenerator for GeminiGenerator {
    async fn generate(&self, candidates: &[Post], events: &[CalendarEvent]) -> Result<IdeaBatch> {
        let prompt = build_prompt(candidates, events);
        let text = self.generate_text(&prompt).await?;
        serde_json::from_str(&text).context("parsing idea batch json")
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
