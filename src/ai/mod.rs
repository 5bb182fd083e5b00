// src/ai/mod.rs
//! Generative-AI adapter: turns the day's viral candidates plus cultural
//! events into two-audience content ideas. Provider abstraction with a real
//! Gemini client, a deterministic mock for tests, and a disabled no-op, in
//! the same factory style as the rest of the external collaborators.

pub mod gemini;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingest::cultural::CalendarEvent;
use crate::ingest::types::Post;

/// One actionable content idea for a specific audience.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub execution_steps: Vec<String>,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub why_it_works: String,
    #[serde(default)]
    pub cultural_tie_in: String,
    #[serde(default)]
    pub target_audience: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CulturalHighlight {
    pub trend: String,
    #[serde(default)]
    pub opportunity: String,
    #[serde(default)]
    pub urgency: String,
}

/// Full model response: ideas for both audiences plus the trend digest.
/// Every field is defaulted so a partially-valid model reply still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaBatch {
    #[serde(default)]
    pub b2c_content_ideas: Vec<ContentIdea>,
    #[serde(default)]
    pub b2b_content_ideas: Vec<ContentIdea>,
    #[serde(default)]
    pub cultural_highlights: Vec<CulturalHighlight>,
    #[serde(default)]
    pub trending_themes: Vec<String>,
    #[serde(default)]
    pub key_insights: String,
}

impl IdeaBatch {
    pub fn has_ideas(&self) -> bool {
        !self.b2c_content_ideas.is_empty() || !self.b2b_content_ideas.is_empty()
    }
}

#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    async fn generate(&self, candidates: &[Post], events: &[CalendarEvent]) -> Result<IdeaBatch>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynIdeaGenerator = Arc<dyn IdeaGenerator>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    /// "gemini" is the only real provider today.
    pub provider: String,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Factory: build a generator according to config and environment.
///
/// * `AI_TEST_MODE=mock` short-circuits to the deterministic mock.
/// * `enabled=false` or a missing API key yields the disabled generator.
pub fn build_generator(config: &AiConfig) -> DynIdeaGenerator {
    if std::env::var("AI_TEST_MODE").map(|v| v == "mock").unwrap_or(false) {
        return Arc::new(MockGenerator::default());
    }

    if !config.enabled {
        return Arc::new(DisabledGenerator);
    }

    match config.provider.to_ascii_lowercase().as_str() {
        "gemini" => match gemini::GeminiGenerator::from_env(&config.model) {
            Ok(g) => Arc::new(g),
            Err(e) => {
                tracing::warn!(error = ?e, "gemini unavailable; AI analysis disabled");
                Arc::new(DisabledGenerator)
            }
        },
        other => {
            tracing::warn!(provider = other, "unknown AI provider; AI analysis disabled");
            Arc::new(DisabledGenerator)
        }
    }
}

/// No-op generator: the pipeline runs, nothing is generated.
pub struct DisabledGenerator;

#[async_trait]
impl IdeaGenerator for DisabledGenerator {
    async fn generate(&self, _: &[Post], _: &[CalendarEvent]) -> Result<IdeaBatch> {
        Ok(IdeaBatch {
            key_insights: "AI analysis unavailable".to_string(),
            ..IdeaBatch::default()
        })
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic generator for tests: one idea per audience, derived from
/// the top candidate so pipeline tests can assert data flow end to end.
#[derive(Default)]
pub struct MockGenerator;

#[async_trait]
impl IdeaGenerator for MockGenerator {
    async fn generate(&self, candidates: &[Post], events: &[CalendarEvent]) -> Result<IdeaBatch> {
        let top = candidates.first().map(|p| p.title.clone()).unwrap_or_default();
        Ok(IdeaBatch {
            b2c_content_ideas: vec![ContentIdea {
                title: format!("Riff on: {top}"),
                format: "Reel".to_string(),
                platform: "Instagram".to_string(),
                target_audience: "Customers".to_string(),
                ..ContentIdea::default()
            }],
            b2b_content_ideas: vec![ContentIdea {
                title: "A day in the life of a home chef".to_string(),
                format: "TikTok".to_string(),
                platform: "TikTok".to_string(),
                target_audience: "Chefs".to_string(),
                ..ContentIdea::default()
            }],
            cultural_highlights: events
                .iter()
                .take(1)
                .map(|e| CulturalHighlight {
                    trend: e.event_name.clone(),
                    opportunity: e.opportunity.clone(),
                    urgency: "This week".to_string(),
                })
                .collect(),
            trending_themes: vec!["mock".to_string()],
            key_insights: format!("{} candidates analyzed", candidates.len()),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Build the analysis prompt: a digest of the top candidates and upcoming
/// events plus the two-audience brief and the required JSON shape.
pub fn build_prompt(candidates: &[Post], events: &[CalendarEvent]) -> String {
    use std::fmt::Write as _;

    let mut posts_text = String::new();
    for (i, post) in candidates.iter().take(50).enumerate() {
        let _ = write!(
            posts_text,
            "\nPost {} ({}):\nTitle: {}\nEngagement: {} likes, {} comments, {} views\nViral Score: {}/10\n",
            i + 1,
            post.source,
            if post.title.is_empty() { "No title" } else { &post.title },
            post.likes,
            post.comments,
            post.views,
            post.viral_score.unwrap_or(0.0),
        );
    }

    let mut cultural_text = String::new();
    if !events.is_empty() {
        cultural_text.push_str("\n\nUPCOMING CULTURAL EVENTS:\n");
        for ev in events.iter().take(10) {
            let date = ev
                .event_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "Unknown Date".to_string());
            let _ = writeln!(cultural_text, "- {} ({}): {}", ev.event_name, date, ev.opportunity);
        }
    }

    format!(
        r#"You are a content strategist for HomeMade Meals, a platform connecting home chefs with customers.

Analyze these trending cooking posts from today:
{posts_text}{cultural_text}

Generate content ideas for TWO DISTINCT AUDIENCES:

**AUDIENCE 1: B2C (Customers/Clients)**
People who want to order homemade meals. Content should make them hungry, show food quality, and drive orders.

**AUDIENCE 2: B2B (Chefs/Entrepreneurs)**
Home chefs who might join the platform. Content should inspire them, show earning potential, flexibility, and success stories.

For EACH audience, generate 10 ACTIONABLE CONTENT IDEAS.

IMPORTANT: Use the cultural trends (sports, holidays, movies, memes) to make content timely and relevant.

OUTPUT ONLY VALID JSON in this exact format:
{{
  "b2c_content_ideas": [{{"title": "...", "format": "...", "concept": "...", "execution_steps": ["..."], "platform": "...", "why_it_works": "...", "cultural_tie_in": "...", "target_audience": "Customers"}}],
  "b2b_content_ideas": [{{"title": "...", "format": "...", "concept": "...", "execution_steps": ["..."], "platform": "...", "why_it_works": "...", "cultural_tie_in": "...", "target_audience": "Chefs"}}],
  "cultural_highlights": [{{"trend": "...", "opportunity": "...", "urgency": "..."}}],
  "trending_themes": ["..."],
  "key_insights": "2-3 sentence summary of what's trending today"
}}"#
    )
}

/// Models love wrapping JSON in markdown fences; strip them before parsing.
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
