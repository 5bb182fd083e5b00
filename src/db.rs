// src/db.rs
//! Supabase access layer over the PostgREST API: content ideas and the
//! events calendar. Persistence is optional: absent credentials disable the
//! handle and the pipeline simply runs without saving anything.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::ai::ContentIdea;
use crate::ingest::cultural::CalendarEvent;

/// How far back a same-titled idea counts as a duplicate.
const IDEA_DEDUP_DAYS: i64 = 14;

/// Similarity bar for near-duplicate idea titles.
const TITLE_SIMILARITY_CUTOFF: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    B2c,
    B2b,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Audience::B2c => "B2C",
            Audience::B2b => "B2B",
        }
    }
}

/// A content idea as stored (and read back) from the `content_ideas` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIdea {
    pub title: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub concept: String,
    /// JSON-encoded array of steps, matching the column type.
    #[serde(default)]
    pub execution_steps: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub why_it_works: String,
    #[serde(default)]
    pub cultural_tie_in: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub viral_score: f64,
    #[serde(default)]
    pub week_number: u32,
    #[serde(default)]
    pub year: i32,
}

impl StoredIdea {
    /// Back-convert to the idea shape the report builder renders.
    pub fn into_idea(self) -> ContentIdea {
        let execution_steps = serde_json::from_str(&self.execution_steps).unwrap_or_default();
        ContentIdea {
            title: self.title,
            format: self.format,
            concept: self.concept,
            execution_steps,
            platform: self.platform,
            why_it_works: self.why_it_works,
            cultural_tie_in: self.cultural_tie_in,
            target_audience: self.target_audience,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TitleRow {
    title: String,
}

/// Case-insensitive or near-identical (normalized Levenshtein) title match.
pub fn is_duplicate_title(candidate: &str, existing: &str) -> bool {
    let a = candidate.trim().to_lowercase();
    let b = existing.trim().to_lowercase();
    if a == b {
        return true;
    }
    strsim::normalized_levenshtein(&a, &b) >= TITLE_SIMILARITY_CUTOFF
}

struct Rest {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl Rest {
    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

pub struct Database {
    inner: Option<Rest>,
}

impl Database {
    /// Build from SUPABASE_URL + SUPABASE_SERVICE_ROLE_KEY; a disabled
    /// handle when either is missing.
    pub fn from_env() -> Self {
        match (
            std::env::var("SUPABASE_URL"),
            std::env::var("SUPABASE_SERVICE_ROLE_KEY"),
        ) {
            (Ok(url), Ok(key)) => Self::new(url, key),
            _ => {
                tracing::warn!("supabase credentials not found; persistence disabled");
                Self { inner: None }
            }
        }
    }

    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("trend-radar/0.1")
            .timeout(std::time::Duration::from_secs(15))
            .build();
        match http {
            Ok(http) => Self {
                inner: Some(Rest {
                    http,
                    base_url: base_url.into().trim_end_matches('/').to_string(),
                    key: key.into(),
                }),
            },
            Err(e) => {
                tracing::warn!(error = ?e, "supabase client build failed; persistence disabled");
                Self { inner: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Insert a content idea unless an equal or near-equal title was stored
    /// within the last two weeks. Returns whether a row was written.
    pub async fn save_content_idea(
        &self,
        idea: &ContentIdea,
        audience: Audience,
        viral_score: f64,
    ) -> Result<bool> {
        let Some(rest) = &self.inner else {
            return Ok(false);
        };
        let title = idea.title.trim();
        if title.is_empty() {
            return Ok(false);
        }

        let cutoff = (Utc::now() - Duration::days(IDEA_DEDUP_DAYS)).to_rfc3339();
        let created_filter = format!("gte.{cutoff}");
        let recent: Vec<TitleRow> = rest
            .request(reqwest::Method::GET, "content_ideas")
            .query(&[("select", "title"), ("created_at", created_filter.as_str())])
            .send()
            .await
            .context("querying recent idea titles")?
            .error_for_status()
            .context("recent titles status")?
            .json()
            .await
            .context("parsing recent titles")?;

        if recent.iter().any(|row| is_duplicate_title(title, &row.title)) {
            tracing::debug!(%title, "skipping duplicate idea");
            return Ok(false);
        }

        let now = Local::now();
        let row = serde_json::json!({
            "title": title.chars().take(255).collect::<String>(),
            "format": idea.format.chars().take(255).collect::<String>(),
            "concept": idea.concept,
            "execution_steps": serde_json::to_string(&idea.execution_steps)
                .unwrap_or_else(|_| "[]".to_string()),
            "platform": idea.platform.chars().take(255).collect::<String>(),
            "why_it_works": idea.why_it_works,
            "cultural_tie_in": idea.cultural_tie_in,
            "target_audience": audience.as_str(),
            "viral_score": viral_score,
            "week_number": now.iso_week().week(),
            "year": now.year(),
        });

        rest.request(reqwest::Method::POST, "content_ideas")
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .context("inserting content idea")?
            .error_for_status()
            .context("content idea insert status")?;

        Ok(true)
    }

    /// Upsert an event keyed on (event_name, event_date).
    pub async fn save_event(&self, event: &CalendarEvent) -> Result<bool> {
        let Some(rest) = &self.inner else {
            return Ok(false);
        };
        if event.event_name.is_empty() {
            return Ok(false);
        }

        rest.request(reqwest::Method::POST, "events_calendar")
            .query(&[("on_conflict", "event_name,event_date")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(event)
            .send()
            .await
            .context("upserting event")?
            .error_for_status()
            .context("event upsert status")?;

        Ok(true)
    }

    /// Top ideas of the current ISO week, best viral score first.
    pub async fn top_ideas_this_week(&self, limit: usize) -> Result<Vec<StoredIdea>> {
        let Some(rest) = &self.inner else {
            return Ok(Vec::new());
        };

        let now = Local::now();
        let week_filter = format!("eq.{}", now.iso_week().week());
        let year_filter = format!("eq.{}", now.year());
        let limit_s = limit.to_string();
        let ideas = rest
            .request(reqwest::Method::GET, "content_ideas")
            .query(&[
                ("select", "*"),
                ("week_number", week_filter.as_str()),
                ("year", year_filter.as_str()),
                ("order", "viral_score.desc"),
                ("limit", limit_s.as_str()),
            ])
            .send()
            .await
            .context("querying top ideas")?
            .error_for_status()
            .context("top ideas status")?
            .json()
            .await
            .context("parsing top ideas")?;

        Ok(ideas)
    }

    /// Insert a deep-analyzed short into `global_viral_trends`. Duplicates
    /// (same `source_id`) are dropped server-side; returns whether a new row
    /// landed.
    pub async fn save_global_trend(
        &self,
        short: &crate::research::ShortCandidate,
        analysis: &crate::research::DeepAnalysis,
    ) -> Result<bool> {
        let Some(rest) = &self.inner else {
            return Ok(false);
        };

        let row = serde_json::json!({
            "platform": "YouTube",
            "source_id": short.source_id,
            "url": short.url,
            "title": short.title.chars().take(255).collect::<String>(),
            "description": short.description.chars().take(500).collect::<String>(),
            "duration_seconds": short.duration_seconds,
            "views": short.views,
            "analysis_json": serde_json::to_string(analysis)
                .context("encoding analysis json")?,
        });

        let inserted: Vec<serde_json::Value> = rest
            .request(reqwest::Method::POST, "global_viral_trends")
            .query(&[("on_conflict", "source_id")])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(&row)
            .send()
            .await
            .context("inserting global trend")?
            .error_for_status()
            .context("global trend insert status")?
            .json()
            .await
            .context("parsing global trend insert reply")?;

        if inserted.is_empty() {
            tracing::debug!(video = %short.source_id, "trend already stored");
        }
        Ok(!inserted.is_empty())
    }

    /// Events dated within the next `days_ahead` days, soonest first.
    pub async fn upcoming_events(&self, days_ahead: i64) -> Result<Vec<CalendarEvent>> {
        let Some(rest) = &self.inner else {
            return Ok(Vec::new());
        };

        let today = Local::now().date_naive();
        let until = today + Duration::days(days_ahead);
        let gte = format!("gte.{today}");
        let lte = format!("lte.{until}");
        let events = rest
            .request(reqwest::Method::GET, "events_calendar")
            .query(&[
                ("select", "*"),
                ("event_date", gte.as_str()),
                ("event_date", lte.as_str()),
                ("order", "event_date.asc"),
            ])
            .send()
            .await
            .context("querying upcoming events")?
            .error_for_status()
            .context("upcoming events status")?
            .json()
            .await
            .context("parsing upcoming events")?;

        Ok(events)
    }
}
