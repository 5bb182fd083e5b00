// src/ingest/providers/youtube.rs
//! YouTube Shorts metadata via `yt-dlp` in flat-playlist mode: one subprocess
//! per search query, JSON on stdout, no video download. Flat extraction often
//! omits like/comment counts; those default to zero and the scorer degrades
//! accordingly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use tokio::process::Command;

use crate::ingest::types::{Post, SourceProvider};

const SOURCE_NAME: &str = "YouTube Shorts";

#[derive(Debug, Deserialize)]
struct SearchDump {
    #[serde(default)]
    entries: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    url: Option<String>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
    /// YYYYMMDD
    upload_date: Option<String>,
}

pub struct YoutubeShortsProvider {
    queries: Vec<String>,
    limit: usize,
    binary: String,
}

impl YoutubeShortsProvider {
    pub fn new(queries: Vec<String>, limit: usize) -> Self {
        Self {
            queries,
            limit,
            binary: "yt-dlp".to_string(),
        }
    }

    /// Binary override for tests (point at a stub script).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>> {
        let target = format!("ytsearch{}:{}", self.limit, query);
        let output = Command::new(&self.binary)
            .args(["-J", "--flat-playlist", "--no-warnings", &target])
            .output()
            .await
            .with_context(|| format!("spawning {}", self.binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let body = String::from_utf8_lossy(&output.stdout);
        parse_search_dump(&body, Utc::now())
    }
}

/// Parse a yt-dlp `-J --flat-playlist` dump into posts.
pub fn parse_search_dump(json: &str, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();
    let dump: SearchDump = serde_json::from_str(json).context("parsing yt-dlp search dump")?;

    let mut out = Vec::with_capacity(dump.entries.len());
    for entry in dump.entries {
        let id = entry.id.unwrap_or_default();
        if id.is_empty() {
            continue;
        }

        let hours_since = entry
            .upload_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| {
                let age = (now.naive_utc() - dt).num_seconds() as f64 / 3600.0;
                age.max(0.0)
            })
            .unwrap_or(1.0);

        let title = entry.title.unwrap_or_default();
        out.push(Post {
            channel: entry.uploader.unwrap_or_else(|| "Unknown".to_string()),
            url: Some(
                entry
                    .url
                    .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}")),
            ),
            content: title.clone(),
            title,
            views: entry.view_count.unwrap_or(0),
            likes: entry.like_count.unwrap_or(0),
            comments: entry.comment_count.unwrap_or(0),
            hours_since,
            ..Post::new(SOURCE_NAME, id)
        });
    }

    histogram!("radar_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}

#[async_trait]
impl SourceProvider for YoutubeShortsProvider {
    async fn fetch_latest(&self) -> Result<Vec<Post>> {
        let mut all = Vec::new();
        for query in &self.queries {
            match self.search(query).await {
                Ok(mut posts) => all.append(&mut posts),
                Err(e) => {
                    tracing::warn!(error = ?e, %query, "youtube search error");
                    counter!("radar_provider_errors_total").increment(1);
                }
            }
        }
        Ok(all)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-26T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn parses_flat_dump_with_counts() {
        let json = r#"{
            "entries": [
                {
                    "id": "vid1",
                    "title": "easy dinner hack",
                    "uploader": "somechef",
                    "url": "https://www.youtube.com/watch?v=vid1",
                    "view_count": 120000,
                    "like_count": 8000,
                    "comment_count": 300,
                    "upload_date": "20260825"
                },
                {
                    "id": "vid2",
                    "title": "no counts in flat mode"
                }
            ]
        }"#;
        let posts = parse_search_dump(json, fixed_now()).unwrap();
        assert_eq!(posts.len(), 2);

        assert_eq!(posts[0].views, 120_000);
        assert_eq!(posts[0].likes, 8000);
        assert!((posts[0].hours_since - 36.0).abs() < 1e-9);

        // Missing metrics degrade to zero, age to the 1h default.
        assert_eq!(posts[1].views, 0);
        assert!((posts[1].hours_since - 1.0).abs() < 1e-9);
        assert_eq!(posts[1].url.as_deref(), Some("https://www.youtube.com/watch?v=vid2"));
    }

    #[test]
    fn entries_without_id_are_skipped() {
        let json = r#"{"entries": [{"title": "orphan"}]}"#;
        let posts = parse_search_dump(json, fixed_now()).unwrap();
        assert!(posts.is_empty());
    }
}
