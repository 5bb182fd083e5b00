// src/ingest/providers/reddit.rs
//! Reddit "hot" listings via the public per-subreddit Atom feed. The feed
//! carries no live karma or comment counts, so every post goes out with zero
//! counts and a 1-based `rank`; the scoring engine's rank path exists for
//! exactly this source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::{Post, SourceProvider};

const SOURCE_NAME: &str = "Reddit (RSS)";
const FALLBACK_AGE_HOURS: f64 = 24.0;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    link: Option<Link>,
    updated: Option<String>,
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "$text")]
    body: Option<String>,
}

pub struct RedditHotProvider {
    client: reqwest::Client,
    base_url: String,
    subreddits: Vec<String>,
    limit: usize,
}

impl RedditHotProvider {
    pub fn new(subreddits: Vec<String>, limit: usize) -> Result<Self> {
        Self::with_base_url("https://www.reddit.com", subreddits, limit)
    }

    /// Base URL override for tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        subreddits: Vec<String>,
        limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: base_url.into(),
            subreddits,
            limit,
        })
    }
}

/// Parse one subreddit's Atom feed into rank-ordered posts.
pub fn parse_hot_feed(xml: &str, subreddit: &str, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();
    let feed: Feed = from_str(xml).with_context(|| format!("parsing r/{subreddit} atom feed"))?;

    let mut out = Vec::with_capacity(feed.entries.len());
    for (i, entry) in feed.entries.into_iter().enumerate() {
        let title = entry.title.unwrap_or_default();
        let url = entry.link.and_then(|l| l.href);
        let body = entry.content.and_then(|c| c.body).unwrap_or_default();

        let hours_since = entry
            .updated
            .as_deref()
            .and_then(parse_rfc3339_age_hours(now))
            .unwrap_or(FALLBACK_AGE_HOURS);

        // Permalink shape: .../comments/<id>/<slug>/
        let id = url
            .as_deref()
            .and_then(|u| u.trim_end_matches('/').rsplit('/').nth(1))
            .unwrap_or("unknown")
            .to_string();

        let mut content = title.clone();
        content.push('\n');
        content.extend(body.chars().take(500));

        out.push(Post {
            channel: format!("r/{subreddit}"),
            url,
            title,
            content,
            hours_since,
            rank: Some(i as u32 + 1),
            ..Post::new(SOURCE_NAME, id)
        });
    }

    histogram!("radar_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}

fn parse_rfc3339_age_hours(now: DateTime<Utc>) -> impl Fn(&str) -> Option<f64> {
    move |ts| {
        let t = DateTime::parse_from_rfc3339(ts).ok()?;
        let age = (now - t.with_timezone(&Utc)).num_seconds() as f64 / 3600.0;
        Some(age.max(0.0))
    }
}

#[async_trait]
impl SourceProvider for RedditHotProvider {
    async fn fetch_latest(&self) -> Result<Vec<Post>> {
        let now = Utc::now();
        let mut all = Vec::new();

        for sub in &self.subreddits {
            let url = format!("{}/r/{}/hot.rss?limit={}", self.base_url, sub, self.limit);
            let body = match self.client.get(&url).send().await {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.text().await.context("reddit body .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, subreddit = %sub, "reddit http status");
                        counter!("radar_provider_errors_total").increment(1);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, subreddit = %sub, "reddit http error");
                    counter!("radar_provider_errors_total").increment(1);
                    continue;
                }
            };

            match parse_hot_feed(&body, sub, now) {
                Ok(mut posts) => all.append(&mut posts),
                Err(e) => {
                    tracing::warn!(error = ?e, subreddit = %sub, "reddit parse error");
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
