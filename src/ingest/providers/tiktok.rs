// src/ingest/providers/tiktok.rs
//! TikTok hashtag listings via the web client's `challenge/item_list` JSON
//! endpoint. This is the richest source: real play/digg/comment counts and a
//! unix creation timestamp per item.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::types::{Post, SourceProvider};

const SOURCE_NAME: &str = "TikTok";
const FALLBACK_AGE_HOURS: f64 = 24.0;

#[derive(Debug, Deserialize)]
struct ItemListResponse {
    #[serde(rename = "itemList", default)]
    item_list: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: Option<String>,
    #[serde(default)]
    desc: String,
    #[serde(rename = "createTime", default)]
    create_time: Option<i64>,
    #[serde(default)]
    stats: Stats,
    #[serde(default)]
    author: Author,
}

#[derive(Debug, Default, Deserialize)]
struct Stats {
    #[serde(rename = "diggCount", default)]
    digg_count: u64,
    #[serde(rename = "commentCount", default)]
    comment_count: u64,
    #[serde(rename = "playCount", default)]
    play_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct Author {
    #[serde(rename = "uniqueId", default)]
    unique_id: String,
}

pub struct TiktokHashtagProvider {
    client: reqwest::Client,
    base_url: String,
    hashtags: Vec<String>,
    limit: usize,
}

impl TiktokHashtagProvider {
    pub fn new(hashtags: Vec<String>, limit: usize) -> Result<Self> {
        Self::with_base_url("https://www.tiktok.com", hashtags, limit)
    }

    /// Base URL override for tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        hashtags: Vec<String>,
        limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: base_url.into(),
            hashtags,
            limit,
        })
    }
}

/// Parse an `item_list` response body for one hashtag.
pub fn parse_item_list(json: &str, hashtag: &str, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();
    let resp: ItemListResponse =
        serde_json::from_str(json).with_context(|| format!("parsing #{hashtag} item list"))?;

    let mut out = Vec::with_capacity(resp.item_list.len());
    for item in resp.item_list {
        let id = item.id.unwrap_or_default();
        if id.is_empty() {
            continue;
        }

        let hours_since = item
            .create_time
            .filter(|t| *t > 0)
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .map(|t| ((now - t).num_seconds() as f64 / 3600.0).max(0.0))
            .unwrap_or(FALLBACK_AGE_HOURS);

        let author = if item.author.unique_id.is_empty() {
            "unknown".to_string()
        } else {
            item.author.unique_id
        };

        let mut title: String = item.desc.chars().take(100).collect();
        if title.is_empty() {
            title = "TikTok Video".to_string();
        }

        out.push(Post {
            channel: format!("@{author}"),
            url: Some(format!("https://www.tiktok.com/@{author}/video/{id}")),
            title,
            content: item.desc,
            likes: item.stats.digg_count,
            comments: item.stats.comment_count,
            views: item.stats.play_count,
            hours_since,
            ..Post::new(SOURCE_NAME, id)
        });
    }

    histogram!("radar_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}

#[async_trait]
impl SourceProvider for TiktokHashtagProvider {
    async fn fetch_latest(&self) -> Result<Vec<Post>> {
        let now = Utc::now();
        let mut all = Vec::new();

        for tag in &self.hashtags {
            let url = format!("{}/api/challenge/item_list/", self.base_url);
            let result = self
                .client
                .get(&url)
                .query(&[
                    ("challengeName", tag.as_str()),
                    ("count", &self.limit.to_string()),
                    ("cursor", "0"),
                ])
                .header("Referer", format!("{}/tag/{}", self.base_url, tag))
                .send()
                .await;

            let body = match result {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.text().await.context("tiktok body .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, hashtag = %tag, "tiktok http status");
                        counter!("radar_provider_errors_total").increment(1);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, hashtag = %tag, "tiktok http error");
                    counter!("radar_provider_errors_total").increment(1);
                    continue;
                }
            };

            match parse_item_list(&body, tag, now) {
                Ok(mut posts) => all.append(&mut posts),
                Err(e) => {
                    tracing::warn!(error = ?e, hashtag = %tag, "tiktok parse error");
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
