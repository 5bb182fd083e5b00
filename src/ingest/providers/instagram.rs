// src/ingest/providers/instagram.rs
//! Instagram public business profiles via the web profile-info JSON endpoint.
//! Logged-out responses frequently omit engagement counts entirely; such
//! posts degrade to zero-signal in the scorer, which is expected: the
//! accounts are tracked as trend indicators, not engagement sources.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::types::{Post, SourceProvider};

const SOURCE_NAME: &str = "Instagram";
const FALLBACK_AGE_HOURS: f64 = 24.0;

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    data: ProfileData,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(rename = "edge_owner_to_timeline_media", default)]
    timeline: Timeline,
}

#[derive(Debug, Default, Deserialize)]
struct Timeline {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    shortcode: Option<String>,
    #[serde(rename = "taken_at_timestamp", default)]
    taken_at: Option<i64>,
    #[serde(rename = "edge_liked_by", default)]
    liked_by: Count,
    #[serde(rename = "edge_media_to_comment", default)]
    comments: Count,
    #[serde(rename = "video_view_count", default)]
    video_views: Option<u64>,
    #[serde(rename = "edge_media_to_caption", default)]
    caption: Caption,
}

#[derive(Debug, Default, Deserialize)]
struct Count {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct Caption {
    #[serde(default)]
    edges: Vec<CaptionEdge>,
}

#[derive(Debug, Deserialize)]
struct CaptionEdge {
    node: CaptionNode,
}

#[derive(Debug, Deserialize)]
struct CaptionNode {
    #[serde(default)]
    text: String,
}

pub struct InstagramProfileProvider {
    client: reqwest::Client,
    base_url: String,
    accounts: Vec<String>,
    limit: usize,
}

impl InstagramProfileProvider {
    pub fn new(accounts: Vec<String>, limit: usize) -> Result<Self> {
        Self::with_base_url("https://www.instagram.com", accounts, limit)
    }

    /// Base URL override for tests.
    pub fn with_base_url(
        base_url: impl Into<String>,
        accounts: Vec<String>,
        limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            client: super::http_client()?,
            base_url: base_url.into(),
            accounts,
            limit,
        })
    }
}

/// Parse a web-profile-info response for one account.
pub fn parse_profile(json: &str, account: &str, limit: usize, now: DateTime<Utc>) -> Result<Vec<Post>> {
    let t0 = std::time::Instant::now();
    let resp: ProfileResponse =
        serde_json::from_str(json).with_context(|| format!("parsing @{account} profile"))?;

    let edges = resp
        .data
        .user
        .map(|u| u.timeline.edges)
        .unwrap_or_default();

    let mut out = Vec::with_capacity(edges.len().min(limit));
    for edge in edges.into_iter().take(limit) {
        let node = edge.node;
        let shortcode = node.shortcode.unwrap_or_default();
        if shortcode.is_empty() {
            continue;
        }

        let hours_since = node
            .taken_at
            .filter(|t| *t > 0)
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .map(|t| ((now - t).num_seconds() as f64 / 3600.0).max(0.0))
            .unwrap_or(FALLBACK_AGE_HOURS);

        let caption = node
            .caption
            .edges
            .into_iter()
            .next()
            .map(|e| e.node.text)
            .unwrap_or_else(|| format!("Instagram content from @{account}"));

        out.push(Post {
            channel: format!("@{account}"),
            url: Some(format!("https://www.instagram.com/p/{shortcode}/")),
            title: format!("Post from {account}"),
            content: caption,
            likes: node.liked_by.count,
            comments: node.comments.count,
            views: node.video_views.unwrap_or(0),
            hours_since,
            ..Post::new(SOURCE_NAME, shortcode)
        });
    }

    histogram!("radar_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}

#[async_trait]
impl SourceProvider for InstagramProfileProvider {
    async fn fetch_latest(&self) -> Result<Vec<Post>> {
        let now = Utc::now();
        let mut all = Vec::new();

        for account in &self.accounts {
            let url = format!("{}/api/v1/users/web_profile_info/", self.base_url);
            let result = self
                .client
                .get(&url)
                .query(&[("username", account.as_str())])
                .send()
                .await;

            let body = match result {
                Ok(resp) => match resp.error_for_status() {
                    Ok(resp) => resp.text().await.context("instagram body .text()")?,
                    Err(e) => {
                        // Login walls surface as 4xx here; skip the account.
                        tracing::warn!(error = ?e, account = %account, "instagram http status");
                        counter!("radar_provider_errors_total").increment(1);
                        continue;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, account = %account, "instagram http error");
                    counter!("radar_provider_errors_total").increment(1);
                    continue;
                }
            };

            match parse_profile(&body, account, self.limit, now) {
                Ok(mut posts) => all.append(&mut posts),
                Err(e) => {
                    tracing::warn!(error = ?e, account = %account, "instagram parse error");
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
        Utc.timestamp_opt(1_700_086_400, 0).single().unwrap()
    }

    #[test]
    fn parses_profile_grid_with_caption_and_counts() {
        let json = r#"{
            "data": {"user": {"edge_owner_to_timeline_media": {"edges": [
                {"node": {
                    "shortcode": "Cx1",
                    "taken_at_timestamp": 1700000000,
                    "edge_liked_by": {"count": 5400},
                    "edge_media_to_comment": {"count": 120},
                    "edge_media_to_caption": {"edges": [{"node": {"text": "family dinner inspo"}}]}
                }},
                {"node": {"shortcode": "Cx2"}}
            ]}}}
        }"#;
        let posts = parse_profile(json, "buzzfeedtasty", 10, fixed_now()).unwrap();
        assert_eq!(posts.len(), 2);

        assert_eq!(posts[0].likes, 5400);
        assert_eq!(posts[0].comments, 120);
        assert_eq!(posts[0].content, "family dinner inspo");
        assert!((posts[0].hours_since - 24.0).abs() < 1e-6);

        // Bare node: zero counts, fallback age and caption.
        assert_eq!(posts[1].likes, 0);
        assert!((posts[1].hours_since - FALLBACK_AGE_HOURS).abs() < 1e-9);
        assert!(posts[1].content.contains("@buzzfeedtasty"));
    }

    #[test]
    fn limit_truncates_the_grid() {
        let json = r#"{
            "data": {"user": {"edge_owner_to_timeline_media": {"edges": [
                {"node": {"shortcode": "a"}},
                {"node": {"shortcode": "b"}},
                {"node": {"shortcode": "c"}}
            ]}}}
        }"#;
        let posts = parse_profile(json, "x", 2, fixed_now()).unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn missing_user_yields_no_posts() {
        let posts = parse_profile(r#"{"data": {"user": null}}"#, "x", 10, fixed_now()).unwrap();
        assert!(posts.is_empty());
    }
}
