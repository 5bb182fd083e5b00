// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

fn default_hours_since() -> f64 {
    1.0
}

/// One social-media post, as produced by a source collector.
///
/// Sources expose wildly different telemetry, so every engagement field has a
/// safe default: counts absent from the upstream payload deserialize to 0,
/// `hours_since` to 1.0. Rank-ordered feeds (Reddit "hot") fill `rank` and
/// leave the counts at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub source: String, // e.g. "TikTok", "YouTube Shorts", "Reddit (RSS)"
    #[serde(default)]
    pub channel: String, // e.g. "@gordonramsayofficial", "r/HomeCooking"
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Free text used for relatability keyword matching.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    /// Age of the post in hours at collection time.
    #[serde(default = "default_hours_since")]
    pub hours_since: f64,
    /// 1-based position in a rank-ordered feed; only set by rank-based sources.
    #[serde(default)]
    pub rank: Option<u32>,
    /// Attached by the scoring engine; never set by collectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viral_score: Option<f64>,
}

impl Post {
    /// Minimal constructor for collectors; engagement fields start at defaults.
    pub fn new(source: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            channel: String::new(),
            id: id.into(),
            url: None,
            title: String::new(),
            content: String::new(),
            views: 0,
            likes: 0,
            comments: 0,
            hours_since: default_hours_since(),
            rank: None,
            viral_score: None,
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}
