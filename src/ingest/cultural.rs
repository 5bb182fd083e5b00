// src/ingest/cultural.rs
//! Cultural-trend collector: what else is the internet talking about today.
//! Reddit front-page/sports/movies JSON listings plus the Google Trends daily
//! RSS, flattened into [`CalendarEvent`] records that season the AI prompt
//! and land in the events calendar.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::counter;
use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};

fn default_event_source() -> String {
    "trend_radar".to_string()
}

/// An upcoming or currently-trending event worth tying content to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub event_name: String,
    /// "reddit_viral" | "sports" | "entertainment" | "google_trend" | "cultural_trend"
    pub event_type: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub opportunity: String,
    #[serde(default)]
    pub urgency: String,
    #[serde(default = "default_event_source")]
    pub source: String,
}

impl CalendarEvent {
    pub fn new(name: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_name: name.into(),
            event_type: event_type.into(),
            event_date: None,
            opportunity: String::new(),
            urgency: String::new(),
            source: default_event_source(),
        }
    }
}

// --- Reddit listing JSON ---

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    ups: u64,
}

/// Parse a Reddit listing into events of the given type, best posts first.
pub fn parse_reddit_listing(json: &str, event_type: &str, max: usize) -> Result<Vec<CalendarEvent>> {
    let listing: Listing = serde_json::from_str(json).context("parsing reddit listing")?;

    let mut out = Vec::new();
    for child in listing.data.children.into_iter().take(max) {
        let post = child.data;
        if post.title.is_empty() {
            continue;
        }
        let mut ev = CalendarEvent::new(post.title, event_type);
        ev.opportunity = format!("trending on r/{} ({} upvotes)", post.subreddit, post.ups);
        out.push(ev);
    }
    Ok(out)
}

// --- Google Trends daily RSS ---

#[derive(Debug, Deserialize)]
struct TrendsRss {
    channel: TrendsChannel,
}

#[derive(Debug, Deserialize)]
struct TrendsChannel {
    #[serde(rename = "item", default)]
    items: Vec<TrendItem>,
}

#[derive(Debug, Deserialize)]
struct TrendItem {
    title: Option<String>,
    // quick-xml's serde deserializer strips namespace prefixes, so the
    // `ht:approx_traffic` element arrives under its local name.
    #[serde(rename = "approx_traffic")]
    approx_traffic: Option<String>,
}

/// Parse the Google Trends daily RSS into `google_trend` events.
pub fn parse_trends_rss(xml: &str, max: usize) -> Result<Vec<CalendarEvent>> {
    let rss: TrendsRss = from_str(xml).context("parsing google trends rss")?;

    let mut out = Vec::new();
    for item in rss.channel.items.into_iter().take(max) {
        let Some(title) = item.title.filter(|t| !t.is_empty()) else {
            continue;
        };
        let mut ev = CalendarEvent::new(title, "google_trend");
        ev.opportunity = format!(
            "{} searches today",
            item.approx_traffic.as_deref().unwrap_or("unknown")
        );
        out.push(ev);
    }
    Ok(out)
}

pub struct CulturalTrendsCollector {
    client: reqwest::Client,
    reddit_base: String,
    trends_base: String,
}

impl CulturalTrendsCollector {
    pub fn new() -> Result<Self> {
        Self::with_base_urls("https://www.reddit.com", "https://trends.google.com")
    }

    /// Base URL overrides for tests.
    pub fn with_base_urls(
        reddit_base: impl Into<String>,
        trends_base: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: super::providers::http_client()?,
            reddit_base: reddit_base.into(),
            trends_base: trends_base.into(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("status for {url}"))?;
        resp.text().await.context("body .text()")
    }

    /// Fetch all cultural trend sources. Each sub-source that fails is
    /// logged and skipped, so one blocked endpoint never empties the batch.
    pub async fn fetch(&self) -> Vec<CalendarEvent> {
        let mut events = Vec::new();

        let listings = [
            (format!("{}/r/all.json", self.reddit_base), "reddit_viral", 10),
            (format!("{}/r/sports.json", self.reddit_base), "sports", 5),
            (format!("{}/r/movies.json", self.reddit_base), "entertainment", 5),
        ];
        for (url, event_type, max) in listings {
            match self.get_text(&url).await {
                Ok(body) => match parse_reddit_listing(&body, event_type, max) {
                    Ok(mut evs) => events.append(&mut evs),
                    Err(e) => {
                        tracing::warn!(error = ?e, %url, "cultural listing parse error");
                        counter!("radar_provider_errors_total").increment(1);
                    }
                },
                Err(e) => {
                    tracing::warn!(error = ?e, %url, "cultural listing fetch error");
                    counter!("radar_provider_errors_total").increment(1);
                }
            }
        }

        let trends_url = format!(
            "{}/trends/trendingsearches/daily/rss?geo=US",
            self.trends_base
        );
        match self.get_text(&trends_url).await {
            Ok(body) => match parse_trends_rss(&body, 10) {
                Ok(mut evs) => events.append(&mut evs),
                Err(e) => {
                    tracing::warn!(error = ?e, "google trends parse error");
                    counter!("radar_provider_errors_total").increment(1);
                }
            },
            Err(e) => {
                tracing::warn!(error = ?e, "google trends fetch error");
                counter!("radar_provider_errors_total").increment(1);
            }
        }

        tracing::info!(events = events.len(), "cultural trends collected");
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reddit_listing_into_events() {
        let json = r#"{
            "data": {"children": [
                {"data": {"title": "Big final tonight", "subreddit": "sports", "ups": 52000}},
                {"data": {"title": "", "subreddit": "sports", "ups": 1}},
                {"data": {"title": "Another one", "subreddit": "sports", "ups": 900}}
            ]}
        }"#;
        let events = parse_reddit_listing(json, "sports", 5).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "Big final tonight");
        assert_eq!(events[0].event_type, "sports");
        assert!(events[0].opportunity.contains("52000 upvotes"));
    }

    #[test]
    fn listing_respects_max() {
        let json = r#"{"data": {"children": [
            {"data": {"title": "a", "subreddit": "all", "ups": 1}},
            {"data": {"title": "b", "subreddit": "all", "ups": 2}}
        ]}}"#;
        let events = parse_reddit_listing(json, "reddit_viral", 1).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn parses_trends_rss_with_traffic() {
        let xml = r#"<rss xmlns:ht="https://trends.google.com/trends/trendingsearches/daily" version="2.0">
  <channel>
    <title>Daily Search Trends</title>
    <item>
      <title>labor day recipes</title>
      <ht:approx_traffic>200,000+</ht:approx_traffic>
    </item>
    <item>
      <title>game day</title>
    </item>
  </channel>
</rss>"#;
        let events = parse_trends_rss(xml, 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "google_trend");
        assert!(events[0].opportunity.contains("200,000+"));
        assert!(events[1].opportunity.contains("unknown"));
    }
}
