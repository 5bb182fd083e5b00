// src/ingest/providers/mod.rs
pub mod instagram;
pub mod reddit;
pub mod tiktok;
pub mod youtube;

use std::time::Duration;

use anyhow::{Context, Result};

/// Plain browser UA; the public endpoints we hit refuse obvious bots.
pub(crate) const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(BROWSER_UA)
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .context("building http client")
}
