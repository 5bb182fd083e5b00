// src/config.rs
//! Configuration: a TOML file with built-in defaults, plus a couple of env
//! overrides for operational knobs. Everything is `#[serde(default)]` so a
//! partial file stays valid.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai::AiConfig;
use crate::ingest::providers::{
    instagram::InstagramProfileProvider, reddit::RedditHotProvider, tiktok::TiktokHashtagProvider,
    youtube::YoutubeShortsProvider,
};
use crate::ingest::types::SourceProvider;
use crate::scoring::ScoringConfig;

const DEFAULT_CONFIG_PATH: &str = "config/radar.toml";

/// Which channels to pull and how much per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub subreddits: Vec<String>,
    pub youtube_queries: Vec<String>,
    pub tiktok_hashtags: Vec<String>,
    pub instagram_accounts: Vec<String>,
    pub per_source_limit: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        fn owned(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            subreddits: owned(&[
                "HomeCooking",
                "MealPrepSunday",
                "EatCheapAndHealthy",
                "Netherlands",
            ]),
            youtube_queries: owned(&[
                "easy dinner recipes",
                "meal prep",
                "home cooking",
                "cheap meals",
                "family dinner ideas",
                "15 minute meals",
                "budget meals",
                "comfort food",
                "healthy dinner",
                "one pot meals",
                "air fryer recipes",
                "viral recipes",
                "food hacks",
                "quick lunch ideas",
                "batch cooking",
            ]),
            tiktok_hashtags: owned(&[
                "homecooking",
                "easyrecipes",
                "mealprep",
                "foodtok",
                "dinnerideas",
                "cheapmeals",
                "comfortfood",
                "budgetmeals",
                "familydinner",
                "homemadefood",
                "cookinghacks",
                "quickrecipes",
                "healthymeals",
                "airfryer",
                "onepotmeals",
            ]),
            instagram_accounts: owned(&[
                "tasty",
                "foodnetwork",
                "bonappetitmag",
                "halfbakedharvest",
                "minimalistbaker",
                "pinchofyum",
                "budgetbytes",
                "feedfeed",
                "food52",
                "seriouseats",
                "themodernproper",
                "skinnytaste",
                "cookieandkate",
                "smittenkitchen",
                "twopeasandpod",
            ]),
            per_source_limit: 15,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub scoring: ScoringConfig,
    pub sources: SourcesConfig,
    pub ai: AiConfig,
}

impl RadarConfig {
    /// Load from `RADAR_CONFIG_PATH`, falling back to `config/radar.toml`,
    /// falling back to defaults. `RADAR_THRESHOLD` overrides the candidate
    /// bar (clamped to the 0..=10 scale).
    pub fn load() -> Result<Self> {
        let path = std::env::var("RADAR_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(%path, "no config file; using defaults");
            Self::default()
        };

        if let Ok(raw) = std::env::var("RADAR_THRESHOLD") {
            let t: f64 = raw
                .parse()
                .with_context(|| format!("RADAR_THRESHOLD not a number: {raw:?}"))?;
            cfg.scoring.threshold = t.clamp(0.0, 10.0);
        }

        Ok(cfg)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing {path}"))
    }

    /// Build the provider set this config enables. An empty list for a
    /// channel disables that channel.
    pub fn build_providers(&self) -> Result<Vec<Box<dyn SourceProvider>>> {
        let s = &self.sources;
        let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();

        if !s.tiktok_hashtags.is_empty() {
            providers.push(Box::new(TiktokHashtagProvider::new(
                s.tiktok_hashtags.clone(),
                s.per_source_limit,
            )?));
        }
        if !s.youtube_queries.is_empty() {
            providers.push(Box::new(YoutubeShortsProvider::new(
                s.youtube_queries.clone(),
                s.per_source_limit,
            )));
        }
        if !s.instagram_accounts.is_empty() {
            providers.push(Box::new(InstagramProfileProvider::new(
                s.instagram_accounts.clone(),
                s.per_source_limit,
            )?));
        }
        if !s.subreddits.is_empty() {
            providers.push(Box::new(RedditHotProvider::new(
                s.subreddits.clone(),
                s.per_source_limit,
            )?));
        }

        Ok(providers)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serial_test::serial;

    use super::*;

    #[test]
    fn defaults_cover_all_four_channels() {
        let cfg = RadarConfig::default();
        assert!(!cfg.sources.subreddits.is_empty());
        assert!(!cfg.sources.youtube_queries.is_empty());
        assert!(!cfg.sources.tiktok_hashtags.is_empty());
        assert!(!cfg.sources.instagram_accounts.is_empty());
        assert_eq!(cfg.scoring.threshold, 7.5);
        let providers = cfg.build_providers().unwrap();
        assert_eq!(providers.len(), 4);
    }

    #[test]
    fn empty_channel_list_disables_that_provider() {
        let mut cfg = RadarConfig::default();
        cfg.sources.youtube_queries.clear();
        cfg.sources.instagram_accounts.clear();
        let providers = cfg.build_providers().unwrap();
        assert_eq!(providers.len(), 2);
    }

    #[test]
    #[serial]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[scoring]\nthreshold = 6.0\n\n[sources]\nsubreddits = [\"Cooking\"]").unwrap();

        let cfg = RadarConfig::from_file(f.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.scoring.threshold, 6.0);
        assert_eq!(cfg.sources.subreddits, vec!["Cooking"]);
        assert_eq!(cfg.sources.per_source_limit, 15);
        assert!(cfg.ai.enabled);
    }

    #[test]
    #[serial]
    fn env_threshold_override_is_clamped() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[scoring]\nthreshold = 7.0").unwrap();
        std::env::set_var("RADAR_CONFIG_PATH", f.path());
        std::env::set_var("RADAR_THRESHOLD", "99");

        let cfg = RadarConfig::load().unwrap();
        assert_eq!(cfg.scoring.threshold, 10.0);

        std::env::remove_var("RADAR_THRESHOLD");
        std::env::remove_var("RADAR_CONFIG_PATH");
    }

    #[test]
    #[serial]
    fn garbage_threshold_is_an_error() {
        std::env::set_var("RADAR_THRESHOLD", "high");
        assert!(RadarConfig::load().is_err());
        std::env::remove_var("RADAR_THRESHOLD");
    }
}
