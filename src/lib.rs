// src/lib.rs
//! Trend radar for a homemade-meals marketplace: pulls short-form cooking
//! content from four platforms, scores each post for viral momentum on a
//! 0-10 scale, keeps the candidates above the bar, asks Gemini for two
//! audiences' worth of content ideas, stores everything in Supabase and
//! mails an HTML report.
//!
//! The scoring engine in [`scoring`] is the deterministic core; everything
//! else is plumbing around it and degrades gracefully when an external
//! service is down.

pub mod ai;
pub mod config;
pub mod db;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod research;
pub mod scoring;

pub use config::RadarConfig;
pub use ingest::types::{Post, SourceProvider};
pub use pipeline::{run_daily, run_weekly_recap, DailySummary};
pub use scoring::{rank_candidates, score_all, viral_score, ScoringConfig};
