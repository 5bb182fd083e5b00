// src/scoring/engine.rs
//! # Viral Scoring Engine
//! Pure, total function `Post -> f64`. Never fails: absent or malformed
//! fields degrade to safe defaults instead of erroring, because upstream
//! data quality varies a lot between platforms.
//!
//! Two scoring paths, made explicit as a [`Signal`] classification so their
//! exclusivity is testable on its own:
//! - engagement path: velocity + interaction rate + relatability, weighted
//!   50/30/20 (a product judgment, preserved exactly);
//! - rank path: linear decay over the ordinal feed position plus a small
//!   relatability bonus, for sources that expose no raw counts at all.

use serde::{Deserialize, Serialize};

use crate::ingest::types::Post;
use crate::scoring::relatability::{default_keywords, keyword_hits};

/// Posts younger than this are treated as this old, so velocity cannot blow
/// up for content that is seconds old.
pub const MIN_POST_AGE_HOURS: f64 = 0.5;

/// Velocity normalization: 1000 views/hour saturates the 10-point scale.
const VIEWS_PER_HOUR_PER_POINT: f64 = 100.0;

/// Rank decay per position: rank 1 -> 9.6, rank 10 -> 6.0, rank 25 -> 0.
const RANK_DECAY_PER_POSITION: f64 = 0.4;

/// Component weights for the engagement path. Reach matters most, genuine
/// interaction second, topical fit third.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub velocity: f64,
    pub engagement: f64,
    pub relatability: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            velocity: 0.5,
            engagement: 0.3,
            relatability: 0.2,
        }
    }
}

/// Explicit configuration for scoring and filtering. Passed in by callers,
/// never read from process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// A post is a candidate iff its score meets this bar.
    pub threshold: f64,
    /// View-estimation heuristic for sources without view counts: one
    /// interaction approximates this many impressions. Tunable, but the
    /// default is load-bearing for score parity.
    pub views_per_interaction: u64,
    pub weights: ScoreWeights,
    pub keywords: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 7.5,
            views_per_interaction: 100,
            weights: ScoreWeights::default(),
            keywords: default_keywords(),
        }
    }
}

/// Which telemetry a post actually carries, decided once per post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Ordinal feed position only (e.g. a "hot" listing); counts are absent.
    Ranked { rank: u32 },
    /// A usable view count (possibly estimated from interactions).
    Engagement { views: u64, interactions: u64 },
    /// No views, no interactions, no rank. Scores 0.
    Dead,
}

/// Classify a post's telemetry. View estimation happens here, before the
/// rank check: a rank-ordered post that *does* have interactions gets an
/// estimated view count and takes the engagement path.
pub fn classify_signal(post: &Post, cfg: &ScoringConfig) -> Signal {
    let interactions = post.likes.saturating_add(post.comments);

    let views = if post.views == 0 && interactions > 0 {
        interactions.saturating_mul(cfg.views_per_interaction)
    } else {
        post.views
    };

    if views == 0 {
        match post.rank {
            // Rank 0 is treated as missing (parity with the feed collectors,
            // which emit 1-based positions).
            Some(rank) if rank > 0 => Signal::Ranked { rank },
            _ => Signal::Dead,
        }
    } else {
        Signal::Engagement { views, interactions }
    }
}

/// Compute the viral score for one post. Deterministic, no side effects.
///
/// Engagement path: `0.5*velocity + 0.3*engagement + 0.2*relatability`,
/// each component capped at 10, rounded to one decimal.
///
/// Rank path: `max(0, 10 - rank*0.4) + min(keyword hits, 2)`. The bonus is
/// additive after the cap, so rank 1 with a keyword hit yields 10.6, a known
/// quirk of the original heuristic, preserved on purpose.
pub fn viral_score(post: &Post, cfg: &ScoringConfig) -> f64 {
    // NaN-safe clamp: f64::max returns the finite operand when the other is NaN.
    let hours = post.hours_since.max(MIN_POST_AGE_HOURS);

    match classify_signal(post, cfg) {
        Signal::Dead => 0.0,

        Signal::Ranked { rank } => {
            let rank_score = (10.0 - f64::from(rank) * RANK_DECAY_PER_POSITION).max(0.0);
            let bonus = keyword_hits(&post.content, &cfg.keywords).min(2);
            round1(rank_score + f64::from(bonus))
        }

        Signal::Engagement { views, interactions } => {
            let velocity = views as f64 / hours;
            let velocity_score = (velocity / VIEWS_PER_HOUR_PER_POINT).min(10.0);

            // A 10% interaction rate saturates the scale.
            let engagement_rate = interactions as f64 / views as f64;
            let engagement_score = (engagement_rate * 100.0).min(10.0);

            // 2 points per keyword hit; 5+ hits saturate.
            let hits = keyword_hits(&post.content, &cfg.keywords);
            let relatability_score = f64::from((hits * 2).min(10));

            round1(
                velocity_score * cfg.weights.velocity
                    + engagement_score * cfg.weights.engagement
                    + relatability_score * cfg.weights.relatability,
            )
        }
    }
}

/// Round to one decimal, half away from zero.
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
