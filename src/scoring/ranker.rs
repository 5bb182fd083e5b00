// src/scoring/ranker.rs
//! Candidate filter/ranker: threshold projection plus a stable descending
//! sort. Ties keep their insertion order, which keeps batch runs (and tests)
//! deterministic.

use std::cmp::Ordering;

use crate::ingest::types::Post;
use crate::scoring::engine::{viral_score, ScoringConfig};

/// Annotate every post in place with its viral score.
pub fn score_all(posts: &mut [Post], cfg: &ScoringConfig) {
    for post in posts.iter_mut() {
        post.viral_score = Some(viral_score(post, cfg));
    }
}

/// Keep posts whose score meets `threshold`, sorted by score descending.
/// Unscored posts count as 0. `sort_by` is stable, so equal scores preserve
/// their original relative order.
pub fn rank_candidates(posts: Vec<Post>, threshold: f64) -> Vec<Post> {
    let mut candidates: Vec<Post> = posts
        .into_iter()
        .filter(|p| p.viral_score.unwrap_or(0.0) >= threshold)
        .collect();

    candidates.sort_by(|a, b| {
        b.viral_score
            .unwrap_or(0.0)
            .partial_cmp(&a.viral_score.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });

    candidates
}
