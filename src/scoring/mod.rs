// src/scoring/mod.rs
//! Viral scoring core: pure functions that collapse heterogeneous engagement
//! telemetry (raw counts, ordinal feed positions, free text) onto a single
//! comparable 0-10 score, plus the candidate filter/ranker on top of it.
//! No I/O here; everything takes explicit config and is unit-testable.

pub mod engine;
pub mod ranker;
pub mod relatability;

pub use engine::{classify_signal, viral_score, ScoreWeights, ScoringConfig, Signal};
pub use ranker::{rank_candidates, score_all};
pub use relatability::{keyword_hits, RELATABILITY_KEYWORDS};
