//! End-to-end behavior of the scoring engine through the public API:
//! classification, filtering, ordering, and determinism.

use trend_radar::scoring::{classify_signal, Signal};
use trend_radar::{rank_candidates, score_all, viral_score, Post, ScoringConfig};

fn post(id: &str) -> Post {
    Post::new("test", id)
}

#[test]
fn dead_posts_score_zero_and_are_filtered() {
    let cfg = ScoringConfig::default();
    let p = post("dead");
    assert_eq!(classify_signal(&p, &cfg), Signal::Dead);
    assert_eq!(viral_score(&p, &cfg), 0.0);

    let mut posts = vec![p];
    score_all(&mut posts, &cfg);
    assert!(rank_candidates(posts, cfg.threshold).is_empty());
}

#[test]
fn rank_one_with_a_keyword_exceeds_ten() {
    let cfg = ScoringConfig::default();
    let mut p = post("r1");
    p.rank = Some(1);
    p.content = "home cooking tonight".to_string();
    assert_eq!(viral_score(&p, &cfg), 10.6);
}

#[test]
fn interactions_without_views_take_the_engagement_path() {
    let cfg = ScoringConfig::default();
    let mut p = post("est");
    p.likes = 50;
    p.hours_since = 1.0;
    assert_eq!(
        classify_signal(&p, &cfg),
        Signal::Engagement {
            views: 5000,
            interactions: 50
        }
    );
    assert_eq!(viral_score(&p, &cfg), 5.3);
}

#[test]
fn threshold_is_inclusive() {
    let cfg = ScoringConfig::default();
    let mut exactly = post("a");
    exactly.viral_score = Some(7.5);
    let mut below = post("b");
    below.viral_score = Some(7.4);

    let kept = rank_candidates(vec![exactly, below], cfg.threshold);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "a");
}

#[test]
fn ties_preserve_insertion_order() {
    let mk = |id: &str, score: f64| {
        let mut p = post(id);
        p.viral_score = Some(score);
        p
    };
    let kept = rank_candidates(
        vec![mk("first", 8.0), mk("top", 9.0), mk("second", 8.0)],
        7.5,
    );
    let ids: Vec<&str> = kept.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["top", "first", "second"]);
}

#[test]
fn scoring_is_deterministic() {
    let cfg = ScoringConfig::default();
    let mut p = post("det");
    p.views = 43_217;
    p.likes = 1_998;
    p.comments = 77;
    p.hours_since = 5.3;
    p.content = "cheap family dinner at home".to_string();

    let first = viral_score(&p, &cfg);
    for _ in 0..10 {
        assert_eq!(viral_score(&p, &cfg), first);
    }
}

#[test]
fn fresh_posts_do_not_blow_up_velocity() {
    let cfg = ScoringConfig::default();
    let mut young = post("young");
    young.views = 1000;
    young.hours_since = 0.0;
    let mut clamped = post("clamped");
    clamped.views = 1000;
    clamped.hours_since = 0.5;

    assert_eq!(viral_score(&young, &cfg), viral_score(&clamped, &cfg));
}

#[test]
fn score_all_then_rank_orders_a_mixed_batch() {
    let cfg = ScoringConfig::default();

    let mut hot = post("hot");
    hot.views = 120_000;
    hot.likes = 10_000;
    hot.comments = 900;
    hot.hours_since = 3.0;
    hot.content = "cheap dinner for the kids at home".to_string();

    let mut ranked = post("ranked");
    ranked.rank = Some(2);
    ranked.content = "simple grocery haul".to_string();

    let mut cold = post("cold");
    cold.views = 200;
    cold.likes = 1;
    cold.hours_since = 40.0;

    let mut posts = vec![cold, ranked, hot];
    score_all(&mut posts, &cfg);
    assert!(posts.iter().all(|p| p.viral_score.is_some()));

    let kept = rank_candidates(posts, cfg.threshold);
    assert_eq!(kept.len(), 2);
    // rank 2 + two keyword hits: 9.2 + 2, ahead of any capped engagement score
    assert_eq!(kept[0].id, "ranked");
    assert_eq!(kept[1].id, "hot");
}
