// src/pipeline.rs
//! Daily and weekly orchestration. Every external stage degrades and logs
//! instead of aborting: a dead provider, a refused AI call, or a down
//! database still produces whatever report can be produced.

use anyhow::Result;
use chrono::Local;

use crate::ai::{CulturalHighlight, DynIdeaGenerator, IdeaBatch};
use crate::db::{Audience, Database};
use crate::ingest::cultural::{CalendarEvent, CulturalTrendsCollector};
use crate::ingest::types::SourceProvider;
use crate::notify::EmailSender;
use crate::report::build_html_report;
use crate::scoring::{rank_candidates, score_all, ScoringConfig};

/// Ideas persisted per audience per day.
const MAX_SAVED_IDEAS_PER_AUDIENCE: usize = 10;

/// What one daily run actually did, for logging and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub posts_ingested: usize,
    pub duplicates_removed: usize,
    pub candidates: usize,
    pub events_collected: usize,
    pub ideas_generated: usize,
    pub ideas_saved: usize,
    pub events_saved: usize,
    pub email_sent: bool,
}

/// Run the full daily pipeline: ingest, score, filter, cultural trends, AI
/// ideas, persistence, email. Pass `None` for the mailer (and a disabled
/// [`Database`]) to dry-run.
pub async fn run_daily(
    cfg: &ScoringConfig,
    providers: &[Box<dyn SourceProvider>],
    cultural: Option<&CulturalTrendsCollector>,
    ai: &DynIdeaGenerator,
    db: &Database,
    mailer: Option<&EmailSender>,
) -> Result<DailySummary> {
    let mut summary = DailySummary::default();

    let (mut posts, dedup) = crate::ingest::run_once(providers).await;
    summary.posts_ingested = posts.len();
    summary.duplicates_removed = dedup;

    score_all(&mut posts, cfg);
    let candidates = rank_candidates(posts, cfg.threshold);
    summary.candidates = candidates.len();
    tracing::info!(
        candidates = summary.candidates,
        threshold = cfg.threshold,
        "candidates selected"
    );

    let events = match cultural {
        Some(c) => c.fetch().await,
        None => Vec::new(),
    };
    summary.events_collected = events.len();

    // A quiet day produces no candidates; skip the AI call, persistence and
    // the report entirely rather than generate ideas grounded in nothing.
    if candidates.is_empty() {
        tracing::warn!("no viral candidates today; skipping analysis and report");
        tracing::info!(?summary, "daily run complete");
        return Ok(summary);
    }

    let batch = match ai.generate(&candidates, &events).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::warn!(error = ?e, generator = ai.name(), "idea generation failed");
            IdeaBatch {
                key_insights: "AI analysis failed".to_string(),
                ..IdeaBatch::default()
            }
        }
    };
    summary.ideas_generated = batch.b2c_content_ideas.len() + batch.b2b_content_ideas.len();

    let top_score = candidates
        .first()
        .and_then(|p| p.viral_score)
        .unwrap_or(0.0);
    summary.ideas_saved = persist_ideas(db, &batch, top_score).await;
    summary.events_saved = persist_events(db, &events).await;

    let html = build_html_report(&batch);
    if let Some(mailer) = mailer {
        if batch.has_ideas() {
            let subject = format!("Daily Content Ideas - {}", Local::now().format("%B %d, %Y"));
            match mailer.send_report(&subject, html).await {
                Ok(()) => summary.email_sent = true,
                Err(e) => tracing::warn!(error = ?e, "report email failed"),
            }
        } else {
            tracing::warn!("no ideas generated; skipping email");
        }
    }

    tracing::info!(?summary, "daily run complete");
    Ok(summary)
}

async fn persist_ideas(db: &Database, batch: &IdeaBatch, viral_score: f64) -> usize {
    if !db.is_enabled() {
        return 0;
    }
    let mut saved = 0usize;
    let groups = [
        (Audience::B2c, &batch.b2c_content_ideas),
        (Audience::B2b, &batch.b2b_content_ideas),
    ];
    for (audience, ideas) in groups {
        for idea in ideas.iter().take(MAX_SAVED_IDEAS_PER_AUDIENCE) {
            match db.save_content_idea(idea, audience, viral_score).await {
                Ok(true) => saved += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(error = ?e, title = %idea.title, "idea save failed"),
            }
        }
    }
    saved
}

async fn persist_events(db: &Database, events: &[CalendarEvent]) -> usize {
    if !db.is_enabled() {
        return 0;
    }
    let mut saved = 0usize;
    for event in events {
        match db.save_event(event).await {
            Ok(true) => saved += 1,
            Ok(false) => {}
            Err(e) => tracing::warn!(error = ?e, event = %event.event_name, "event save failed"),
        }
    }
    saved
}

/// Weekly recap: this week's best stored ideas (split per audience) plus the
/// next two weeks of calendar events, rendered with the same report template.
pub async fn run_weekly_recap(db: &Database, mailer: Option<&EmailSender>) -> Result<()> {
    let ideas = db.top_ideas_this_week(10).await?;
    if ideas.is_empty() {
        tracing::warn!("no stored ideas this week; skipping recap");
        return Ok(());
    }

    let upcoming = db.upcoming_events(14).await.unwrap_or_else(|e| {
        tracing::warn!(error = ?e, "upcoming events query failed");
        Vec::new()
    });

    let batch = recap_batch(ideas, upcoming);
    let html = build_html_report(&batch);
    if let Some(mailer) = mailer {
        let subject = format!("Weekly Content Recap - {}", Local::now().format("%B %d, %Y"));
        mailer.send_report(&subject, html).await?;
    }
    Ok(())
}

/// Assemble the recap report: top 5 ideas per audience, at most 5 upcoming
/// events as highlights.
fn recap_batch(ideas: Vec<crate::db::StoredIdea>, upcoming: Vec<CalendarEvent>) -> IdeaBatch {
    let total = ideas.len();
    let mut b2c = Vec::new();
    let mut b2b = Vec::new();
    for stored in ideas {
        let is_b2b = stored.target_audience.eq_ignore_ascii_case("b2b");
        let idea = stored.into_idea();
        if is_b2b && b2b.len() < 5 {
            b2b.push(idea);
        } else if !is_b2b && b2c.len() < 5 {
            b2c.push(idea);
        }
    }

    let cultural_highlights = upcoming
        .into_iter()
        .take(5)
        .map(|ev| CulturalHighlight {
            trend: ev.event_name,
            opportunity: ev.opportunity,
            urgency: ev
                .event_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "upcoming".to_string()),
        })
        .collect();

    IdeaBatch {
        b2c_content_ideas: b2c,
        b2b_content_ideas: b2b,
        cultural_highlights,
        trending_themes: Vec::new(),
        key_insights: format!(
            "The {total} strongest ideas generated this week, ranked by viral score."
        ),
    }
}

/// Convenience for tests and dry runs: providers that return canned posts.
#[cfg(test)]
pub(crate) mod stubs {
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use crate::ingest::types::{Post, SourceProvider};

    pub struct FixedProvider {
        pub posts: Vec<Post>,
    }

    #[async_trait]
    impl SourceProvider for FixedProvider {
        async fn fetch_latest(&self) -> Result<Vec<Post>> {
            Ok(self.posts.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    pub struct FailingProvider;

    #[async_trait]
    impl SourceProvider for FailingProvider {
        async fn fetch_latest(&self) -> Result<Vec<Post>> {
            bail!("connection refused")
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }
}
