// src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trend_radar::ai::build_generator;
use trend_radar::db::Database;
use trend_radar::ingest::cultural::CulturalTrendsCollector;
use trend_radar::notify::EmailSender;
use trend_radar::research::{run_global_research, GeminiShortAnalyzer, GlobalShortsScraper};
use trend_radar::{run_daily, run_weekly_recap, RadarConfig};

#[derive(Parser)]
#[command(name = "trend-radar", about = "Content trend radar for HomeMade Meals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full daily pipeline: ingest, score, generate, store, email.
    Daily {
        /// Skip persistence and email; print the run summary only.
        #[arg(long)]
        dry_run: bool,
    },
    /// Email a recap of this week's best stored ideas.
    WeeklyRecap,
    /// Deep-analyze trending shorts outside the food niche and store the
    /// insights.
    GlobalResearch {
        /// How many shorts to analyze.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let cfg = RadarConfig::load()?;

    match cli.command {
        Command::Daily { dry_run } => {
            let providers = cfg.build_providers()?;
            let cultural = CulturalTrendsCollector::new()?;
            let ai = build_generator(&cfg.ai);

            let (db, mailer) = if dry_run {
                tracing::info!("dry run: persistence and email disabled");
                (Database::disabled(), None)
            } else {
                let mailer = match EmailSender::from_env() {
                    Ok(m) => Some(m),
                    Err(e) => {
                        tracing::warn!(error = ?e, "email not configured; report will not be sent");
                        None
                    }
                };
                (Database::from_env(), mailer)
            };

            let summary = run_daily(
                &cfg.scoring,
                &providers,
                Some(&cultural),
                &ai,
                &db,
                mailer.as_ref(),
            )
            .await?;
            println!(
                "ingested {} posts ({} duplicates removed), {} candidates, {} ideas generated, {} saved, email sent: {}",
                summary.posts_ingested,
                summary.duplicates_removed,
                summary.candidates,
                summary.ideas_generated,
                summary.ideas_saved,
                summary.email_sent,
            );
        }
        Command::WeeklyRecap => {
            let db = Database::from_env();
            let mailer = match EmailSender::from_env() {
                Ok(m) => Some(m),
                Err(e) => {
                    tracing::warn!(error = ?e, "email not configured; recap will not be sent");
                    None
                }
            };
            run_weekly_recap(&db, mailer.as_ref()).await?;
        }
        Command::GlobalResearch { limit } => {
            let scraper = GlobalShortsScraper::new(limit);
            let candidates = scraper.fetch().await?;
            if candidates.is_empty() {
                tracing::warn!("no shorts passed the filters; nothing to analyze");
                return Ok(());
            }

            let analyzer = GeminiShortAnalyzer::from_env(&cfg.ai.model)?;
            let db = Database::from_env();
            let summary = run_global_research(candidates, &analyzer, &db).await;
            println!(
                "{} shorts selected, {} analyzed, {} stored",
                summary.candidates, summary.analyzed, summary.saved,
            );
        }
    }

    Ok(())
}
