// src/research.rs
//! Global virality researcher: a second, niche-agnostic pipeline. It scans
//! the top trending YouTube Shorts *outside* the food vertical, runs a
//! deep-dive analysis of why each one works (hook, audio, pacing, narrative,
//! replicability) and stores the insights in `global_viral_trends` for the
//! content team to mine.
//!
//! Candidates are grounded on metadata plus the English auto-caption
//! transcript pulled via `yt-dlp`; the analysis prompt works from that text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::ai::gemini::GeminiGenerator;
use crate::db::Database;

/// Anything longer is not a short.
const SHORTS_MAX_DURATION_SECS: u64 = 90;

/// The daily pipeline already covers the food niche; the researcher looks
/// everywhere else.
const FOOD_KEYWORDS: [&str; 5] = ["cook", "recipe", "food", "eat", "chef"];

/// Overfetch factor: raw search results thin out a lot after filtering.
const SEARCH_OVERFETCH: usize = 10;

/// One trending short selected for deep analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortCandidate {
    pub source_id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub duration_seconds: u64,
    pub views: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
struct ShortsDump {
    #[serde(default)]
    entries: Vec<ShortsEntry>,
}

#[derive(Debug, Deserialize)]
struct ShortsEntry {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
}

/// Select analysis candidates from a flat search dump: shorts only, food
/// content excluded, best `limit` kept in search order.
pub fn select_candidates(json: &str, limit: usize) -> Result<Vec<ShortCandidate>> {
    let dump: ShortsDump = serde_json::from_str(json).context("parsing shorts search dump")?;

    let mut out = Vec::new();
    for entry in dump.entries {
        if out.len() >= limit {
            break;
        }
        let id = entry.id.unwrap_or_default();
        if id.is_empty() {
            continue;
        }
        let duration = entry.duration.unwrap_or(0.0);
        if duration <= 0.0 || duration > SHORTS_MAX_DURATION_SECS as f64 {
            continue;
        }
        let title = entry.title.unwrap_or_default();
        let lower = title.to_lowercase();
        if FOOD_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }

        out.push(ShortCandidate {
            url: format!("https://www.youtube.com/shorts/{id}"),
            source_id: id,
            title,
            description: entry.description.unwrap_or_default(),
            duration_seconds: duration as u64,
            views: entry.view_count.unwrap_or(0),
            transcript: String::new(),
        });
    }
    Ok(out)
}

/// Flatten a WebVTT caption file into plain text: timestamps, headers and
/// cue numbers dropped, consecutive duplicate lines (auto-caption rolling
/// windows) collapsed.
pub fn parse_vtt(vtt: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for raw in vtt.lines() {
        let line = raw.trim();
        if line.is_empty()
            || line.contains("-->")
            || line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if lines.last() == Some(&line) {
            continue;
        }
        lines.push(line);
    }
    lines.join(" ")
}

pub struct GlobalShortsScraper {
    binary: String,
    limit: usize,
}

impl GlobalShortsScraper {
    pub fn new(limit: usize) -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            limit,
        }
    }

    /// Binary override for tests (point at a stub script).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Fetch trending shorts and attach transcripts where available. A
    /// missing transcript degrades to metadata-only analysis, not an error.
    pub async fn fetch(&self) -> Result<Vec<ShortCandidate>> {
        let target = format!("ytsearch{}:#shorts", self.limit * SEARCH_OVERFETCH);
        let output = Command::new(&self.binary)
            .args(["-J", "--flat-playlist", "--no-warnings", &target])
            .output()
            .await
            .with_context(|| format!("spawning {}", self.binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let body = String::from_utf8_lossy(&output.stdout);
        let mut candidates = select_candidates(&body, self.limit)?;

        for c in &mut candidates {
            match self.fetch_transcript(&c.source_id).await {
                Ok(text) => c.transcript = text,
                Err(e) => {
                    tracing::warn!(error = ?e, video = %c.source_id, "no transcript; metadata only");
                }
            }
        }

        tracing::info!(candidates = candidates.len(), "global shorts selected");
        Ok(candidates)
    }

    /// Pull the English auto-caption track for one video and flatten it.
    async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
        let dir = std::env::temp_dir().join("trend-radar-subs");
        tokio::fs::create_dir_all(&dir)
            .await
            .context("creating caption temp dir")?;

        let tmpl = dir.join("%(id)s").to_string_lossy().to_string();
        let url = format!("https://www.youtube.com/watch?v={video_id}");
        let output = Command::new(&self.binary)
            .args([
                "--skip-download",
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                "en",
                "--no-warnings",
                "-o",
                &tmpl,
                &url,
            ])
            .output()
            .await
            .with_context(|| format!("spawning {}", self.binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "caption fetch for {video_id} exited with {}",
                output.status
            );
        }

        let vtt_path = dir.join(format!("{video_id}.en.vtt"));
        let raw = tokio::fs::read_to_string(&vtt_path)
            .await
            .with_context(|| format!("reading captions for {video_id}"))?;
        let _ = tokio::fs::remove_file(&vtt_path).await;

        Ok(parse_vtt(&raw))
    }
}

// --- Deep analysis ---

/// Structured deep-dive result. Every field is defaulted so a partially
/// valid model reply still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepAnalysis {
    #[serde(default)]
    pub hook: HookAnalysis,
    #[serde(default)]
    pub audio: AudioAnalysis,
    #[serde(default)]
    pub pacing: PacingAnalysis,
    #[serde(default)]
    pub visuals: VisualAnalysis,
    #[serde(default)]
    pub virality_factors: Vec<String>,
    #[serde(default)]
    pub replica_potential: u32,
    #[serde(default)]
    pub why_it_worked: String,
}

impl DeepAnalysis {
    pub fn is_empty(&self) -> bool {
        self.virality_factors.is_empty() && self.why_it_worked.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookAnalysis {
    #[serde(default)]
    pub rating: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technique: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub transcript_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PacingAnalysis {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub cuts_per_minute: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAnalysis {
    #[serde(default)]
    pub aesthetic: String,
    #[serde(default)]
    pub text_overlay_usage: String,
}

/// Build the deep-analysis prompt for one candidate.
pub fn build_analysis_prompt(candidate: &ShortCandidate) -> String {
    let transcript_context = if candidate.transcript.is_empty() {
        String::new()
    } else {
        format!("\n**TRANSCRIPT**:\n{}\n", candidate.transcript)
    };

    format!(
        r#"You are a master Viral Content Researcher. Reverse-engineer the virality of this YouTube Short using its metadata and transcript.

**TITLE**: {title}
**DESCRIPTION**: {description}
**DURATION**: {duration}s
**VIEWS**: {views}
{transcript_context}
Focus on these 5 pillars:
1. **THE HOOK (0-3s)**: What stops the scroll? What is the first audio cue?
2. **AUDIO ENGINEERING**: Trending sound? Voiceover (ASMR, energetic, authoritative)? Music tempo?
3. **VISUAL PACING**: Likely editing style (fast, slow, jagged, smooth).
4. **NARRATIVE STRUCTURE**: What is the payoff? Is there a loop?
5. **REPLICA POTENTIAL**: How can others replicate this? (1-10 score)

Output PURE JSON with this structure:
{{
    "hook": {{"rating": 1, "description": "...", "technique": "..."}},
    "audio": {{"type": "Voiceover/Music/Raw", "mood": "...", "transcript_summary": "..."}},
    "pacing": {{"style": "...", "cuts_per_minute": 0}},
    "visuals": {{"aesthetic": "...", "text_overlay_usage": "..."}},
    "virality_factors": ["factor1", "factor2"],
    "replica_potential": 1,
    "why_it_worked": "..."
}}"#,
        title = candidate.title,
        description = candidate.description,
        duration = candidate.duration_seconds,
        views = candidate.views,
    )
}

#[async_trait]
pub trait ShortAnalyzer: Send + Sync {
    async fn analyze(&self, candidate: &ShortCandidate) -> Result<DeepAnalysis>;
    fn name(&self) -> &'static str;
}

pub struct GeminiShortAnalyzer {
    inner: GeminiGenerator,
}

impl GeminiShortAnalyzer {
    pub fn from_env(model: &str) -> Result<Self> {
        Ok(Self {
            inner: GeminiGenerator::from_env(model)?,
        })
    }

    pub fn new(inner: GeminiGenerator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ShortAnalyzer for GeminiShortAnalyzer {
    async fn analyze(&self, candidate: &ShortCandidate) -> Result<DeepAnalysis> {
        let prompt = build_analysis_prompt(candidate);
        let text = self.inner.generate_text(&prompt).await?;
        serde_json::from_str(&text).context("parsing deep analysis json")
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// What one researcher run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResearchSummary {
    pub candidates: usize,
    pub analyzed: usize,
    pub saved: usize,
}

/// Analyze each candidate and store the insight. One failing video never
/// aborts the batch.
pub async fn run_global_research(
    candidates: Vec<ShortCandidate>,
    analyzer: &dyn ShortAnalyzer,
    db: &Database,
) -> ResearchSummary {
    let mut summary = ResearchSummary {
        candidates: candidates.len(),
        ..ResearchSummary::default()
    };

    for candidate in &candidates {
        let analysis = match analyzer.analyze(candidate).await {
            Ok(a) if !a.is_empty() => a,
            Ok(_) => {
                tracing::warn!(video = %candidate.source_id, "empty analysis; skipping");
                continue;
            }
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    analyzer = analyzer.name(),
                    video = %candidate.source_id,
                    "deep analysis failed"
                );
                continue;
            }
        };
        summary.analyzed += 1;

        match db.save_global_trend(candidate, &analysis).await {
            Ok(true) => summary.saved += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = ?e, video = %candidate.source_id, "trend save failed");
            }
        }
    }

    tracing::info!(?summary, "global research complete");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "entries": [
            {"id": "aaa", "title": "insane parkour run", "duration": 42, "view_count": 900000},
            {"id": "bbb", "title": "5 minute recipe hack", "duration": 30, "view_count": 800000},
            {"id": "ccc", "title": "full documentary", "duration": 1200, "view_count": 700000},
            {"id": "ddd", "title": "cat vs cucumber", "duration": 15, "view_count": 600000},
            {"id": "", "title": "orphan", "duration": 20},
            {"id": "eee", "title": "street magic", "duration": 60, "view_count": 500000}
        ]
    }"#;

    #[test]
    fn selection_filters_food_long_and_idless_entries() {
        let picked = select_candidates(DUMP, 10).unwrap();
        let ids: Vec<&str> = picked.iter().map(|c| c.source_id.as_str()).collect();
        assert_eq!(ids, ["aaa", "ddd", "eee"]);
        assert_eq!(picked[0].url, "https://www.youtube.com/shorts/aaa");
        assert_eq!(picked[0].duration_seconds, 42);
    }

    #[test]
    fn selection_respects_the_limit() {
        let picked = select_candidates(DUMP, 2).unwrap();
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn missing_duration_is_not_a_short() {
        let json = r#"{"entries": [{"id": "x", "title": "no duration"}]}"#;
        assert!(select_candidates(json, 5).unwrap().is_empty());
    }

    #[test]
    fn vtt_flattens_to_plain_text() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n1\n00:00:00.000 --> 00:00:02.000\nwait for it\n\n2\n00:00:02.000 --> 00:00:04.000\nwait for it\nhere it comes\n";
        assert_eq!(parse_vtt(vtt), "wait for it here it comes");
    }

    #[test]
    fn prompt_carries_metadata_and_transcript() {
        let c = ShortCandidate {
            source_id: "aaa".to_string(),
            url: "https://www.youtube.com/shorts/aaa".to_string(),
            title: "insane parkour run".to_string(),
            description: "rooftops of Lisbon".to_string(),
            duration_seconds: 42,
            views: 900_000,
            transcript: "watch this jump".to_string(),
        };
        let prompt = build_analysis_prompt(&c);
        assert!(prompt.contains("insane parkour run"));
        assert!(prompt.contains("watch this jump"));
        assert!(prompt.contains("replica_potential"));

        let without = build_analysis_prompt(&ShortCandidate {
            transcript: String::new(),
            ..c
        });
        assert!(!without.contains("TRANSCRIPT"));
    }

    #[test]
    fn partial_analysis_reply_still_parses() {
        let a: DeepAnalysis =
            serde_json::from_str(r#"{"why_it_worked": "fast hook", "replica_potential": 7}"#)
                .unwrap();
        assert_eq!(a.replica_potential, 7);
        assert!(a.virality_factors.is_empty());
        assert!(!a.is_empty());
    }

    #[test]
    fn audio_type_field_maps_to_kind() {
        let a: DeepAnalysis =
            serde_json::from_str(r#"{"audio": {"type": "Voiceover", "mood": "calm"}}"#).unwrap();
        assert_eq!(a.audio.kind, "Voiceover");
    }

    struct StubAnalyzer {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl ShortAnalyzer for StubAnalyzer {
        async fn analyze(&self, candidate: &ShortCandidate) -> Result<DeepAnalysis> {
            if self.fail_on == Some(candidate.source_id.as_str()) {
                anyhow::bail!("quota exceeded");
            }
            Ok(DeepAnalysis {
                why_it_worked: format!("{} lands fast", candidate.title),
                replica_potential: 6,
                ..DeepAnalysis::default()
            })
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn candidate(id: &str) -> ShortCandidate {
        ShortCandidate {
            source_id: id.to_string(),
            url: format!("https://www.youtube.com/shorts/{id}"),
            title: format!("short {id}"),
            description: String::new(),
            duration_seconds: 30,
            views: 1000,
            transcript: String::new(),
        }
    }

    #[tokio::test]
    async fn one_failing_video_does_not_abort_the_batch() {
        let db = Database::disabled();
        let analyzer = StubAnalyzer {
            fail_on: Some("bad"),
        };
        let summary = run_global_research(
            vec![candidate("ok1"), candidate("bad"), candidate("ok2")],
            &analyzer,
            &db,
        )
        .await;

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.saved, 0);
    }
}
