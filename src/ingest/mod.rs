// src/ingest/mod.rs
pub mod cultural;
pub mod providers;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::ingest::types::{Post, SourceProvider};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("radar_posts_total", "Total posts parsed from providers.");
        describe_counter!("radar_posts_kept_total", "Posts kept after normalization + dedup.");
        describe_counter!("radar_posts_dedup_total", "Posts removed as duplicates.");
        describe_counter!("radar_provider_errors_total", "Provider fetch/parse errors.");
        describe_histogram!("radar_parse_ms", "Provider parse time in milliseconds.");
    });
}

/// Normalize post text: decode HTML entities, strip tags, collapse
/// whitespace, normalize curly quotes, cap the length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 1500 chars is plenty for keyword matching and AI summaries.
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Stable identity key for a post. The same video routinely surfaces under
/// two different queries or hashtags; source+id (falling back to URL) is
/// enough to collapse those.
pub fn identity_key(post: &Post) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(post.source.as_bytes());
    hasher.update(b"\x1f");
    if post.id.is_empty() {
        hasher.update(post.url.as_deref().unwrap_or(&post.title).as_bytes());
    } else {
        hasher.update(post.id.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Normalize content and drop duplicate posts. Returns (kept, dedup_count).
pub fn normalize_dedup(raw: Vec<Post>) -> (Vec<Post>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(raw.len());
    let mut dedup_out = 0usize;

    for mut post in raw {
        post.content = normalize_text(&post.content);
        post.title = normalize_text(&post.title);
        if !seen.insert(identity_key(&post)) {
            dedup_out += 1;
            continue;
        }
        kept.push(post);
    }

    (kept, dedup_out)
}

/// Run ingest once over the given providers. A failing provider is logged
/// and skipped; one bad source never aborts the batch.
pub async fn run_once(providers: &[Box<dyn SourceProvider>]) -> (Vec<Post>, usize) {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(provider = p.name(), posts = v.len(), "provider fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("radar_provider_errors_total").increment(1);
            }
        }
    }

    counter!("radar_posts_total").increment(raw.len() as u64);
    let (kept, dedup_cnt) = normalize_dedup(raw);
    counter!("radar_posts_kept_total").increment(kept.len() as u64);
    counter!("radar_posts_dedup_total").increment(dedup_cnt as u64);
    gauge!("radar_last_ingest_ts").set(chrono::Utc::now().timestamp() as f64);

    (kept, dedup_cnt)
}
