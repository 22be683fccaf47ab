// src/ingest/mod.rs
pub mod rss;
pub mod types;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::canonical::canonicalize;
use crate::ingest::types::{CandidateItem, FeedEntry, FeedProvider};
use crate::score::{is_us_relevant, score_item};
use crate::sources::ScoringTables;

/// Freshness window: items published before `now - 30h` are never eligible.
pub const FRESHNESS_WINDOW_HOURS: i64 = 30;

/// Reduce an RSS summary to plain spoken-ready text: decode entities, strip
/// tags, collapse whitespace.
pub fn textify(html_or_text: &str) -> String {
    let mut out = html_escape::decode_html_entities(html_or_text).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

/// Filter + score one source's entries against the shared dedupe set.
///
/// `seen` carries canonical URLs across sources within a run; first-seen wins.
pub fn gate_and_score(
    tables: &ScoringTables,
    source: &str,
    entries: Vec<FeedEntry>,
    seen: &mut HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<CandidateItem> {
    let window_start = now - Duration::hours(FRESHNESS_WINDOW_HOURS);
    let mut out = Vec::new();

    for e in entries {
        let url = canonicalize(&e.link);
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }

        let title = e.title.trim().to_string();
        let summary = textify(&e.summary);

        // Undated items are never eligible.
        let Some(published_at) = e.published_at else {
            continue;
        };
        if published_at < window_start {
            continue;
        }
        if !is_us_relevant(tables, &title, &summary) {
            continue;
        }

        let score = score_item(tables, source, &title, &summary, published_at, now);
        out.push(CandidateItem {
            source: source.to_string(),
            title,
            url,
            published_at,
            summary,
            score,
        });
    }
    out
}

/// Run every provider in sequence, dedupe/gate/score, and return candidates
/// ranked by descending score (stable on ties, preserving discovery order).
///
/// A provider failure contributes zero items and never aborts the run.
pub async fn collect_candidates(
    providers: &[Box<dyn FeedProvider>],
    tables: &ScoringTables,
    now: DateTime<Utc>,
) -> Vec<CandidateItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<CandidateItem> = Vec::new();

    for p in providers {
        match p.fetch_entries().await {
            Ok(entries) => {
                let total = entries.len();
                let kept = gate_and_score(tables, p.name(), entries, &mut seen, now);
                tracing::debug!(source = p.name(), total, kept = kept.len(), "source ingested");
                items.extend(kept);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = p.name(), "feed fetch failed; skipping source");
            }
        }
    }

    items.sort_by(|a, b| b.score.cmp(&a.score));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn tables() -> ScoringTables {
        ScoringTables {
            weights: HashMap::new(),
            default_weight: 10,
            us_signals: vec!["texas".into()],
            impact: vec!["grid".into()],
        }
    }

    fn entry(link: &str, title: &str, age_hours: i64, now: DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            link: link.to_string(),
            summary: String::new(),
            published_at: Some(now - Duration::hours(age_hours)),
        }
    }

    #[test]
    fn textify_strips_markup_and_collapses_ws() {
        let s = textify("<p>ERCOT&nbsp;issued  an\n appeal.</p>");
        assert_eq!(s, "ERCOT issued an appeal.");
    }

    #[test]
    fn tracking_twins_dedupe_first_seen_wins() {
        let t = tables();
        let now = Utc::now();
        let mut seen = HashSet::new();
        let entries = vec![
            entry("https://w.test/a?utm_source=x", "Texas story one", 1, now),
            entry("https://w.test/a?utm_medium=y", "Texas story two", 1, now),
        ];
        let kept = gate_and_score(&t, "W", entries, &mut seen, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Texas story one");
    }

    #[test]
    fn freshness_boundary_at_thirty_hours() {
        let t = tables();
        let now = Utc::now();
        let mut seen = HashSet::new();
        let entries = vec![
            entry("https://w.test/fresh", "texas fresh", 29, now),
            entry("https://w.test/stale", "texas stale", 31, now),
        ];
        let kept = gate_and_score(&t, "W", entries, &mut seen, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://w.test/fresh");
    }

    #[test]
    fn undated_and_offtopic_items_drop() {
        let t = tables();
        let now = Utc::now();
        let mut seen = HashSet::new();
        let undated = FeedEntry {
            title: "texas undated".into(),
            link: "https://w.test/undated".into(),
            summary: String::new(),
            published_at: None,
        };
        let offtopic = entry("https://w.test/world", "world market recap", 1, now);
        let kept = gate_and_score(&t, "W", vec![undated, offtopic], &mut seen, now);
        assert!(kept.is_empty());
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let t = tables();
        let now = Utc::now();
        let mut seen = HashSet::new();
        let entries = vec![
            entry("https://w.test/1", "texas one", 2, now),
            entry("https://w.test/2", "texas two", 2, now),
        ];
        let mut items = gate_and_score(&t, "W", entries, &mut seen, now);
        items.sort_by(|a, b| b.score.cmp(&a.score));
        assert_eq!(items[0].url, "https://w.test/1");
        assert_eq!(items[1].url, "https://w.test/2");
    }
}
