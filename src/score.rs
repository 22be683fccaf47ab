// src/score.rs
//! Relevance/recency/impact scoring for candidate stories.
//!
//! Scoring is a pure function of its inputs plus the injected
//! [`ScoringTables`]; there is no hidden global state. The regional-relevance
//! check is a hard gate applied before ranking, not merely a score component.

use chrono::{DateTime, Utc};

use crate::sources::ScoringTables;

/// Case-insensitive substring matching over `title + " " + summary`.
/// Deliberately naive (e.g. "us " can hit inside unrelated words); this is
/// the historical matching behavior and selection depends on it.
fn blob(title: &str, summary: &str) -> String {
    format!("{} {}", title, summary).to_lowercase()
}

/// Hard eligibility gate: does any regional signal appear in the item text?
pub fn is_us_relevant(tables: &ScoringTables, title: &str, summary: &str) -> bool {
    let text = blob(title, summary);
    tables.us_signals.iter().any(|sig| text.contains(sig.as_str()))
}

/// Integer ranking score: source weight + recency decay + regional bonus +
/// capped impact-keyword bonus.
pub fn score_item(
    tables: &ScoringTables,
    source: &str,
    title: &str,
    summary: &str,
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    let base = tables.weight_for(source);

    let age_hours = (now - published_at).num_seconds() as f64 / 3600.0;
    let recency = ((40.0 - age_hours) as i64).max(0);

    let text = blob(title, summary);
    let regional = if tables.us_signals.iter().any(|s| text.contains(s.as_str())) {
        20
    } else {
        0
    };
    let impact_hits = tables
        .impact
        .iter()
        .filter(|k| text.contains(k.as_str()))
        .count() as i64;
    let impact = (4 * impact_hits).min(20);

    base + recency + regional + impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn tables() -> ScoringTables {
        let mut weights = HashMap::new();
        weights.insert("Wire A".to_string(), 30);
        weights.insert("Wire B".to_string(), 14);
        ScoringTables {
            weights,
            default_weight: 10,
            us_signals: vec!["texas".into(), "ferc".into(), "us ".into()],
            impact: vec!["grid".into(), "outage".into(), "transmission".into()],
        }
    }

    #[test]
    fn fresh_item_gets_full_recency() {
        let t = tables();
        let now = Utc::now();
        let s = score_item(&t, "Wire B", "FERC ruling", "", now, now);
        // 14 base + 40 recency + 20 regional + 0 impact
        assert_eq!(s, 74);
    }

    #[test]
    fn recency_floors_at_zero_past_forty_hours() {
        let t = tables();
        let now = Utc::now();
        let old = now - Duration::hours(72);
        let s = score_item(&t, "Wire B", "texas update", "", old, now);
        assert_eq!(s, 14 + 0 + 20 + 0);
    }

    #[test]
    fn impact_caps_at_twenty() {
        let t = ScoringTables {
            weights: HashMap::new(),
            default_weight: 0,
            us_signals: vec![],
            impact: vec![
                "a1".into(),
                "a2".into(),
                "a3".into(),
                "a4".into(),
                "a5".into(),
                "a6".into(),
            ],
        };
        let now = Utc::now();
        let old = now - Duration::hours(50);
        let s = score_item(&t, "x", "a1 a2 a3 a4 a5 a6", "", old, now);
        assert_eq!(s, 20);
    }

    #[test]
    fn gate_is_substring_and_case_insensitive() {
        let t = tables();
        assert!(is_us_relevant(&t, "Storm hits TEXAS grid", ""));
        assert!(is_us_relevant(&t, "", "new FERC docket opened"));
        assert!(!is_us_relevant(&t, "Global market roundup", "prices steady"));
    }

    #[test]
    fn loose_us_token_matches_inside_words() {
        // Known historical false positive, preserved on purpose.
        let t = tables();
        assert!(is_us_relevant(&t, "focus shifts", ""));
    }

    #[test]
    fn scenario_regional_vs_nonregional() {
        let t = tables();
        let now = Utc::now();
        let item_age = now - Duration::hours(5);
        let hit = score_item(&t, "Wire A", "Texas grid alert", "", item_age, now);
        let miss = score_item(&t, "Wire A", "Overseas auction results", "", item_age, now);
        assert_eq!(hit, 30 + 35 + 20 + 4);
        assert_eq!(miss, 30 + 35 + 0 + 0);
        assert!(is_us_relevant(&t, "Texas grid alert", ""));
        assert!(!is_us_relevant(&t, "Overseas auction results", ""));
    }
}
