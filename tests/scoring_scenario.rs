// tests/scoring_scenario.rs
//! The reference scoring scenario: a regional headline scores 89, its
//! non-regional sibling scores 65 and is excluded by the gate, not outranked.

use chrono::{Duration, Utc};
use std::collections::HashMap;

use power_daily_brief::score::{is_us_relevant, score_item};
use power_daily_brief::sources::ScoringTables;

fn tables() -> ScoringTables {
    let mut weights = HashMap::new();
    weights.insert("Strong Wire".to_string(), 30);
    weights.insert("Weak Wire".to_string(), 14);
    ScoringTables {
        weights,
        default_weight: 10,
        us_signals: vec!["texas".into()],
        impact: vec!["grid".into()],
    }
}

#[test]
fn regional_headline_scores_eighty_nine() {
    let t = tables();
    let now = Utc::now();
    let published = now - Duration::hours(5); // recency 35
    let s = score_item(&t, "Strong Wire", "Texas grid strain rises", "", published, now);
    assert_eq!(s, 30 + 35 + 20 + 4);
}

#[test]
fn nonregional_sibling_scores_sixty_five_but_is_gated_out() {
    let t = tables();
    let now = Utc::now();
    let published = now - Duration::hours(5);
    let title = "Offshore wind auction wraps";
    let s = score_item(&t, "Strong Wire", title, "", published, now);
    assert_eq!(s, 30 + 35 + 0 + 0);
    // Exclusion happens before ranking ever sees the score.
    assert!(!is_us_relevant(&t, title, ""));
}

#[test]
fn weak_source_same_story_scores_lower() {
    let t = tables();
    let now = Utc::now();
    let published = now - Duration::hours(5);
    let strong = score_item(&t, "Strong Wire", "Texas grid strain", "", published, now);
    let weak = score_item(&t, "Weak Wire", "Texas grid strain", "", published, now);
    assert_eq!(strong - weak, 16);
}
