// tests/brief_budget.rs
//! Word-budget properties of assembled scripts.

use chrono::{Duration, Utc};

use power_daily_brief::brief::{assemble, word_count, WORD_HARD_CAP, WORD_TARGET};
use power_daily_brief::ingest::types::CandidateItem;

fn item(i: usize, title: &str, summary: &str) -> CandidateItem {
    CandidateItem {
        source: "Wire".into(),
        title: title.into(),
        url: format!("https://w.test/{i}"),
        published_at: Utc::now() - Duration::hours(1),
        summary: summary.into(),
        score: 100 - i as i64,
    }
}

#[test]
fn generated_scripts_stay_under_the_hard_cap() {
    // Realistic shapes: summaries at the 600-char clip limit.
    let summary = "word ".repeat(160);
    let items: Vec<_> = (0..5)
        .map(|i| item(i, &format!("texas story {i}"), &summary))
        .collect();
    let doc = assemble(&items, Utc::now());
    assert!(doc.word_count() <= WORD_HARD_CAP);
    assert_eq!(doc.stories.len(), 5);
}

#[test]
fn at_least_one_story_survives_an_oversized_first_block() {
    // The title is the only field that can blow the budget by itself.
    let giant_title = format!("texas {}", "word ".repeat(WORD_TARGET + 200));
    let items = vec![
        item(0, &giant_title, "s"),
        item(1, "texas runner-up", "s"),
    ];
    let doc = assemble(&items, Utc::now());
    assert_eq!(doc.stories.len(), 1, "first story must always survive");
    assert!(doc.word_count() > WORD_TARGET);
}

#[test]
fn zero_eligible_stories_is_a_valid_brief_not_an_error() {
    let doc = assemble(&[], Utc::now());
    assert!(doc.stories.is_empty());
    let text = doc.to_text();
    assert!(word_count(&text) > 0, "header and preamble still present");
    assert!(text.contains("Daily Brief"));
}

#[test]
fn serialized_text_word_count_matches_document_accounting() {
    let items: Vec<_> = (0..3)
        .map(|i| item(i, &format!("texas {i}"), "short summary here"))
        .collect();
    let doc = assemble(&items, Utc::now());
    assert_eq!(doc.word_count(), word_count(&doc.to_text()));
}
