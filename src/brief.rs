// src/brief.rs
//! Script assembly: top-N selection, word budgeting, and the flat-text form
//! consumed by the rendering pipeline.
//!
//! The script is a structured value (header + ordered story list) everywhere
//! inside the crate; it only becomes marker-free flat text at the document
//! boundary via [`ScriptDocument::to_text`].

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::ingest::types::CandidateItem;

/// Soft packing target: ~15 minutes at 150 wpm with a buffer.
pub const WORD_TARGET: usize = 2100;
/// Absolute ceiling; the serialized script never exceeds this.
pub const WORD_HARD_CAP: usize = 2200;
/// Stories considered per episode.
pub const TOP_STORIES: usize = 5;
/// Spoken summaries are clipped to this many characters on a word boundary.
pub const SUMMARY_CHAR_LIMIT: usize = 600;

const PREAMBLE: &str =
    "This is an automated, AI-generated audio briefing. Sources and links are in the show notes.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBlock {
    pub index: usize,
    pub title: String,
    pub source: String,
    pub url: String,
    pub spoken_summary: String,
}

impl StoryBlock {
    fn to_text(&self) -> String {
        format!(
            "{}. {} — {}\nLink: {}\n{}",
            self.index, self.title, self.source, self.url, self.spoken_summary
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    pub header: String,
    pub preamble: String,
    pub stories: Vec<StoryBlock>,
}

impl ScriptDocument {
    pub fn to_text(&self) -> String {
        let mut parts = vec![self.header.clone(), self.preamble.clone()];
        parts.extend(self.stories.iter().map(StoryBlock::to_text));
        let mut text = parts.join("\n\n");
        text.push('\n');
        text
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.to_text())
    }

    /// Replace the brief file wholesale.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        if let Some(dir) = p.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating brief directory {}", dir.display()))?;
        }
        fs::write(p, self.to_text()).with_context(|| format!("writing brief to {}", p.display()))
    }
}

pub fn word_count(text: &str) -> usize {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b\w+\b").expect("word regex"))
        .find_iter(text)
        .count()
}

/// Crude Eastern label for the episode date (fixed UTC-5, as published
/// historically; no DST handling on purpose).
pub fn date_label(now: DateTime<Utc>) -> String {
    let et = FixedOffset::west_opt(5 * 3600).expect("fixed offset");
    now.with_timezone(&et).format("%Y-%m-%d").to_string()
}

/// Clip to at most `limit` chars at a word boundary, appending an ellipsis
/// when anything was removed.
pub fn truncate_spoken(summary: &str, limit: usize) -> String {
    if summary.chars().count() <= limit {
        return summary.to_string();
    }
    let clipped: String = summary.chars().take(limit).collect();
    let cut = clipped.rfind(' ').unwrap_or(clipped.len());
    format!("{}…", &clipped[..cut])
}

/// Build the script from ranked candidates.
///
/// Greedy packing: a block is dropped (and packing stops) once the running
/// word count would exceed [`WORD_TARGET`] and at least one story is already
/// in — so a single oversized story still ships. The hard cap then removes
/// trailing blocks while keeping a header+one-story skeleton. Zero eligible
/// stories yields a valid header-only script.
pub fn assemble(ranked: &[CandidateItem], now: DateTime<Utc>) -> ScriptDocument {
    let header = format!(
        "Power, Utilities & Infrastructure — Daily Brief ({})",
        date_label(now)
    );

    let mut doc = ScriptDocument {
        header,
        preamble: PREAMBLE.to_string(),
        stories: Vec::new(),
    };

    for (i, item) in ranked.iter().take(TOP_STORIES).enumerate() {
        let block = StoryBlock {
            index: i + 1,
            title: item.title.clone(),
            source: item.source.clone(),
            url: item.url.clone(),
            spoken_summary: truncate_spoken(&item.summary, SUMMARY_CHAR_LIMIT),
        };

        let mut trial = doc.clone();
        trial.stories.push(block);
        if trial.word_count() > WORD_TARGET && !doc.stories.is_empty() {
            break;
        }
        doc = trial;
    }

    // Hard-cap enforcement: shed trailing stories, never the last one.
    while doc.word_count() > WORD_HARD_CAP && doc.stories.len() > 1 {
        doc.stories.pop();
    }
    doc
}

/// Read a previously written brief; missing input is a structural failure.
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<String> {
    let p = path.as_ref();
    fs::read_to_string(p).with_context(|| format!("missing brief script at {}", p.display()))
}
