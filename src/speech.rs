// src/speech.rs
//! Rewrites an assembled script into TTS-friendly text.
//!
//! The transform is idempotent: existing pause cues and story transitions are
//! recognized and re-derived instead of stacked, so
//! `speech_optimize(speech_optimize(x)) == speech_optimize(x)` holds for any
//! input. The pipeline relies on that when a partially processed script is
//! re-fed after a failed render.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Audible pause between sections; synthesizers respect ellipsis punctuation.
pub const PAUSE_CUE: &str = "...";
/// Spoken transition before every numbered story after the first.
pub const TRANSITION: &str = "Next story...";

const WRAPPER_START: &str = "---- SCRIPT START ----";
const WRAPPER_END: &str = "---- SCRIPT END ----";

fn re_url() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url regex"))
}

fn re_spaces() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("space regex"))
}

fn re_blank() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("blank-line regex"))
}

fn re_story() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.\s").expect("story regex"))
}

fn re_dots() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\.{4,}").expect("dots regex"))
}

/// Prepare script text for synthesis: drop URLs and wrapper markers, insert
/// pause cues at paragraph breaks, signpost story transitions, and replace
/// long dashes (TTS mispronounces them).
pub fn speech_optimize(input: &str) -> String {
    let mut text = input.replace("\r\n", "\n");
    text = text.replace(WRAPPER_START, "").replace(WRAPPER_END, "");
    text = re_url().replace_all(&text, "").into_owned();
    // Dashes become commas before whitespace collapsing so the spacing they
    // introduce is normalized in the same pass.
    text = text.replace('\u{2014}', ", ").replace('\u{2013}', ", ");
    text = re_spaces().replace_all(&text, " ").into_owned();

    // Paragraph model: split on blank lines, trim line tails, and drop any
    // cue/transition paragraphs from a previous pass so they are re-derived
    // rather than stacked.
    let mut paras: Vec<String> = re_blank()
        .split(text.trim())
        .map(|p| {
            p.lines()
                .map(str::trim_end)
                // URL stripping leaves bare "Link:" labels behind; drop them.
                .filter(|l| !l.is_empty() && *l != "Link:")
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|p| !p.is_empty() && p != PAUSE_CUE && p != TRANSITION)
        .collect();

    // Headline pause after the first line.
    if let Some(first) = paras.first_mut() {
        let mut lines: Vec<String> = first.lines().map(str::to_string).collect();
        if let Some(l0) = lines.first_mut() {
            if !l0.ends_with("...") {
                l0.push_str("...");
            }
        }
        *first = lines.join("\n");
    }

    // Attach a spoken transition to every numbered story after the first.
    let units: Vec<String> = paras
        .into_iter()
        .map(|p| {
            if let Some(caps) = re_story().captures(&p) {
                let n: usize = caps[1].parse().unwrap_or(1);
                if n > 1 {
                    return format!("{}\n\n{}", TRANSITION, p);
                }
            }
            p
        })
        .collect();

    let mut out = units.join(&format!("\n\n{}\n\n", PAUSE_CUE));
    out = re_dots().replace_all(&out, "...").into_owned();
    out.trim().to_string()
}
