// src/publish.rs
//! Idempotent episode insertion into the persisted podcast feed document.
//!
//! The feed is text-spliced, never re-serialized: a fixed anchor comment
//! marks the insertion point, and a new `<item>` block lands immediately
//! before it, leaving all existing content (and the anchor itself) intact for
//! future runs. A guid or enclosure URL already present anywhere in the
//! document means the episode was published before; only `lastBuildDate` is
//! refreshed in that case.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use quick_xml::escape::escape;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Insertion point for new episodes. Writers must never remove it.
pub const FEED_ANCHOR: &str = "<!-- insert-new-episodes-above -->";

pub const AUDIO_MIME: &str = "audio/mpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<Utc>,
    /// Globally unique and stable for a given publish date (idempotence key).
    pub guid: String,
    pub enclosure_url: String,
    pub enclosure_len: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Inserted,
    /// guid/enclosure already present; only the build timestamp was touched.
    AlreadyPublished,
}

fn re_last_build() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"<lastBuildDate>[^<]*</lastBuildDate>").expect("lastBuildDate regex")
    })
}

/// Serialize one `<item>` block. All user-controlled strings are XML-escaped.
pub fn render_item(ep: &Episode) -> String {
    format!(
        "    <item>\n      <title>{}</title>\n      <description>{}</description>\n      \
<pubDate>{}</pubDate>\n      <guid isPermaLink=\"true\">{}</guid>\n      \
<enclosure url=\"{}\" length=\"{}\" type=\"{}\"/>\n    </item>\n",
        escape(&ep.title),
        escape(&ep.description),
        ep.pub_date.to_rfc2822(),
        escape(&ep.guid),
        escape(&ep.enclosure_url),
        ep.enclosure_len,
        AUDIO_MIME,
    )
}

fn refresh_last_build(doc: &str, now: DateTime<Utc>) -> String {
    let stamp = format!("<lastBuildDate>{}</lastBuildDate>", now.to_rfc2822());
    re_last_build().replace(doc, stamp.as_str()).into_owned()
}

/// Insert `ep` into the feed at `feed_path`.
///
/// Fatal when the document is missing or the anchor was removed; those are
/// structural preconditions, not recoverable states.
pub fn publish_episode<P: AsRef<Path>>(
    feed_path: P,
    ep: &Episode,
    now: DateTime<Utc>,
) -> Result<PublishOutcome> {
    let path = feed_path.as_ref();
    let doc = fs::read_to_string(path)
        .with_context(|| format!("missing feed document at {}", path.display()))?;

    if !doc.contains(FEED_ANCHOR) {
        bail!(
            "feed document {} has no insertion anchor ({}); refusing to guess a splice point",
            path.display(),
            FEED_ANCHOR
        );
    }

    let updated = refresh_last_build(&doc, now);

    // The document stores these fields XML-escaped, so compare escaped forms.
    if updated.contains(escape(&ep.guid).as_ref())
        || updated.contains(escape(&ep.enclosure_url).as_ref())
    {
        fs::write(path, updated)
            .with_context(|| format!("updating lastBuildDate in {}", path.display()))?;
        tracing::info!(guid = %ep.guid, "episode already in feed; timestamp refreshed only");
        return Ok(PublishOutcome::AlreadyPublished);
    }

    let spliced = updated.replacen(
        FEED_ANCHOR,
        &format!("{}    {}", render_item(ep), FEED_ANCHOR),
        1,
    );
    fs::write(path, spliced)
        .with_context(|| format!("writing feed document {}", path.display()))?;
    tracing::info!(guid = %ep.guid, "episode inserted into feed");
    Ok(PublishOutcome::Inserted)
}
