// src/ingest/rss.rs
//! Generic RSS 2.0 feed provider backed by quick-xml serde deserialization.
//!
//! One instance per configured [`FeedSource`]; the same parser serves every
//! source. Tests construct fixture-mode providers from inline XML.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::{FeedEntry, FeedProvider};
use crate::sources::FeedSource;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Parse an RSS date. pubDate is RFC 2822 by the book, but feeds in the wild
/// also emit RFC 3339; accept both, reject the rest.
pub fn parse_entry_date(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(ts, &time::format_description::well_known::Rfc3339).ok()
        })?
        .unix_timestamp();
    Utc.timestamp_opt(unix, 0).single()
}

pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    /// Inline XML body, for tests and offline replays.
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    pub fn from_source(source: &FeedSource, client: reqwest::Client) -> Self {
        Self {
            name: source.name.clone(),
            mode: Mode::Http {
                url: source.url.clone(),
                client,
            },
        }
    }

    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    fn parse_entries(&self, body: &str) -> Result<Vec<FeedEntry>> {
        let xml_clean = scrub_html_entities_for_xml(body);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", self.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            out.push(FeedEntry {
                title: it.title.unwrap_or_default().trim().to_string(),
                link: it.link.unwrap_or_default().trim().to_string(),
                summary: it.description.unwrap_or_default(),
                published_at: it.pub_date.as_deref().and_then(parse_entry_date),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        match &self.mode {
            Mode::Fixture(xml) => self.parse_entries(xml),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("fetching feed {}", self.name))?
                    .text()
                    .await
                    .with_context(|| format!("reading feed body for {}", self.name))?;
                self.parse_entries(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Bare named entities are not valid XML; quick-xml chokes on them even
/// inside description payloads, so rewrite the common ones up front.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>Test Wire</title>
<item>
  <title>Texas grid braces for heat</title>
  <link>https://wire.test/heat?utm_source=rss</link>
  <pubDate>Mon, 18 Aug 2025 12:00:00 GMT</pubDate>
  <description>&lt;p&gt;ERCOT issued a conservation&amp;nbsp;appeal.&lt;/p&gt;</description>
</item>
<item>
  <title>Undated item</title>
  <link>https://wire.test/undated</link>
  <description>No date field.</description>
</item>
</channel></rss>"#;

    #[tokio::test]
    async fn parses_fixture_items() {
        let p = RssFeedProvider::from_fixture("Test Wire", FIXTURE);
        let entries = p.fetch_entries().await.expect("parse fixture");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Texas grid braces for heat");
        assert!(entries[0].published_at.is_some());
        assert!(entries[1].published_at.is_none());
    }

    #[test]
    fn rfc2822_and_rfc3339_dates_parse() {
        assert!(parse_entry_date("Mon, 18 Aug 2025 12:00:00 GMT").is_some());
        assert!(parse_entry_date("2025-08-18T12:00:00Z").is_some());
        assert!(parse_entry_date("yesterday-ish").is_none());
    }

    #[tokio::test]
    async fn channel_without_items_is_empty_not_error() {
        let xml = r#"<rss version="2.0"><channel><title>x</title></channel></rss>"#;
        let p = RssFeedProvider::from_fixture("Empty", xml);
        assert!(p.fetch_entries().await.expect("parse").is_empty());
    }
}
