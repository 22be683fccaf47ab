// src/sources.rs
//! # Sources & Scoring Tables
//!
//! Configurable feed-source list, per-source ranking weights, and the keyword
//! tables behind the regional-relevance gate and impact scoring.
//!
//! - Loads from TOML config (`[[sources]]`, `[weights]`, `[keywords]`).
//! - Falls back to a built-in `default_seed()` covering the v1 source list.
//! - Tables are immutable for a run and injected into the scorer, never read
//!   through module-level mutable state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One configured RSS feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

/// Immutable lookup tables consumed by the scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringTables {
    /// Per-source ranking weight; higher = preferred.
    #[serde(default)]
    pub weights: HashMap<String, i64>,
    /// Weight applied to sources absent from `weights`.
    #[serde(default = "default_source_weight")]
    pub default_weight: i64,
    /// Regional-relevance signals; any hit passes the hard gate.
    #[serde(default)]
    pub us_signals: Vec<String>,
    /// Impact keywords; each hit adds 4 points, capped at 20.
    #[serde(default)]
    pub impact: Vec<String>,
}

fn default_source_weight() -> i64 {
    10
}

/// Root of `config/brief.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub sources: Vec<FeedSource>,
    #[serde(flatten)]
    pub tables: ScoringTables,
}

impl SourcesConfig {
    /// Load from a TOML file. Falls back to `default_seed()` when the file is
    /// missing or unparseable, so a bare checkout still produces a brief.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Strict variant used when the operator pointed at an explicit path.
    pub fn load_required<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let content = fs::read_to_string(p)
            .with_context(|| format!("reading sources config at {}", p.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))
    }

    /// Built-in v1 source list and keyword tables.
    pub fn default_seed() -> Self {
        let sources = [
            ("Utility Dive", "https://www.utilitydive.com/feeds/news/"),
            ("POWER Magazine", "https://www.powermag.com/feed/"),
            (
                "Renewable Energy World",
                "https://www.renewableenergyworld.com/feed/",
            ),
            ("CleanTechnica", "https://cleantechnica.com/feed/"),
            (
                "E&E Energywire (Politico)",
                "https://rss.politico.com/eenews-ew",
            ),
            ("Canary Media", "https://www.canarymedia.com/rss.rss"),
        ]
        .into_iter()
        .map(|(name, url)| FeedSource {
            name: name.to_string(),
            url: url.to_string(),
        })
        .collect();

        let mut weights = HashMap::new();
        for (k, v) in [
            ("E&E Energywire (Politico)", 30),
            ("Utility Dive", 28),
            ("Canary Media", 26),
            ("POWER Magazine", 22),
            ("Renewable Energy World", 20),
            ("CleanTechnica", 14),
        ] {
            weights.insert(k.to_string(), v);
        }

        Self {
            sources,
            tables: ScoringTables {
                weights,
                default_weight: 10,
                us_signals: seed_us_signals(),
                impact: seed_impact(),
            },
        }
    }
}

impl ScoringTables {
    pub fn weight_for(&self, source: &str) -> i64 {
        self.weights
            .get(source)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

fn seed_us_signals() -> Vec<String> {
    [
        // Agencies, regulators, grid operators.
        "ferc",
        "department of energy",
        "doe",
        "epa",
        "nerc",
        "pjm",
        "miso",
        "ercot",
        "caiso",
        "nyiso",
        "spp",
        "iso-ne",
        "united states",
        "u.s.",
        // Known loose token; kept for parity with historical selection behavior.
        "us ",
        // All 50 states.
        "california",
        "texas",
        "new york",
        "florida",
        "illinois",
        "pennsylvania",
        "ohio",
        "georgia",
        "north carolina",
        "michigan",
        "new jersey",
        "virginia",
        "washington",
        "arizona",
        "massachusetts",
        "tennessee",
        "indiana",
        "missouri",
        "maryland",
        "wisconsin",
        "colorado",
        "minnesota",
        "south carolina",
        "alabama",
        "louisiana",
        "kentucky",
        "oregon",
        "oklahoma",
        "connecticut",
        "utah",
        "iowa",
        "nevada",
        "arkansas",
        "mississippi",
        "kansas",
        "new mexico",
        "nebraska",
        "west virginia",
        "idaho",
        "hawaii",
        "new hampshire",
        "maine",
        "montana",
        "rhode island",
        "delaware",
        "south dakota",
        "north dakota",
        "alaska",
        "vermont",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn seed_impact() -> Vec<String> {
    [
        "transmission",
        "interconnection",
        "rate case",
        "public utility commission",
        "grid",
        "reliability",
        "outage",
        "blackout",
        "wildfire",
        "pipeline",
        "lng",
        "nuclear",
        "small modular reactor",
        "smr",
        "data center",
        "load growth",
        "capacity market",
        "resource adequacy",
        "tariff",
        "rulemaking",
        "order",
        "permit",
        "financing",
        "acquisition",
        "merger",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_six_sources_and_matching_weights() {
        let cfg = SourcesConfig::default_seed();
        assert_eq!(cfg.sources.len(), 6);
        for s in &cfg.sources {
            assert!(cfg.tables.weights.contains_key(&s.name), "{}", s.name);
        }
    }

    #[test]
    fn unknown_source_gets_default_weight() {
        let cfg = SourcesConfig::default_seed();
        assert_eq!(cfg.tables.weight_for("Some Blog"), 10);
        assert_eq!(cfg.tables.weight_for("Utility Dive"), 28);
    }

    #[test]
    fn toml_roundtrip_with_flattened_tables() {
        let cfg: SourcesConfig = toml::from_str(
            r#"
default_weight = 7
us_signals = ["texas"]
impact = ["grid"]

[[sources]]
name = "Feed A"
url = "https://a.test/rss"

[weights]
"Feed A" = 33
"#,
        )
        .expect("parse inline config");
        assert_eq!(cfg.sources.len(), 1);
        assert_eq!(cfg.tables.weight_for("Feed A"), 33);
        assert_eq!(cfg.tables.weight_for("Feed B"), 7);
        assert_eq!(cfg.tables.us_signals, vec!["texas"]);
    }

    #[test]
    fn missing_file_falls_back_to_seed() {
        let cfg = SourcesConfig::load_from_file("definitely/not/here.toml");
        assert_eq!(cfg.sources.len(), 6);
        assert!(!cfg.tables.us_signals.is_empty());
    }
}
