// src/engine.rs
//! # Run Orchestration
//! One sequential pipeline per run: fetch → rank → assemble → normalize →
//! chunk → render → post-process → publish. No concurrency within a run by
//! design; the feed document is mutated exactly once under a single-writer
//! assumption.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::audio::{self, ScratchDir};
use crate::brief::{self, date_label};
use crate::config::{RunConfig, VoiceMode};
use crate::ingest::{self, types::FeedProvider};
use crate::publish::{self, Episode, PublishOutcome};
use crate::sources::SourcesConfig;
use crate::speech::speech_optimize;
use crate::tts::{self, cloud::CloudTtsClient, offline::OfflineSynth, CloudTts, VoicePath};

/// What a run did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stories: usize,
    pub words: usize,
    /// `None` when existing audio was reused without re-rendering.
    pub voice_path: Option<VoicePath>,
    pub outcome: Option<PublishOutcome>,
    pub episode_path: PathBuf,
}

/// Build one HTTP-backed provider per configured source.
pub fn build_providers(sources: &SourcesConfig) -> Vec<Box<dyn FeedProvider>> {
    let client = reqwest::Client::new();
    sources
        .sources
        .iter()
        .map(|s| {
            Box::new(ingest::rss::RssFeedProvider::from_source(s, client.clone()))
                as Box<dyn FeedProvider>
        })
        .collect()
}

fn episode_for(config: &RunConfig, label: &str, pub_date: DateTime<Utc>, len: u64) -> Episode {
    let enclosure_url = format!("{}/eps/brief-{}.mp3", config.site_base_url, label);
    Episode {
        title: format!("Power & Utilities Daily Brief — {}", label),
        description: "Automated daily brief covering U.S. power, utilities, and grid \
infrastructure news. Sources and links are in the brief text."
            .to_string(),
        pub_date,
        guid: enclosure_url.clone(),
        enclosure_url,
        enclosure_len: len,
    }
}

/// Execute one full pipeline run with the given providers.
///
/// Providers are injected so tests can drive the whole pipeline from
/// fixtures; `run` wires the HTTP providers in.
pub async fn run_with_providers(
    config: &RunConfig,
    sources: &SourcesConfig,
    providers: &[Box<dyn FeedProvider>],
    now: DateTime<Utc>,
) -> Result<RunReport> {
    // Structural preconditions first: renderer tools must exist before any
    // network or file work happens.
    audio::ensure_tools(&["ffmpeg", tts::offline::ESPEAK_BIN])?;

    // 1) Collect, rank, assemble, persist the brief.
    let ranked = ingest::collect_candidates(providers, &sources.tables, now).await;
    let doc = brief::assemble(&ranked, now);
    doc.write(&config.brief_output_path)?;
    tracing::info!(
        stories = doc.stories.len(),
        words = doc.word_count(),
        path = %config.brief_output_path.display(),
        "brief assembled"
    );

    // 2) Normalize for speech and locate the episode artifact.
    let script = brief::load_script(&config.brief_output_path)?;
    let spoken = speech_optimize(&script);
    let label = date_label(now);
    std::fs::create_dir_all(&config.episodes_dir).with_context(|| {
        format!("creating episodes dir {}", config.episodes_dir.display())
    })?;
    let episode_path = config.episodes_dir.join(format!("brief-{}.mp3", label));

    // 3) Render, unless today's audio already exists and regeneration wasn't
    //    forced.
    let voice_path = if episode_path.exists() && !config.force_regen {
        tracing::info!(path = %episode_path.display(), "episode audio exists; skipping render");
        None
    } else {
        let scratch = ScratchDir::create()?;
        let cloud_client;
        let cloud: Option<&dyn CloudTts> = match &config.voice_mode {
            VoiceMode::Cloud { api_key } => {
                cloud_client = CloudTtsClient::new(
                    &config.tts_api_url,
                    api_key,
                    &config.tts_model,
                    &config.tts_voice,
                    config.tts_timeout_secs,
                )?;
                Some(&cloud_client)
            }
            VoiceMode::Offline => None,
        };
        let fallback = OfflineSynth::new(
            &config.espeak_voice,
            config.espeak_rate,
            config.espeak_pitch,
        );

        let path = tts::render_episode(
            cloud,
            &fallback,
            &spoken,
            config.tts_chunk_limit,
            &scratch,
            &episode_path,
        )
        .await?;

        if config.loudnorm {
            audio::loudnorm_in_place(&episode_path, &scratch).await?;
        }
        Some(path)
    };

    // 4) Register the episode, unless test mode suppresses feed mutation.
    let outcome = if config.test_mode {
        tracing::info!("test mode: feed document left untouched");
        None
    } else {
        let len = std::fs::metadata(&episode_path)
            .with_context(|| format!("sizing episode {}", episode_path.display()))?
            .len();
        let episode = episode_for(config, &label, now, len);
        Some(publish::publish_episode(&config.feed_path, &episode, now)?)
    };

    Ok(RunReport {
        stories: doc.stories.len(),
        words: doc.word_count(),
        voice_path,
        outcome,
        episode_path,
    })
}

/// Entry point used by the binary: loads the source tables and wires the
/// HTTP feed providers.
pub async fn run(config: &RunConfig) -> Result<RunReport> {
    let sources = SourcesConfig::load_from_file(&config.brief_config_path);
    let providers = build_providers(&sources);
    run_with_providers(config, &sources, &providers, Utc::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episode_identity_is_stable_per_date() {
        let config = RunConfig::offline_defaults();
        let now = Utc::now();
        let label = date_label(now);
        let a = episode_for(&config, &label, now, 10);
        let b = episode_for(&config, &label, now, 99);
        assert_eq!(a.guid, b.guid);
        assert_eq!(a.enclosure_url, a.guid);
        assert!(a.guid.ends_with(&format!("brief-{}.mp3", label)));
    }
}
