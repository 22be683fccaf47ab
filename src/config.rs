// src/config.rs
//! Run configuration resolved from the environment (with `.env` support in
//! the binary). Data tables (sources, weights, keywords) live separately in
//! `config/brief.toml`; see [`crate::sources`].

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const ENV_BRIEF_CONFIG_PATH: &str = "BRIEF_CONFIG_PATH";
pub const ENV_BRIEF_OUTPUT_PATH: &str = "BRIEF_OUTPUT_PATH";
pub const ENV_FEED_PATH: &str = "FEED_PATH";
pub const ENV_EPISODES_DIR: &str = "EPISODES_DIR";
pub const ENV_SITE_BASE_URL: &str = "SITE_BASE_URL";

pub const ENV_VOICE_MODE: &str = "VOICE_MODE";
pub const ENV_TTS_API_KEY: &str = "TTS_API_KEY";
pub const ENV_TTS_API_URL: &str = "TTS_API_URL";
pub const ENV_TTS_MODEL: &str = "TTS_MODEL";
pub const ENV_TTS_VOICE: &str = "TTS_VOICE";
pub const ENV_TTS_TIMEOUT_SECS: &str = "TTS_TIMEOUT_SECS";
pub const ENV_TTS_CHUNK_LIMIT: &str = "TTS_CHUNK_LIMIT";

pub const ENV_ESPEAK_VOICE: &str = "ESPEAK_VOICE";
pub const ENV_ESPEAK_RATE: &str = "ESPEAK_RATE";
pub const ENV_ESPEAK_PITCH: &str = "ESPEAK_PITCH";

pub const ENV_LOUDNORM: &str = "LOUDNORM";
pub const ENV_FORCE_REGEN: &str = "FORCE_REGEN";
pub const ENV_TEST_MODE: &str = "TEST_MODE";

pub const DEFAULT_BRIEF_CONFIG_PATH: &str = "config/brief.toml";
pub const DEFAULT_BRIEF_OUTPUT_PATH: &str = "docs/briefs/latest.txt";
pub const DEFAULT_FEED_PATH: &str = "docs/feed.xml";
pub const DEFAULT_EPISODES_DIR: &str = "docs/eps";
pub const DEFAULT_SITE_BASE_URL: &str = "https://powerdailybrief.example.com";
pub const DEFAULT_TTS_API_URL: &str = "https://api.openai.com/v1/audio/speech";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "onyx";

/// Which synthesis path the run starts on. The renderer may still downgrade
/// Cloud → offline at runtime; Offline skips the cloud provider entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceMode {
    Cloud { api_key: String },
    Offline,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub brief_config_path: PathBuf,
    pub brief_output_path: PathBuf,
    pub feed_path: PathBuf,
    pub episodes_dir: PathBuf,
    pub site_base_url: String,

    pub voice_mode: VoiceMode,
    pub tts_api_url: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_timeout_secs: u64,
    pub tts_chunk_limit: usize,

    pub espeak_voice: String,
    pub espeak_rate: u32,
    pub espeak_pitch: u32,

    pub loudnorm: bool,
    pub force_regen: bool,
    /// Suppresses feed-document mutation; everything else runs normally.
    pub test_mode: bool,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().as_deref() == Some("1")
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// A zero chunk limit is malformed configuration, not a renderer bug; reject
/// it here so it fails on the single-diagnostic path like any other bad env.
fn chunk_limit_from(raw: Option<String>) -> Result<usize> {
    let limit = raw
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(crate::chunk::DEFAULT_CHUNK_LIMIT);
    if limit == 0 {
        bail!("{ENV_TTS_CHUNK_LIMIT} must be positive");
    }
    Ok(limit)
}

impl RunConfig {
    /// Resolve configuration from the environment. A cloud voice mode without
    /// a credential is malformed configuration and fails here, before any
    /// work starts.
    pub fn from_env() -> Result<Self> {
        let mode_raw = env_or(ENV_VOICE_MODE, "cloud").to_ascii_lowercase();
        let api_key = std::env::var(ENV_TTS_API_KEY).ok().filter(|k| !k.is_empty());
        let voice_mode = match (mode_raw.as_str(), api_key) {
            ("offline", _) => VoiceMode::Offline,
            ("cloud", Some(key)) => VoiceMode::Cloud { api_key: key },
            ("cloud", None) => {
                bail!("{ENV_VOICE_MODE}=cloud requires {ENV_TTS_API_KEY} to be set")
            }
            (other, _) => bail!("unknown {ENV_VOICE_MODE} value: {other:?}"),
        };

        Ok(Self {
            brief_config_path: env_or(ENV_BRIEF_CONFIG_PATH, DEFAULT_BRIEF_CONFIG_PATH).into(),
            brief_output_path: env_or(ENV_BRIEF_OUTPUT_PATH, DEFAULT_BRIEF_OUTPUT_PATH).into(),
            feed_path: env_or(ENV_FEED_PATH, DEFAULT_FEED_PATH).into(),
            episodes_dir: env_or(ENV_EPISODES_DIR, DEFAULT_EPISODES_DIR).into(),
            site_base_url: env_or(ENV_SITE_BASE_URL, DEFAULT_SITE_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            voice_mode,
            tts_api_url: env_or(ENV_TTS_API_URL, DEFAULT_TTS_API_URL),
            tts_model: env_or(ENV_TTS_MODEL, DEFAULT_TTS_MODEL),
            tts_voice: env_or(ENV_TTS_VOICE, DEFAULT_TTS_VOICE),
            tts_timeout_secs: env_parse(ENV_TTS_TIMEOUT_SECS, 120),
            tts_chunk_limit: chunk_limit_from(std::env::var(ENV_TTS_CHUNK_LIMIT).ok())?,
            espeak_voice: env_or(ENV_ESPEAK_VOICE, "en-us"),
            espeak_rate: env_parse(ENV_ESPEAK_RATE, 145),
            espeak_pitch: env_parse(ENV_ESPEAK_PITCH, 55),
            loudnorm: env_flag(ENV_LOUDNORM),
            force_regen: env_flag(ENV_FORCE_REGEN),
            test_mode: env_flag(ENV_TEST_MODE),
        })
    }

    /// Offline defaults for tests and local dry runs; no env reads.
    pub fn offline_defaults() -> Self {
        Self {
            brief_config_path: DEFAULT_BRIEF_CONFIG_PATH.into(),
            brief_output_path: DEFAULT_BRIEF_OUTPUT_PATH.into(),
            feed_path: DEFAULT_FEED_PATH.into(),
            episodes_dir: DEFAULT_EPISODES_DIR.into(),
            site_base_url: DEFAULT_SITE_BASE_URL.to_string(),
            voice_mode: VoiceMode::Offline,
            tts_api_url: DEFAULT_TTS_API_URL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            tts_voice: DEFAULT_TTS_VOICE.to_string(),
            tts_timeout_secs: 120,
            tts_chunk_limit: crate::chunk::DEFAULT_CHUNK_LIMIT,
            espeak_voice: "en-us".to_string(),
            espeak_rate: 145,
            espeak_pitch: 55,
            loudnorm: false,
            force_regen: false,
            test_mode: false,
        }
    }
}
