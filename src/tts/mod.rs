// src/tts/mod.rs
//! TTS rendering with provider fallback.
//!
//! Path selection is a tagged two-state decision recorded once per run
//! ([`VoicePath`]), not exception handling scattered per chunk. The first
//! primary-provider failure of any kind downgrades the entire remaining run
//! to the offline synthesizer; the primary is never retried mid-run.

pub mod cloud;
pub mod offline;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::{self, ScratchDir};

/// Which synthesis path produced the episode audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePath {
    Primary,
    Fallback,
}

#[derive(Debug, Error)]
pub enum TtsError {
    /// Provider-reported quota/billing exhaustion; distinguishable so the
    /// downgrade can be logged for what it is.
    #[error("cloud tts quota exhausted")]
    QuotaExceeded,
    #[error("cloud tts request failed: {0}")]
    Failed(#[from] anyhow::Error),
}

/// Cloud voice provider, one request per chunk.
#[async_trait]
pub trait CloudTts: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;
}

/// Offline synthesizer invoked on the full text (no request-size limit).
#[async_trait]
pub trait FallbackSynth: Send + Sync {
    async fn synthesize_to_mp3(&self, text: &str, out: &Path, scratch: &ScratchDir)
        -> Result<()>;
}

/// Outcome of the primary pass over all chunks.
#[derive(Debug)]
pub enum PrimaryOutcome {
    /// Every chunk synthesized; audio bytes in original chunk order.
    Complete(Vec<Vec<u8>>),
    /// Abandoned at the first failure; no further primary calls were made.
    Downgrade { rendered: usize, quota: bool },
}

/// Drive the primary provider chunk by chunk. Stops at the first failure;
/// publishing reliability beats voice quality, so any error downgrades.
pub async fn try_primary(cloud: &dyn CloudTts, chunks: &[String]) -> PrimaryOutcome {
    let mut rendered: Vec<Vec<u8>> = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        match cloud.synthesize(chunk).await {
            Ok(bytes) => rendered.push(bytes),
            Err(TtsError::QuotaExceeded) => {
                tracing::warn!(chunk = i, "cloud tts quota exhausted; downgrading run");
                return PrimaryOutcome::Downgrade {
                    rendered: i,
                    quota: true,
                };
            }
            Err(TtsError::Failed(e)) => {
                tracing::warn!(error = ?e, chunk = i, "cloud tts failed; downgrading run");
                return PrimaryOutcome::Downgrade {
                    rendered: i,
                    quota: false,
                };
            }
        }
    }
    PrimaryOutcome::Complete(rendered)
}

/// Render `text` to `out`. Chunks go through the primary provider when one is
/// configured; on downgrade (or no primary) the offline engine synthesizes
/// the full text exactly once. Scratch artifacts live under `scratch` and go
/// away with it.
pub async fn render_episode(
    cloud: Option<&dyn CloudTts>,
    fallback: &dyn FallbackSynth,
    text: &str,
    chunk_limit: usize,
    scratch: &ScratchDir,
    out: &Path,
) -> Result<VoicePath> {
    if let Some(cloud) = cloud {
        let chunks = crate::chunk::chunk_text(text, chunk_limit);
        match try_primary(cloud, &chunks).await {
            PrimaryOutcome::Complete(rendered) => {
                let mut parts: Vec<PathBuf> = Vec::with_capacity(rendered.len());
                for (i, bytes) in rendered.iter().enumerate() {
                    let part = scratch.file(&format!("chunk{:03}.mp3", i));
                    std::fs::write(&part, bytes)?;
                    parts.push(part);
                }
                audio::concat_mp3(&parts, scratch, out).await?;
                return Ok(VoicePath::Primary);
            }
            PrimaryOutcome::Downgrade { rendered, quota } => {
                tracing::info!(
                    rendered,
                    quota,
                    "switching to offline synthesizer for this run"
                );
            }
        }
    }

    fallback.synthesize_to_mp3(text, out, scratch).await?;
    Ok(VoicePath::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCloud {
        calls: AtomicUsize,
        fail_at: Option<usize>,
        quota: bool,
    }

    #[async_trait]
    impl CloudTts for CountingCloud {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_at {
                Some(k) if n == k => {
                    if self.quota {
                        Err(TtsError::QuotaExceeded)
                    } else {
                        Err(TtsError::Failed(anyhow::anyhow!("boom")))
                    }
                }
                _ => Ok(vec![0u8; 4]),
            }
        }
    }

    fn chunks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chunk {i}")).collect()
    }

    #[tokio::test]
    async fn all_chunks_succeed() {
        let cloud = CountingCloud {
            calls: AtomicUsize::new(0),
            fail_at: None,
            quota: false,
        };
        match try_primary(&cloud, &chunks(3)).await {
            PrimaryOutcome::Complete(rendered) => assert_eq!(rendered.len(), 3),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn quota_stops_primary_immediately() {
        let cloud = CountingCloud {
            calls: AtomicUsize::new(0),
            fail_at: Some(1),
            quota: true,
        };
        match try_primary(&cloud, &chunks(5)).await {
            PrimaryOutcome::Downgrade { rendered, quota } => {
                assert_eq!(rendered, 1);
                assert!(quota);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // One success + the quota failure; chunks 2..4 never attempted.
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_error_also_downgrades() {
        let cloud = CountingCloud {
            calls: AtomicUsize::new(0),
            fail_at: Some(0),
            quota: false,
        };
        match try_primary(&cloud, &chunks(2)).await {
            PrimaryOutcome::Downgrade { rendered, quota } => {
                assert_eq!(rendered, 0);
                assert!(!quota);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(cloud.calls.load(Ordering::SeqCst), 1);
    }
}
