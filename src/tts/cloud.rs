// src/tts/cloud.rs
//! HTTP client for the primary cloud voice provider.
//!
//! One POST per chunk: `{model, voice, input, response_format}` with bearer
//! auth, raw MP3 bytes back. HTTP 429 and quota/billing markers in error
//! bodies map to [`TtsError::QuotaExceeded`]; everything else is a generic
//! failure. Every request carries a fixed wall-clock timeout.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::{CloudTts, TtsError};

pub struct CloudTtsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    voice: String,
}

impl CloudTtsClient {
    pub fn new(
        api_url: &str,
        api_key: &str,
        model: &str,
        voice: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building cloud tts http client")?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            voice: voice.to_string(),
        })
    }
}

/// Provider error bodies phrase exhaustion differently; match the common ones.
fn body_signals_quota(body: &str) -> bool {
    let b = body.to_ascii_lowercase();
    b.contains("quota") || b.contains("insufficient_quota") || b.contains("billing")
}

#[async_trait]
impl CloudTts for CloudTtsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": text,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| TtsError::Failed(anyhow!(e).context("cloud tts request")))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TtsError::QuotaExceeded);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if body_signals_quota(&body) {
                return Err(TtsError::QuotaExceeded);
            }
            return Err(TtsError::Failed(anyhow!(
                "cloud tts returned {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TtsError::Failed(anyhow!(e).context("reading cloud tts audio")))?;
        if bytes.is_empty() {
            return Err(TtsError::Failed(anyhow!("cloud tts returned empty audio")));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_markers_are_recognized() {
        assert!(body_signals_quota(
            r#"{"error":{"type":"insufficient_quota"}}"#
        ));
        assert!(body_signals_quota("You exceeded your current QUOTA"));
        assert!(body_signals_quota("billing hard limit reached"));
        assert!(!body_signals_quota("internal server error"));
    }
}
