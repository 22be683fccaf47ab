// src/tts/offline.rs
//! Offline fallback synthesizer: espeak-ng reading the full text on stdin,
//! writing a WAV, then the ffmpeg encode to the published MP3 format.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::FallbackSynth;
use crate::audio::{self, ScratchDir};

pub const ESPEAK_BIN: &str = "espeak-ng";

const ESPEAK_TIMEOUT_SECS: u64 = 600;

pub struct OfflineSynth {
    pub voice: String,
    /// Words per minute.
    pub rate: u32,
    /// 0..99, espeak's own scale.
    pub pitch: u32,
}

impl OfflineSynth {
    pub fn new(voice: &str, rate: u32, pitch: u32) -> Self {
        Self {
            voice: voice.to_string(),
            rate,
            pitch,
        }
    }

    async fn render_wav(&self, text: &str, wav: &Path) -> Result<()> {
        let mut child = Command::new(ESPEAK_BIN)
            .arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.rate.to_string())
            .arg("-p")
            .arg(self.pitch.to_string())
            .arg("-w")
            .arg(wav)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("spawning espeak-ng")?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("espeak-ng stdin unavailable"))?;
        stdin
            .write_all(text.as_bytes())
            .await
            .context("writing script to espeak-ng")?;
        drop(stdin);

        let out = tokio::time::timeout(
            std::time::Duration::from_secs(ESPEAK_TIMEOUT_SECS),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| anyhow!("espeak-ng timed out"))?
        .context("waiting for espeak-ng")?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("espeak-ng failed: {}", stderr.trim());
        }
        Ok(())
    }
}

#[async_trait]
impl FallbackSynth for OfflineSynth {
    async fn synthesize_to_mp3(
        &self,
        text: &str,
        out: &Path,
        scratch: &ScratchDir,
    ) -> Result<()> {
        let wav = scratch.file("fallback.wav");
        self.render_wav(text, &wav).await?;
        audio::encode_wav_to_mp3(&wav, out).await
    }
}
