// src/audio.rs
//! ffmpeg plumbing: WAV→MP3 encode with the speech filter chain, lossless
//! container-level concat of chunk MP3s, single-pass loudness normalization,
//! plus scratch-artifact lifecycle and up-front tool checks.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Voice-only output settings: mono, speech-friendly rate, small files.
pub const MP3_BITRATE: &str = "64k";
pub const MP3_SAMPLE_RATE: &str = "22050";
pub const MP3_CHANNELS: &str = "1";

/// Band-pass + compression tuned for synthesized speech.
const SPEECH_FILTER: &str = "highpass=f=80, lowpass=f=9000, \
acompressor=threshold=-18dB:ratio=3:attack=20:release=250";

/// Ceiling for any single external-process invocation. A timed-out call is a
/// hard failure of that call; there is no mid-call cancellation semantics
/// beyond killing the child.
const SUBPROCESS_TIMEOUT_SECS: u64 = 600;

/// Locate a binary on PATH without spawning it.
pub fn find_in_path(bin: &str) -> Option<PathBuf> {
    if bin.contains(std::path::MAIN_SEPARATOR) {
        let p = PathBuf::from(bin);
        return p.exists().then_some(p);
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|p| p.exists())
}

/// Structural precondition: every required external tool must exist before
/// any audio work starts. Missing tools are fatal.
pub fn ensure_tools(required: &[&str]) -> Result<()> {
    for tool in required {
        if find_in_path(tool).is_none() {
            bail!("missing required tool: {tool}");
        }
    }
    Ok(())
}

/// Per-run scratch directory for chunk/audio artifacts. Removed on drop, so
/// cleanup happens on success and failure alike.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create() -> Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "power-daily-brief-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_micros()
        ));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("creating scratch dir {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::warn!(error = ?e, path = %self.path.display(), "scratch cleanup failed");
        }
    }
}

async fn run_ffmpeg(args: &[&str], what: &str) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let fut = cmd.output();
    let out = tokio::time::timeout(
        std::time::Duration::from_secs(SUBPROCESS_TIMEOUT_SECS),
        fut,
    )
    .await
    .map_err(|_| anyhow!("ffmpeg timed out while {what}"))?
    .with_context(|| format!("spawning ffmpeg for {what}"))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!("ffmpeg failed while {what}: {}", stderr.trim());
    }
    Ok(())
}

/// Transcode a synthesized WAV to the published MP3 format, applying the
/// speech filter chain.
pub async fn encode_wav_to_mp3(wav: &Path, mp3: &Path) -> Result<()> {
    run_ffmpeg(
        &[
            "-i",
            wav.to_str().context("non-utf8 wav path")?,
            "-af",
            SPEECH_FILTER,
            "-ac",
            MP3_CHANNELS,
            "-ar",
            MP3_SAMPLE_RATE,
            "-b:a",
            MP3_BITRATE,
            mp3.to_str().context("non-utf8 mp3 path")?,
        ],
        "encoding wav to mp3",
    )
    .await
}

/// Render the concat demuxer list file for `parts`, in order.
/// Single quotes in paths are escaped the way the demuxer expects.
pub fn concat_list(parts: &[PathBuf]) -> String {
    let mut list = String::new();
    for p in parts {
        let escaped = p.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    list
}

/// Losslessly concatenate chunk MP3s in original order (`-c copy`; no
/// re-encode, so no artifacts at chunk boundaries).
pub async fn concat_mp3(parts: &[PathBuf], scratch: &ScratchDir, out: &Path) -> Result<()> {
    if parts.is_empty() {
        bail!("nothing to concatenate");
    }
    let list_path = scratch.file("concat.txt");
    std::fs::write(&list_path, concat_list(parts))
        .with_context(|| format!("writing concat list {}", list_path.display()))?;

    run_ffmpeg(
        &[
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            list_path.to_str().context("non-utf8 list path")?,
            "-c",
            "copy",
            out.to_str().context("non-utf8 output path")?,
        ],
        "concatenating chunk audio",
    )
    .await
}

/// One loudness-normalization pass over the final assembled audio. Applied
/// once per episode, never per chunk; per-chunk normalization would shift
/// relative loudness at the boundaries.
pub async fn loudnorm_in_place(mp3: &Path, scratch: &ScratchDir) -> Result<()> {
    let tmp = scratch.file("loudnorm.mp3");
    run_ffmpeg(
        &[
            "-i",
            mp3.to_str().context("non-utf8 mp3 path")?,
            "-af",
            "loudnorm",
            "-ac",
            MP3_CHANNELS,
            "-ar",
            MP3_SAMPLE_RATE,
            "-b:a",
            MP3_BITRATE,
            tmp.to_str().context("non-utf8 tmp path")?,
        ],
        "normalizing loudness",
    )
    .await?;
    std::fs::copy(&tmp, mp3)
        .with_context(|| format!("replacing {} with normalized audio", mp3.display()))?;
    Ok(())
}
