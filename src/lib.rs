// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod audio;
pub mod brief;
pub mod canonical;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod publish;
pub mod score;
pub mod sources;
pub mod speech;
pub mod tts;

// ---- Re-exports for stable public API ----
pub use crate::brief::{assemble, ScriptDocument, StoryBlock};
pub use crate::canonical::canonicalize;
pub use crate::config::{RunConfig, VoiceMode};
pub use crate::engine::{run, RunReport};
pub use crate::publish::{publish_episode, Episode, PublishOutcome};
pub use crate::speech::speech_optimize;
pub use crate::tts::{CloudTts, FallbackSynth, TtsError, VoicePath};
