// src/chunk.rs
//! Splits normalized script text into provider-size-limited segments.
//!
//! Whole paragraphs are accumulated until the next one would overflow the
//! limit; a single paragraph longer than the limit is hard-split at the
//! character limit (rare overflow path, no word-boundary preference). This
//! module knows nothing about any rendering provider.

/// Default request ceiling for the cloud voice provider.
pub const DEFAULT_CHUNK_LIMIT: usize = 4096;

/// Split `text` into non-empty chunks of at most `limit` characters,
/// preferring paragraph boundaries.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0, "chunk limit must be positive");

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for para in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
        if para.chars().count() > limit {
            // Oversized paragraph: flush, then hard-split it.
            flush(&mut chunks, &mut current);
            let chars: Vec<char> = para.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let joined_len = if current.is_empty() {
            para.chars().count()
        } else {
            current.chars().count() + 2 + para.chars().count()
        };
        if joined_len > limit {
            flush(&mut chunks, &mut current);
            current.push_str(para);
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
        }
    }
    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
}
