//! Output filename derivation
//!
//! Three policies feed the path resolver: title-based names for saved
//! files, hash/timestamp names when the caller wants collision-resistant
//! output regardless of title content, and ephemeral names for streamed
//! artifacts that are deleted after delivery.

use chrono::Local;
use uuid::Uuid;

/// Extension applied to every produced artifact
pub const AUDIO_EXT: &str = ".mp3";

/// Retain only alphanumerics, `.`, `_`, `-` and space, then trim
/// surrounding whitespace.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Title-based filename: sanitized title plus the audio extension.
///
/// A title whose sanitization strips every character falls back to the
/// video id as the stem.
pub fn title_filename(title: &str, video_id: &str) -> String {
    let stem = sanitize_title(title);
    if stem.is_empty() {
        format!("{video_id}{AUDIO_EXT}")
    } else {
        format!("{stem}{AUDIO_EXT}")
    }
}

/// Collision-resistant filename independent of title content:
/// `{video_id}_{YYYYMMDD_HHMMSS}_{6 hex}.mp3`, unique across repeated
/// calls within the same second.
pub fn hashed_filename(video_id: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{video_id}_{timestamp}_{}{AUDIO_EXT}", short_token(6))
}

/// Transient basename for streamed artifacts: the sanitized caller-supplied
/// base or a `yt_{video_id}` prefix, plus an 8-hex suffix. No extension;
/// the engine manages extension placement.
pub fn ephemeral_basename(custom: Option<&str>, video_id: &str) -> String {
    let token = short_token(8);
    match custom.map(sanitize_title).filter(|safe| !safe.is_empty()) {
        Some(safe) => format!("{safe}_{token}"),
        None => format!("yt_{video_id}_{token}"),
    }
}

/// Server-generated session identifier (8 hex chars)
pub fn session_token() -> String {
    short_token(8)
}

fn short_token(len: usize) -> String {
    Uuid::new_v4().simple().to_string()[..len].to_string()
}
