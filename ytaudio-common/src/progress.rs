//! Session progress state machine and in-memory store
//!
//! One extraction session moves through
//! `starting -> downloading* -> processing -> finished`, with `error`
//! reachable from any non-terminal state. Pollers that ask about an
//! unknown session get the `not_started` sentinel rather than an error,
//! since sessions may be polled before creation or after cleanup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Lifecycle state of one extraction session.
///
/// Internally tagged on `status` so the wire shape is
/// `{"status": "downloading", "progress": 42.5, "speed": ..., "eta": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Progress {
    /// Sentinel for sessions that were never created (or already cleaned up)
    NotStarted { progress: u8 },
    /// Session created, the engine has not reported yet
    Starting { progress: u8 },
    /// Engine-reported transfer progress; speed and eta are display strings
    /// forwarded as-is
    Downloading { progress: f64, speed: String, eta: String },
    /// Download complete, transcode in flight
    Processing { progress: u8, message: String },
    /// Terminal: artifact produced
    Finished { progress: u8, path: String, filename: String },
    /// Terminal: the session failed
    Error { message: String },
}

impl Progress {
    pub fn not_started() -> Self {
        Progress::NotStarted { progress: 0 }
    }

    pub fn starting() -> Self {
        Progress::Starting { progress: 0 }
    }

    pub fn downloading(percent: f64, speed: impl Into<String>, eta: impl Into<String>) -> Self {
        Progress::Downloading {
            progress: percent,
            speed: speed.into(),
            eta: eta.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Progress::Processing {
            progress: 100,
            message: message.into(),
        }
    }

    pub fn finished(path: impl Into<String>, filename: impl Into<String>) -> Self {
        Progress::Finished {
            progress: 100,
            path: path.into(),
            filename: filename.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Progress::Error {
            message: message.into(),
        }
    }

    /// Terminal states accept no further orchestrator transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Progress::Finished { .. } | Progress::Error { .. })
    }
}

/// Process-wide mapping from session identifier to progress state.
///
/// Constructed once at startup and shared by handle through `AppState`;
/// the mutex gives per-key atomicity for concurrent polls and callback
/// writes. No ordering is promised across keys, and a poller may read a
/// stale-but-valid prior state, never a torn one.
#[derive(Debug, Default)]
pub struct ProgressStore {
    sessions: Mutex<HashMap<String, Progress>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent overwrite; last writer wins
    pub fn set(&self, session_id: &str, progress: Progress) {
        self.lock().insert(session_id.to_string(), progress);
    }

    /// Unknown identifiers read as the `not_started` sentinel
    pub fn get(&self, session_id: &str) -> Progress {
        self.lock()
            .get(session_id)
            .cloned()
            .unwrap_or_else(Progress::not_started)
    }

    /// Silent no-op when the entry is absent
    pub fn remove(&self, session_id: &str) {
        self.lock().remove(session_id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Progress>> {
        // No code path panics while holding the guard, but recover from
        // poisoning instead of propagating a panic into request handlers.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_session_reads_as_sentinel() {
        let store = ProgressStore::new();
        assert_eq!(store.get("nope"), Progress::not_started());
    }

    #[test]
    fn get_returns_last_set_value() {
        let store = ProgressStore::new();

        store.set("s1", Progress::starting());
        assert_eq!(store.get("s1"), Progress::starting());

        store.set("s1", Progress::downloading(42.5, "1.2MiB/s", "00:35"));
        assert_eq!(
            store.get("s1"),
            Progress::downloading(42.5, "1.2MiB/s", "00:35")
        );

        store.set("s1", Progress::processing("Converting to MP3..."));
        store.set("s1", Progress::finished("/tmp/a.mp3", "a.mp3"));
        assert_eq!(store.get("s1"), Progress::finished("/tmp/a.mp3", "a.mp3"));
    }

    #[test]
    fn remove_restores_sentinel_and_tolerates_absence() {
        let store = ProgressStore::new();

        store.set("s1", Progress::starting());
        store.remove("s1");
        assert_eq!(store.get("s1"), Progress::not_started());

        // Removing again is a no-op
        store.remove("s1");
        assert_eq!(store.get("s1"), Progress::not_started());
    }

    #[test]
    fn sessions_are_independent() {
        let store = ProgressStore::new();
        store.set("a", Progress::starting());
        store.set("b", Progress::error("boom"));

        assert_eq!(store.get("a"), Progress::starting());
        assert_eq!(store.get("b"), Progress::error("boom"));
    }

    #[test]
    fn wire_shape_matches_polling_contract() {
        let sentinel = serde_json::to_value(Progress::not_started()).unwrap();
        assert_eq!(sentinel, json!({"status": "not_started", "progress": 0}));

        let downloading = serde_json::to_value(Progress::downloading(42.5, "1.2MiB/s", "00:35")).unwrap();
        assert_eq!(
            downloading,
            json!({"status": "downloading", "progress": 42.5, "speed": "1.2MiB/s", "eta": "00:35"})
        );

        let finished = serde_json::to_value(Progress::finished("/music/x.mp3", "x.mp3")).unwrap();
        assert_eq!(
            finished,
            json!({"status": "finished", "progress": 100, "path": "/music/x.mp3", "filename": "x.mp3"})
        );

        let error = serde_json::to_value(Progress::error("boom")).unwrap();
        assert_eq!(error, json!({"status": "error", "message": "boom"}));
    }

    #[test]
    fn terminal_states() {
        assert!(Progress::finished("p", "f").is_terminal());
        assert!(Progress::error("e").is_terminal());
        assert!(!Progress::starting().is_terminal());
        assert!(!Progress::downloading(1.0, "", "").is_terminal());
        assert!(!Progress::processing("m").is_terminal());
    }
}
