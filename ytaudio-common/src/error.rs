//! Common error types for ytaudio

use thiserror::Error;

/// Common result type for ytaudio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the orchestrator and the extraction engine
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unsupported URL, unsafe filename input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metadata or media cannot be retrieved (removed video, network
    /// failure, geographic restriction)
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The extraction/transcode step failed after starting
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// The engine reported success but the artifact is absent from disk
    #[error("{0}")]
    MissingArtifact(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
