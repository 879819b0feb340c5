//! Shared domain types for the ytaudio services
//!
//! Holds the pieces every part of the service agrees on: the error
//! taxonomy, the per-session progress state machine and its store, the
//! output-naming helpers, and collision-avoiding path resolution.

pub mod error;
pub mod naming;
pub mod paths;
pub mod progress;

pub use error::{Error, Result};
