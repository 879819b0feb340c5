//! HTTP API handlers for ytaudio-dl

pub mod health;
pub mod info;
pub mod progress;
pub mod save;
pub mod stream;
pub mod ui;

pub use health::health_routes;
pub use info::video_info;
pub use progress::get_progress;
pub use save::save_audio;
pub use stream::stream_audio;
pub use ui::serve_index;
