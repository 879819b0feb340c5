//! yt-dlp subprocess engine
//!
//! Wraps the yt-dlp command-line tool: URL validation is local parsing,
//! metadata comes from the `-J` JSON probe, and extraction runs with a
//! progress template whose stdout lines are translated into progress
//! events. No timeout is imposed here and a client disconnect does not
//! cancel a running extraction.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;
use ytaudio_common::{Error, Result};

use super::{ExtractionEngine, ProgressCallback, ProgressEvent, VideoInfo};

/// Marker prefixing templated progress lines on stdout
const PROGRESS_PREFIX: &str = "PROG|";

/// yt-dlp prints this tag when the downloaded media enters audio extraction
const POSTPROCESS_PREFIX: &str = "[ExtractAudio]";

/// Hosts whose watch/shorts/embed/live paths carry a video id
const WATCH_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];

/// yt-dlp-backed extraction engine
#[derive(Debug)]
pub struct YtDlpEngine {
    binary: PathBuf,
}

impl YtDlpEngine {
    /// Create an engine around the given binary (or `yt-dlp` from PATH),
    /// verifying it runs before the first request needs it.
    pub async fn new(binary: Option<PathBuf>) -> Result<Self> {
        let binary = binary.unwrap_or_else(|| PathBuf::from("yt-dlp"));

        match Command::new(&binary).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                info!("Using yt-dlp {} at {}", version, binary.display());
                Ok(Self { binary })
            }
            Ok(output) => Err(Error::Config(format!(
                "yt-dlp at {} exited with {} during version check",
                binary.display(),
                output.status
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Config(format!(
                "yt-dlp not found at {} (install it or pass --ytdlp-bin)",
                binary.display()
            ))),
            Err(e) => Err(Error::Config(format!("Failed to execute yt-dlp: {e}"))),
        }
    }
}

/// Subset of the yt-dlp `-J` payload the service consumes
#[derive(Debug, Deserialize)]
struct ProbePayload {
    id: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    webpage_url: Option<String>,
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn validate_url(&self, url: &str) -> Result<String> {
        extract_video_id(url)
    }

    async fn video_info(&self, url: &str) -> Result<VideoInfo> {
        let output = Command::new(&self.binary)
            .arg("-J")
            .arg("--no-playlist")
            .arg("--skip-download")
            .arg("--no-warnings")
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Unavailable(format!("Failed to execute yt-dlp: {e}")))?;

        if !output.status.success() {
            return Err(Error::Unavailable(stderr_tail(&output.stderr)));
        }

        let payload: ProbePayload = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::Unavailable(format!("Failed to parse yt-dlp metadata: {e}")))?;

        let id = payload
            .id
            .ok_or_else(|| Error::Unavailable("yt-dlp metadata carried no video id".to_string()))?;

        Ok(VideoInfo {
            title: payload.title.unwrap_or_else(|| id.clone()),
            id,
            uploader: payload.uploader,
            duration: payload.duration,
            thumbnail: payload.thumbnail,
            webpage_url: payload.webpage_url,
        })
    }

    async fn download_audio(
        &self,
        url: &str,
        output_dir: &Path,
        filename_base: &str,
        on_progress: ProgressCallback,
    ) -> Result<PathBuf> {
        let expected = output_dir.join(format!("{filename_base}.mp3"));
        let template = output_dir.join(format!("{filename_base}.%(ext)s"));

        debug!(url, output = %expected.display(), "Spawning yt-dlp download");

        let mut child = Command::new(&self.binary)
            .arg("--no-playlist")
            .arg("--newline")
            .arg("--no-warnings")
            .arg("--progress")
            .arg("--progress-template")
            .arg(format!(
                "download:{PROGRESS_PREFIX}%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s"
            ))
            .arg("-x")
            .arg("--audio-format")
            .arg("mp3")
            .arg("--audio-quality")
            .arg("0")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Extraction(format!("Failed to start yt-dlp: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Extraction("Failed to capture yt-dlp stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Extraction("Failed to capture yt-dlp stderr".to_string()))?;

        // Drain stderr concurrently and keep its last non-empty line as the
        // failure message when the exit status is non-zero.
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail = None;
            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    tail = Some(trimmed.to_string());
                }
            }
            tail
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut converting = false;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| Error::Extraction(format!("Failed to read yt-dlp output: {e}")))?
        {
            if let Some(rest) = line.strip_prefix(PROGRESS_PREFIX) {
                if let Some(event) = parse_progress_line(rest) {
                    on_progress(event);
                }
            } else if !converting && line.starts_with(POSTPROCESS_PREFIX) {
                converting = true;
                on_progress(ProgressEvent::Finished);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Extraction(format!("Failed waiting for yt-dlp: {e}")))?;
        let tail = stderr_task.await.ok().flatten();

        if !status.success() {
            return Err(Error::Extraction(
                tail.unwrap_or_else(|| format!("yt-dlp exited with {status}")),
            ));
        }

        Ok(expected)
    }
}

/// Extract the video id from a YouTube URL, rejecting anything else.
///
/// Accepts watch/shorts/embed/live paths on the YouTube hosts and the
/// `youtu.be` short form; the id must be 11 URL-safe base64 characters.
pub fn extract_video_id(raw: &str) -> Result<String> {
    let url =
        Url::parse(raw).map_err(|_| Error::InvalidInput(format!("Not a valid URL: {raw}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

    let candidate = if host == "youtu.be" {
        url.path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string)
    } else if WATCH_HOSTS.contains(&host.as_str()) {
        let path = url.path();
        if path == "/watch" {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        } else {
            ["/shorts/", "/embed/", "/live/"].iter().find_map(|prefix| {
                path.strip_prefix(prefix)
                    .map(|rest| rest.trim_end_matches('/').to_string())
            })
        }
    } else {
        None
    };

    match candidate {
        Some(id) if is_video_id(&id) => Ok(id),
        _ => Err(Error::InvalidInput(format!(
            "Not a recognized YouTube URL: {raw}"
        ))),
    }
}

/// YouTube video ids are 11 URL-safe base64 characters
fn is_video_id(id: &str) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse `percent|speed|eta` out of a templated progress line.
///
/// Lines whose percent does not parse (yt-dlp occasionally emits `N/A`
/// placeholders) are skipped.
fn parse_progress_line(rest: &str) -> Option<ProgressEvent> {
    let mut fields = rest.splitn(3, '|');
    let percent = fields.next()?.trim().trim_end_matches('%').trim();
    let percent: f64 = percent.parse().ok()?;
    let speed = display_field(fields.next());
    let eta = display_field(fields.next());

    Some(ProgressEvent::Downloading { percent, speed, eta })
}

fn display_field(field: Option<&str>) -> String {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => "N/A".to_string(),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
        .unwrap_or_else(|| "yt-dlp failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_watch_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42",
            "http://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ", "{url}");
        }
    }

    #[test]
    fn accepts_short_and_path_forms() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ/",
        ] {
            assert_eq!(extract_video_id(url).unwrap(), "dQw4w9WgXcQ", "{url}");
        }
    }

    #[test]
    fn rejects_non_youtube_input() {
        for url in [
            "not a url",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://vimeo.com/123456",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=short",
            "https://youtu.be/",
            "https://youtu.be/has spaces!!",
        ] {
            let err = extract_video_id(url).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{url}");
        }
    }

    #[test]
    fn progress_lines_parse_to_events() {
        let event = parse_progress_line("  42.3%| 1.20MiB/s|00:35").unwrap();
        assert_eq!(
            event,
            ProgressEvent::Downloading {
                percent: 42.3,
                speed: "1.20MiB/s".to_string(),
                eta: "00:35".to_string(),
            }
        );
    }

    #[test]
    fn unparseable_percent_is_skipped() {
        assert!(parse_progress_line("N/A|Unknown|Unknown").is_none());
        assert!(parse_progress_line("").is_none());
    }

    #[test]
    fn missing_fields_become_placeholders() {
        let event = parse_progress_line("100%||").unwrap();
        assert_eq!(
            event,
            ProgressEvent::Downloading {
                percent: 100.0,
                speed: "N/A".to_string(),
                eta: "N/A".to_string(),
            }
        );
    }

    #[test]
    fn stderr_tail_takes_last_meaningful_line() {
        let stderr = b"WARNING: something\nERROR: Video unavailable\n\n";
        assert_eq!(stderr_tail(stderr), "ERROR: Video unavailable");
        assert_eq!(stderr_tail(b""), "yt-dlp failed");
    }

    #[tokio::test]
    async fn missing_binary_is_a_config_error() {
        let err = YtDlpEngine::new(Some(PathBuf::from("/nonexistent/yt-dlp")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
