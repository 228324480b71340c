// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Video metadata via FFprobe

use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use crate::{LabelError, Result};

/// Fields of interest from `ffprobe -show_format -show_streams`
#[derive(Debug, Default, PartialEq)]
pub struct VideoMetadata {
    pub duration: Option<Duration>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub struct Ffprobe;

impl Ffprobe {
    /// Check if FFprobe is available
    pub fn available() -> bool {
        Command::new("ffprobe")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Run FFprobe on `path` and parse its JSON report
    pub fn metadata(path: &Path) -> Result<VideoMetadata> {
        let output = Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| LabelError::MediaUnavailable(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(LabelError::Media(format!(
                "ffprobe could not read {}",
                path.display()
            )));
        }

        let meta = parse_report(&output.stdout)?;
        debug!("ffprobe {:?}: {:?}", path, meta);
        Ok(meta)
    }
}

/// Parse FFprobe JSON output
pub fn parse_report(json: &[u8]) -> Result<VideoMetadata> {
    let json: serde_json::Value = serde_json::from_slice(json)?;

    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64);

    let video_stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        });

    let dimension = |key: &str| {
        video_stream
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    };

    Ok(VideoMetadata {
        duration,
        width: dimension("width"),
        height: dimension("height"),
    })
}
