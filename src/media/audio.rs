// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Audio duration via symphonia

use std::path::Path;
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::{LabelError, Result};

/// Read the duration of the default track from its frame count
pub fn probe_duration(path: &Path) -> Result<Duration> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| LabelError::Media(format!("Failed to probe audio: {}", e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| LabelError::Media("No audio track".to_string()))?;

    match (track.codec_params.n_frames, track.codec_params.sample_rate) {
        (Some(n_frames), Some(sample_rate)) if sample_rate > 0 => {
            Ok(Duration::from_secs_f64(n_frames as f64 / sample_rate as f64))
        }
        _ => Err(LabelError::Media("Audio track has no length".to_string())),
    }
}
