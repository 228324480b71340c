// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification by audio/video duration

use std::time::Duration;
use tracing::debug;

use super::{Classifier, StockLabels};
use crate::file::LabelFile;
use crate::label::Label;
use crate::media::MediaHandle;
use crate::Result;

pub struct DurationClassifier {
    min_duration: Duration,
    media: MediaHandle,
    stock: StockLabels,
}

impl DurationClassifier {
    pub fn new(min_duration: Duration, media: MediaHandle, stock: StockLabels) -> Self {
        Self {
            min_duration,
            media,
            stock,
        }
    }
}

impl Classifier for DurationClassifier {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>> {
        if !file.file_type().is_media() {
            return Ok(vec![self.stock.unknown.clone()]);
        }

        let duration = self.media.duration(file.original_path(), file.file_type())?;
        debug!("{:?} runs {:?}", file.original_path(), duration);
        Ok(vec![self.stock.by_threshold(duration >= self.min_duration)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelNames;
    use crate::file::FileType;
    use crate::media::{Dimensions, MediaBackend, MediaProbe};
    use crate::LabelError;
    use std::path::Path;

    struct FixedProbe;

    impl MediaProbe for FixedProbe {
        fn duration(&mut self, path: &Path, _file_type: FileType) -> Result<Duration> {
            match path.file_stem().and_then(|s| s.to_str()) {
                Some("short") => Ok(Duration::from_secs(59)),
                Some("exact") => Ok(Duration::from_secs(60)),
                Some("long") => Ok(Duration::from_secs(3600)),
                _ => Err(LabelError::Media("unreadable".to_string())),
            }
        }

        fn video_dimensions(&mut self, _path: &Path) -> Result<Dimensions> {
            Ok((0, 0))
        }
    }

    #[test]
    fn test_duration_labels() {
        let backend = MediaBackend::spawn(|| Ok(FixedProbe)).unwrap();
        let mut classifier = DurationClassifier::new(
            Duration::from_secs(60),
            backend.handle(),
            StockLabels::new(&LabelNames::default()),
        );

        let label = |c: &mut DurationClassifier, p: &str| c.classify(&LabelFile::new(p, 0)).unwrap();
        assert_eq!(label(&mut classifier, "/in/short.mp3"), vec![Label::new("Smaller")]);
        assert_eq!(label(&mut classifier, "/in/exact.mp4"), vec![Label::new("Bigger")]);
        assert_eq!(label(&mut classifier, "/in/long.mkv"), vec![Label::new("Bigger")]);
        assert_eq!(label(&mut classifier, "/in/photo.png"), vec![Label::new("Unknown")]);

        assert!(classifier.classify(&LabelFile::new("/in/broken.ogg", 0)).is_err());

        drop(classifier);
        backend.shutdown();
    }
}
