// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Automated classification policies

pub mod duration;
pub mod file_type;
pub mod resolution;
pub mod size;

use std::sync::Arc;

use crate::config::{Automation, LabelNames, LabelerSetting};
use crate::file::LabelFile;
use crate::label::Label;
use crate::media::image::HeaderDecoder;
use crate::media::{ImageDecoder, MediaHandle};
use crate::{LabelError, Result};

/// A policy that picks labels for one file at a time
pub trait Classifier {
    /// Name of this policy
    fn name(&self) -> &'static str;

    /// Labels to append to `file`
    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>>;
}

/// Backends the classifiers may need
#[derive(Clone)]
pub struct Backends {
    pub media: Option<MediaHandle>,
    pub images: Arc<dyn ImageDecoder>,
}

impl Backends {
    pub fn with_media(media: MediaHandle) -> Self {
        Self {
            media: Some(media),
            ..Self::default()
        }
    }
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            media: None,
            images: Arc::new(HeaderDecoder),
        }
    }
}

/// The fixed labels shared by every file of one run
#[derive(Debug, Clone)]
pub struct StockLabels {
    pub video: Label,
    pub audio: Label,
    pub text: Label,
    pub archive: Label,
    pub image: Label,
    pub unknown: Label,
    pub bigger: Label,
    pub smaller: Label,
}

impl StockLabels {
    pub fn new(names: &LabelNames) -> Self {
        Self {
            video: Label::new(names.video.as_str()),
            audio: Label::new(names.audio.as_str()),
            text: Label::new(names.text.as_str()),
            archive: Label::new(names.archive.as_str()),
            image: Label::new(names.image.as_str()),
            unknown: Label::new(names.unknown.as_str()),
            bigger: Label::new(names.bigger.as_str()),
            smaller: Label::new(names.smaller.as_str()),
        }
    }

    /// "Bigger" when the threshold is met or exceeded, "Smaller" otherwise
    pub fn by_threshold(&self, meets_threshold: bool) -> Label {
        if meets_threshold {
            self.bigger.clone()
        } else {
            self.smaller.clone()
        }
    }
}

/// Build the classifier for the configured automation; `None` for manual labeling
pub fn classifier_for(settings: &LabelerSetting, backends: Backends) -> Result<Option<Box<dyn Classifier>>> {
    let stock = StockLabels::new(&settings.label_names);

    let classifier: Box<dyn Classifier> = match settings.automation {
        Automation::Manual => return Ok(None),
        Automation::ByFileType if settings.automate_file_type_use_extensions => {
            Box::new(file_type::ExtensionClassifier::new(stock))
        }
        Automation::ByFileType => Box::new(file_type::CategoryClassifier::new(stock)),
        Automation::ByFileSize => Box::new(size::FileSizeClassifier::new(
            settings.automate_file_size_min_size,
            stock,
        )),
        Automation::ByDuration => {
            let media = backends.media.ok_or_else(|| {
                LabelError::MediaUnavailable("duration sorting needs the media backend".to_string())
            })?;
            Box::new(duration::DurationClassifier::new(
                settings.automation_duration,
                media,
                stock,
            ))
        }
        Automation::ByImageSize => Box::new(resolution::ResolutionClassifier::new(
            settings.automate_image_size_min_width,
            settings.automate_image_size_min_height,
            backends,
            stock,
        )),
    };

    Ok(Some(classifier))
}
