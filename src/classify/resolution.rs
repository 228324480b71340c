// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification by image or video resolution

use tracing::debug;

use super::{Backends, Classifier, StockLabels};
use crate::file::{FileType, LabelFile};
use crate::label::Label;
use crate::{LabelError, Result};

/// "Bigger" when both width and height meet their minimums
pub struct ResolutionClassifier {
    min_width: u32,
    min_height: u32,
    backends: Backends,
    stock: StockLabels,
}

impl ResolutionClassifier {
    pub fn new(min_width: u32, min_height: u32, backends: Backends, stock: StockLabels) -> Self {
        Self {
            min_width,
            min_height,
            backends,
            stock,
        }
    }

    fn meets(&self, (width, height): (u32, u32)) -> bool {
        width >= self.min_width && height >= self.min_height
    }
}

impl Classifier for ResolutionClassifier {
    fn name(&self) -> &'static str {
        "resolution"
    }

    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>> {
        let dimensions = match file.file_type() {
            FileType::Image => self.backends.images.dimensions(file.original_path())?,
            FileType::Video => {
                let media = self.backends.media.as_ref().ok_or_else(|| {
                    LabelError::MediaUnavailable("video resolution needs the media backend".to_string())
                })?;
                media.video_dimensions(file.original_path())?
            }
            _ => return Ok(vec![self.stock.unknown.clone()]),
        };

        debug!("{:?} is {}x{}", file.original_path(), dimensions.0, dimensions.1);
        Ok(vec![self.stock.by_threshold(self.meets(dimensions))])
    }
}
