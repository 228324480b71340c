// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification by file type or raw extension

use tracing::debug;

use super::{Classifier, StockLabels};
use crate::file::{FileType, LabelFile};
use crate::label::{Label, LabelPool};
use crate::Result;

/// One label per coarse file category
pub struct CategoryClassifier {
    stock: StockLabels,
}

impl CategoryClassifier {
    pub fn new(stock: StockLabels) -> Self {
        Self { stock }
    }
}

impl Classifier for CategoryClassifier {
    fn name(&self) -> &'static str {
        "file-type"
    }

    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>> {
        let label = match file.file_type() {
            FileType::Video => &self.stock.video,
            FileType::Audio => &self.stock.audio,
            FileType::Text => &self.stock.text,
            FileType::Archive => &self.stock.archive,
            FileType::Image => &self.stock.image,
            FileType::Unsupported => &self.stock.unknown,
        };
        Ok(vec![label.clone()])
    }
}

/// One label per lower-cased extension, pooled for the run
pub struct ExtensionClassifier {
    pool: LabelPool,
    unknown: Label,
}

impl ExtensionClassifier {
    pub fn new(stock: StockLabels) -> Self {
        Self {
            pool: LabelPool::new(),
            unknown: stock.unknown,
        }
    }

    /// Labels created so far
    pub fn pool(&self) -> &LabelPool {
        &self.pool
    }
}

impl Classifier for ExtensionClassifier {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>> {
        let ext = file.file_extension().trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            debug!("No extension on {:?}", file.original_path());
            return Ok(vec![self.unknown.clone()]);
        }
        Ok(vec![self.pool.get_or_insert(&ext)])
    }
}
