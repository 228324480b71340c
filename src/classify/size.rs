// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classification by file size

use super::{Classifier, StockLabels};
use crate::file::LabelFile;
use crate::label::Label;
use crate::Result;

pub struct FileSizeClassifier {
    min_size: u64,
    stock: StockLabels,
}

impl FileSizeClassifier {
    pub fn new(min_size: u64, stock: StockLabels) -> Self {
        Self { min_size, stock }
    }
}

impl Classifier for FileSizeClassifier {
    fn name(&self) -> &'static str {
        "file-size"
    }

    fn classify(&mut self, file: &LabelFile) -> Result<Vec<Label>> {
        let len = std::fs::metadata(file.original_path())?.len();
        Ok(vec![self.stock.by_threshold(len >= self.min_size)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelNames;

    #[test]
    fn test_threshold_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let mut classifier = FileSizeClassifier::new(1000, StockLabels::new(&LabelNames::default()));

        for (name, len, expected) in [("small", 999, "Smaller"), ("exact", 1000, "Bigger"), ("large", 1001, "Bigger")] {
            let path = dir.path().join(name);
            std::fs::write(&path, vec![0u8; len]).unwrap();
            let labels = classifier.classify(&LabelFile::new(&path, 0)).unwrap();
            assert_eq!(labels, vec![Label::new(expected)], "{} bytes", len);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut classifier = FileSizeClassifier::new(1, StockLabels::new(&LabelNames::default()));
        assert!(classifier.classify(&LabelFile::new("/no/such/file.bin", 0)).is_err());
    }
}
