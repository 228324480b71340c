// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Scan, classify and resolve in one pass
//!
//! Files are handled one after another. A failing file is recorded and
//! skipped; once the pass is over any recorded failure fails the whole run,
//! so nothing half-labelled reaches review.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::classify::{classifier_for, Backends, Classifier};
use crate::config::LabelerSetting;
use crate::error::{BatchError, BatchErrors, FileFailure, Stage};
use crate::file::LabelFile;
use crate::progress::{is_cancelled, percent_of, CancelSignal, Progress, ProgressStatus};
use crate::{resolver, scanner};

/// One automated labeling run
pub struct LabelRun<'a> {
    settings: &'a LabelerSetting,
    backends: Backends,
    cancel: Option<CancelSignal>,
    excluded: Vec<PathBuf>,
}

impl<'a> LabelRun<'a> {
    pub fn new(settings: &'a LabelerSetting, backends: Backends) -> Self {
        Self {
            settings,
            backends,
            cancel: None,
            excluded: Vec::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Files to leave out of the scan
    pub fn excluding(mut self, paths: Vec<PathBuf>) -> Self {
        self.excluded = paths;
        self
    }

    /// Scan the input folder and label it with the configured automation.
    ///
    /// Manual automation returns the scanned files untouched for labeling by hand.
    pub fn run(self, progress: &dyn Progress) -> Result<Vec<LabelFile>, BatchErrors> {
        let mut status = ProgressStatus::new("Getting files");
        status.working_on = "Getting files".to_string();
        status.indeterminate = true;
        progress.update(&status);

        let mut files = scanner::scan_excluding(self.settings, &self.excluded).map_err(|e| {
            error!("Scan failed: {}", e);
            BatchErrors::from(BatchError::Scan(e))
        })?;

        let classifier = classifier_for(self.settings, self.backends.clone())
            .map_err(|e| BatchErrors::from(BatchError::Setup(e)))?;

        let Some(mut classifier) = classifier else {
            if files.is_empty() {
                warn!("No files to label by hand");
                return Err(BatchErrors::from(BatchError::NoFilesLoaded));
            }
            info!("Manual labeling, {} files to review", files.len());
            return Ok(files);
        };

        self.classify_all(classifier.as_mut(), &mut files, progress)
            .into_result()
            .map(|()| files)
    }

    /// Label and resolve every file, collecting per-file failures
    pub fn classify_all(
        &self,
        classifier: &mut dyn Classifier,
        files: &mut [LabelFile],
        progress: &dyn Progress,
    ) -> BatchErrors {
        info!("Sorting {} files by {}", files.len(), classifier.name());

        let mut status = ProgressStatus::new("Sorting automatically");
        let mut errors = BatchErrors::new();
        let total = files.len();
        let throttle = self.settings.throttle();

        for (i, file) in files.iter_mut().enumerate() {
            if is_cancelled(self.cancel.as_ref()) {
                warn!("Labeling cancelled after {} of {} files", i, total);
                errors.push(BatchError::Cancelled { processed: i, total });
                return errors;
            }

            status.working_on = file.original_file_name().to_string();
            progress.update(&status);

            if let Err(e) = self.classify_one(classifier, file) {
                warn!("Failed to label {:?}: {}", file.original_path(), e);
                errors.push_file(FileFailure::new(file.original_path(), Stage::Classify, e));
            }

            status.percent = percent_of(i, total);
            progress.update(&status);

            if !throttle.is_zero() {
                std::thread::sleep(throttle);
            }
        }

        if total == 0 {
            errors.push(BatchError::NoFilesLoaded);
        }

        if errors.is_empty() {
            status.percent = 100;
            progress.update(&status);
        } else {
            error!("Labeling finished with {} errors", errors.len());
        }
        errors
    }

    fn classify_one(&self, classifier: &mut dyn Classifier, file: &mut LabelFile) -> crate::Result<()> {
        let labels = classifier.classify(file)?;
        debug!(
            "[{}] {:?} -> {:?}",
            file.id(),
            file.original_path(),
            labels.iter().map(|l| l.name()).collect::<Vec<_>>()
        );
        file.extend_labels(labels);
        resolver::resolve(file, self.settings)?;
        Ok(())
    }
}
