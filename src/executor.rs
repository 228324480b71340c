// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Copies or moves labelled files to their target paths

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::{LabelerSetting, Operation};
use crate::error::{BatchError, BatchErrors, FileFailure, Stage};
use crate::file::LabelFile;
use crate::history::{hash_file, History, TransferRecord};
use crate::progress::{is_cancelled, percent_of, CancelSignal, Progress, ProgressStatus};
use crate::resolver;

/// Executes a reviewed batch
pub struct SortExecutor<'a> {
    settings: &'a LabelerSetting,
    journal: Option<&'a History>,
    cancel: Option<CancelSignal>,
}

impl<'a> SortExecutor<'a> {
    pub fn new(settings: &'a LabelerSetting) -> Self {
        Self {
            settings,
            journal: None,
            cancel: None,
        }
    }

    /// Record every finished transfer so it can be undone later
    pub fn with_journal(mut self, journal: &'a History) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Transfer every file; a failing file is recorded and the rest go on
    pub fn execute(&self, files: &mut [LabelFile], progress: &dyn Progress) -> BatchErrors {
        let operation = self.settings.operation;
        let (title, stage) = match operation {
            Operation::Copy => ("Copying files", Stage::Copy),
            Operation::Move => ("Moving files", Stage::Move),
        };
        info!("{} {} files", title, files.len());

        let mut status = ProgressStatus::new(title);
        let mut errors = BatchErrors::new();
        let total = files.len();

        for (i, file) in files.iter_mut().enumerate() {
            if is_cancelled(self.cancel.as_ref()) {
                warn!("Sort cancelled after {} of {} files", i, total);
                errors.push(BatchError::Cancelled { processed: i, total });
                return errors;
            }

            status.working_on = file.original_file_name().to_string();
            progress.update(&status);

            if let Err(e) = self.transfer(file, operation) {
                warn!("Failed to transfer {:?}: {}", file.original_path(), e);
                errors.push_file(FileFailure::new(file.original_path(), stage, e));
            }

            status.percent = percent_of(i, total);
            progress.update(&status);
        }

        if errors.is_empty() {
            status.title = "Finished".to_string();
            status.working_on = "Nothing".to_string();
            status.percent = 100;
            progress.update(&status);
        } else {
            error!("Sort finished with {} errors", errors.len());
        }
        errors
    }

    fn transfer(&self, file: &mut LabelFile, operation: Operation) -> crate::Result<()> {
        let target = resolver::resolved_or_cached(file, self.settings)?;
        let source = file.original_path();

        if same_file(source, &target) {
            debug!("{:?} is already in place", source);
            return Ok(());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match operation {
            Operation::Copy => {
                fs::copy(source, &target)?;
            }
            Operation::Move => move_file(source, &target)?,
        }
        debug!("{:?} -> {:?}", source, target);

        if let Some(journal) = self.journal {
            if let Err(e) = journal_transfer(journal, operation, file, &target) {
                warn!("Could not journal {:?}: {}", target, e);
            }
        }
        Ok(())
    }
}

/// Append a record for a transfer that already happened
fn journal_transfer(journal: &History, operation: Operation, file: &LabelFile, target: &Path) -> crate::Result<()> {
    let record = TransferRecord::new(
        operation,
        file.original_path().to_path_buf(),
        target.to_path_buf(),
        file.labels().iter().map(|l| l.name().to_string()).collect(),
        hash_file(target)?,
    );
    journal.append(&record)
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) if source.exists() => {
            debug!("rename failed ({}), copying instead", e);
            fs::copy(source, target)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}

fn same_file(source: &Path, target: &Path) -> bool {
    if source == target {
        return true;
    }
    match (source.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
