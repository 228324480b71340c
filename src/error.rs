// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for BlueLabel

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for BlueLabel operations
pub type Result<T> = std::result::Result<T, LabelError>;

/// BlueLabel error types
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Media backend not available: {0}")]
    MediaUnavailable(String),

    #[error("No label assigned")]
    NoLabel,

    #[error("Label '{0}' cannot be used as a folder or file name")]
    InvalidLabel(String),

    #[error("No file with id {0}")]
    UnknownFile(usize),

    #[error("Hash mismatch for {}", .0.display())]
    HashMismatch(PathBuf),

    #[error("{0}")]
    Batch(#[from] BatchErrors),
}

/// Batch stage a per-file failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Copy,
    Move,
}

/// A failure isolated to one file of a batch
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: Stage,
    pub error: LabelError,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, stage: Stage, error: LabelError) -> Self {
        Self {
            path: path.into(),
            stage,
            error,
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Classify => write!(f, "{}: {}", self.path.display(), self.error),
            Stage::Copy => write!(f, "Error copying file: {}, {}", self.path.display(), self.error),
            Stage::Move => write!(f, "Error moving file: {}, {}", self.path.display(), self.error),
        }
    }
}

/// One entry in an aggregated batch report
#[derive(Debug)]
pub enum BatchError {
    /// The input folder could not be enumerated
    Scan(LabelError),
    /// The run could not start, e.g. a backend is missing
    Setup(LabelError),
    /// A single file failed; the batch went on
    File(FileFailure),
    /// The scan found nothing to work on
    NoFilesLoaded,
    /// The batch was stopped before finishing
    Cancelled { processed: usize, total: usize },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(e) => write!(f, "Error while getting files: {}", e),
            Self::Setup(e) => write!(f, "Cannot start: {}", e),
            Self::File(failure) => failure.fmt(f),
            Self::NoFilesLoaded => f.write_str("No files loaded"),
            Self::Cancelled { processed, total } => {
                write!(f, "Cancelled after {} of {} files", processed, total)
            }
        }
    }
}

/// Ordered list of batch errors, shown to the user joined by newlines
#[derive(Debug, Default)]
pub struct BatchErrors {
    entries: Vec<BatchError>,
}

impl BatchErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: BatchError) {
        self.entries.push(error);
    }

    pub fn push_file(&mut self, failure: FileFailure) {
        self.entries.push(BatchError::File(failure));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[BatchError] {
        &self.entries
    }

    /// Human-readable message per entry, in the order they were recorded
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Turn into `Err` when anything was recorded
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for BatchErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchErrors {}

impl From<BatchError> for BatchErrors {
    fn from(error: BatchError) -> Self {
        Self {
            entries: vec![error],
        }
    }
}
