// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Progress reporting and cancellation for long-running batches

use tokio::sync::watch;

/// Cancellation signal; the batch stops between files once it reads `true`
pub type CancelSignal = watch::Receiver<bool>;

pub(crate) fn is_cancelled(signal: Option<&CancelSignal>) -> bool {
    signal.map(|rx| *rx.borrow()).unwrap_or(false)
}

/// Snapshot of a running batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStatus {
    pub title: String,
    pub working_on: String,
    pub percent: u32,
    pub indeterminate: bool,
}

impl ProgressStatus {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Receiver of progress updates
pub trait Progress {
    fn update(&self, status: &ProgressStatus);
}

impl<F> Progress for F
where
    F: Fn(&ProgressStatus),
{
    fn update(&self, status: &ProgressStatus) {
        self(status)
    }
}

/// Progress sink that drops every update
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&self, _status: &ProgressStatus) {}
}

/// Percentage after finishing item `index` (zero-based) of `total`
pub(crate) fn percent_of(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (index * 100 / total) as u32
}
