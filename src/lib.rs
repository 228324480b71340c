// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! BlueLabel: label files and sort them into folders
//!
//! Files in an input folder are scanned, labelled by hand or by one of the
//! automation policies (file type, size, duration, resolution), and then
//! copied or moved to a path derived from their labels.

pub mod automation;
pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod file;
pub mod history;
pub mod label;
pub mod media;
pub mod plan;
pub mod progress;
pub mod resolver;
pub mod scanner;

pub use automation::LabelRun;
pub use config::LabelerSetting;
pub use error::{BatchErrors, LabelError, Result};
pub use executor::SortExecutor;
pub use file::{FileType, LabelFile};
pub use label::Label;
pub use plan::Plan;
