// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Saved labeling plans
//!
//! A plan is the settings of a run together with the labelled files, written
//! out as JSON so the files can be reviewed and edited before sorting.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::LabelerSetting;
use crate::file::LabelFile;
use crate::label::Label;
use crate::{LabelError, Result};

/// On-disk form of one file; the derived fields are recomputed on load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: usize,
    pub original_path: PathBuf,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_target_path: Option<PathBuf>,
}

impl From<LabelFile> for PlanEntry {
    fn from(file: LabelFile) -> Self {
        Self {
            id: file.id(),
            original_path: file.original_path().to_path_buf(),
            labels: file.labels().to_vec(),
            final_target_path: file.final_target_path().map(Path::to_path_buf),
        }
    }
}

impl From<PlanEntry> for LabelFile {
    fn from(entry: PlanEntry) -> Self {
        LabelFile::restore(entry.original_path, entry.id, entry.labels, entry.final_target_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub settings: LabelerSetting,
    pub files: Vec<LabelFile>,
}

impl Plan {
    pub fn new(settings: LabelerSetting, files: Vec<LabelFile>) -> Self {
        Self { settings, files }
    }

    /// Load a plan, rejecting duplicate file ids
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let plan: Self = serde_json::from_str(&content)
            .map_err(|e| LabelError::Config(format!("Failed to parse plan {:?}: {}", path, e)))?;

        let mut seen = HashSet::new();
        if let Some(dup) = plan.files.iter().find(|f| !seen.insert(f.id())) {
            return Err(LabelError::Config(format!("Duplicate file id {} in plan", dup.id())));
        }

        info!("Loaded plan with {} files from {:?}", plan.files.len(), path);
        Ok(plan)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn file(&self, id: usize) -> Result<&LabelFile> {
        self.files
            .iter()
            .find(|f| f.id() == id)
            .ok_or(LabelError::UnknownFile(id))
    }

    pub fn file_mut(&mut self, id: usize) -> Result<&mut LabelFile> {
        self.files
            .iter_mut()
            .find(|f| f.id() == id)
            .ok_or(LabelError::UnknownFile(id))
    }

    /// Files that have no label yet
    pub fn unlabelled(&self) -> impl Iterator<Item = &LabelFile> {
        self.files.iter().filter(|f| f.labels().is_empty())
    }
}
