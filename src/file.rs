// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Discovered files and their type classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{LabelFilesBy, LabelerSetting};
use crate::label::Label;
use crate::plan::PlanEntry;

/// Coarse file category, used by automation and previewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Unsupported,
    Archive,
    Audio,
    Image,
    Video,
    Text,
}

impl FileType {
    /// Look up the category of a lower-cased extension (with its leading dot)
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".mp1" | ".mp2" | ".mp3" | ".aac" | ".ogg" | ".ac3" | ".eac3" | ".dts" | ".wma"
            | ".flac" | ".m4a" | ".spx" | ".mpc" | ".aa3" | ".wv" | ".mod" | ".tta" | ".ape"
            | ".ra" | ".alaw" | ".ulaw" | ".amr" | ".mid" | ".pcm" | ".adpcm" | ".qcelp"
            | ".dvf" | ".qdm" => Self::Audio,

            ".zip" | ".bz2" | ".gz" | ".tgz" => Self::Archive,

            ".mpg" | ".mpeg" | ".avi" | ".divx" | ".mkv" | ".mp4" | ".flv" | ".xvid" | ".3ivx"
            | ".d4" | ".h261" | ".h263" | ".h264" | ".ogv" | ".mjpeg" | ".wmv" | ".asf" | ".dv"
            | ".rm" | ".rv" => Self::Video,

            ".txt" | ".md" | ".xml" | ".js" | ".html" | ".css" | ".py" | ".php" | ".sh"
            | ".bat" | ".sql" | ".json" | ".java" | ".c" | ".h" | ".cpp" | ".cs" | ".go"
            | ".r" | ".ui" | ".glade" | ".axaml" | ".xaml" => Self::Text,

            ".png" | ".jpg" | ".jpeg" | ".gif" | ".bmp" | ".tiff" => Self::Image,

            _ => Self::Unsupported,
        }
    }

    pub fn is_media(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One file found by the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlanEntry", into = "PlanEntry")]
pub struct LabelFile {
    original_path: PathBuf,
    id: usize,
    labels: Vec<Label>,
    final_target_path: Option<PathBuf>,

    // Derived from `original_path` at construction
    original_file_name: String,
    file_extension: String,
    file_type: FileType,
}

impl LabelFile {
    pub fn new(original_path: impl Into<PathBuf>, id: usize) -> Self {
        let original_path = original_path.into();
        let (original_file_name, file_extension) = split_file_name(&original_path);
        let file_type = FileType::from_extension(&file_extension.to_lowercase());

        Self {
            original_path,
            id,
            labels: Vec::new(),
            final_target_path: None,
            original_file_name,
            file_extension,
            file_type,
        }
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// File name without folder and extension
    pub fn original_file_name(&self) -> &str {
        &self.original_file_name
    }

    /// Extension including its leading dot, as found on disk; empty when there is none
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Append labels chosen by a classifier, in order
    pub fn extend_labels(&mut self, labels: impl IntoIterator<Item = Label>) {
        self.labels.extend(labels);
        self.final_target_path = None;
    }

    /// Assign a label by hand.
    ///
    /// A label that is already present is ignored. When files go into a single
    /// subfolder the new label replaces the old ones, since a file can only sit
    /// in one folder. Returns whether anything changed.
    pub fn add_label(&mut self, label: Label, settings: &LabelerSetting) -> bool {
        if self.has_label(&label) {
            return false;
        }
        if settings.label_files_by == LabelFilesBy::Subfolder && !settings.allow_recursive_subfolders {
            self.labels.clear();
        }
        self.labels.push(label);
        self.final_target_path = None;
        true
    }

    /// Remove a label by name. Returns whether it was present.
    pub fn remove_label(&mut self, label: &Label) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        let removed = self.labels.len() != before;
        if removed {
            self.final_target_path = None;
        }
        removed
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
        self.final_target_path = None;
    }

    /// Cached target path, if resolved or set by hand
    pub fn final_target_path(&self) -> Option<&Path> {
        self.final_target_path.as_deref()
    }

    /// Override the target path; kept until the labels change
    pub fn set_final_target_path(&mut self, path: impl Into<PathBuf>) {
        self.final_target_path = Some(path.into());
    }

    pub(crate) fn cache_target_path(&mut self, path: PathBuf) {
        self.final_target_path = Some(path);
    }

    pub(crate) fn restore(
        original_path: PathBuf,
        id: usize,
        labels: Vec<Label>,
        final_target_path: Option<PathBuf>,
    ) -> Self {
        let mut file = Self::new(original_path, id);
        file.labels = labels;
        file.final_target_path = final_target_path;
        file
    }
}

/// Split a file name at its last dot into name and extension (dot included)
fn split_file_name(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.rfind('.') {
        Some(idx) => (file_name[..idx].to_string(), file_name[idx..].to_string()),
        None => (file_name, String::new()),
    }
}
