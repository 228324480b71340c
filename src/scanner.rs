// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Folder scanning

use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{absolute_path, LabelerSetting};
use crate::file::LabelFile;
use crate::{LabelError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Enumerate the files to label.
///
/// Ids follow enumeration order. Paths matched by more than one filter are
/// kept once. Any enumeration error fails the whole scan.
pub fn scan(settings: &LabelerSetting) -> Result<Vec<LabelFile>> {
    scan_excluding(settings, &[])
}

/// [`scan`], leaving out the given files (settings, plan or journal kept next to the input)
pub fn scan_excluding(settings: &LabelerSetting, excluded: &[PathBuf]) -> Result<Vec<LabelFile>> {
    if settings.input_folder.as_os_str().is_empty() {
        return Err(LabelError::DirectoryNotFound(PathBuf::new()));
    }
    let root = absolute_path(&settings.input_folder)?;
    if !root.is_dir() {
        return Err(LabelError::DirectoryNotFound(root));
    }

    info!(
        "Scanning {:?} (subfolders: {}, filters: {})",
        root,
        settings.allow_searching_subfolders,
        if settings.use_filters { settings.filter.join(",") } else { "none".to_string() }
    );

    let patterns = if settings.use_filters {
        settings
            .filter
            .iter()
            .filter_map(|f| normalize_filter(f))
            .map(|ext| Pattern::new(&format!("*.{}", Pattern::escape(&ext))))
            .collect::<std::result::Result<Vec<_>, _>>()?
    } else {
        vec![Pattern::new("*")?]
    };

    // Only files that exist can be matched against, so canonical paths are enough
    let excluded: HashSet<PathBuf> = excluded.iter().filter_map(|p| p.canonicalize().ok()).collect();

    let mut candidates = Vec::new();
    walk(&root, settings.allow_searching_subfolders, &mut candidates)?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in &patterns {
        for path in &candidates {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if !pattern.matches_with(&name, MATCH_OPTIONS) || seen.contains(path) {
                continue;
            }
            if !excluded.is_empty() && path.canonicalize().is_ok_and(|p| excluded.contains(&p)) {
                debug!("Skipping {:?}", path);
                continue;
            }
            seen.insert(path.clone());
            let id = files.len();
            debug!("Found [{}] {:?}", id, path);
            files.push(LabelFile::new(path.clone(), id));
        }
    }

    info!("Found {} files", files.len());
    Ok(files)
}

/// Regular files under `dir` in name order, descending into subfolders when `recursive`
fn walk(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if recursive {
                walk(&path, recursive, files)?;
            }
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Turn a filter entry like "mp3", ".mp3" or "*.mp3" into "mp3"
fn normalize_filter(filter: &str) -> Option<String> {
    let ext = filter.trim().trim_start_matches('*').trim_start_matches('.').trim();
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_string())
    }
}
