// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Target path resolution

use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::config::{absolute_path, LabelFilesBy, LabelerSetting};
use crate::file::LabelFile;
use crate::{LabelError, Result};

/// Compute where `file` goes, without touching its cache
pub fn target_path(file: &LabelFile, settings: &LabelerSetting) -> Result<PathBuf> {
    match settings.label_files_by {
        LabelFilesBy::Subfolder => subfolder_target(file, settings),
        LabelFilesBy::Rename => rename_target(file, settings),
    }
}

/// Compute the target path and cache it on the file
pub fn resolve(file: &mut LabelFile, settings: &LabelerSetting) -> Result<PathBuf> {
    let target = target_path(file, settings)?;
    debug!("Target for {:?}: {:?}", file.original_path(), target);
    file.cache_target_path(target.clone());
    Ok(target)
}

/// The cached target if there is one, otherwise resolve it
pub fn resolved_or_cached(file: &mut LabelFile, settings: &LabelerSetting) -> Result<PathBuf> {
    match file.final_target_path() {
        Some(path) => Ok(path.to_path_buf()),
        None => resolve(file, settings),
    }
}

fn subfolder_target(file: &LabelFile, settings: &LabelerSetting) -> Result<PathBuf> {
    let first = file.labels().first().ok_or(LabelError::NoLabel)?;

    let base = if settings.sort_in_input_folder {
        &settings.input_folder
    } else {
        settings.output_folder()
    };
    let mut target = absolute_path(base)?;

    if settings.allow_recursive_subfolders {
        for label in file.labels() {
            target.push(path_component(label.name())?);
        }
    } else {
        target.push(path_component(first.name())?);
    }

    target.push(format!("{}{}", file.original_file_name(), file.file_extension()));
    Ok(target)
}

fn rename_target(file: &LabelFile, settings: &LabelerSetting) -> Result<PathBuf> {
    // Rename mode never writes into the input folder through the in-place flag
    let base = settings.raw_output_folder();
    if base.as_os_str().is_empty() {
        return Err(LabelError::Config("Rename mode needs an output folder".to_string()));
    }
    for label in file.labels() {
        path_component(label.name())?;
    }

    let name = format!("{}{}", render_name(file, &settings.rename_template), file.file_extension());
    if single_component(&name).is_none() {
        return Err(LabelError::Config(format!("Rename template gives an invalid file name '{}'", name)));
    }

    let mut target = absolute_path(base)?;
    target.push(name);
    Ok(target)
}

/// A label name that stays one plain path component
fn path_component(name: &str) -> Result<&str> {
    single_component(name).ok_or_else(|| LabelError::InvalidLabel(name.to_string()))
}

fn single_component(name: &str) -> Option<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Some(name),
        _ => None,
    }
}

/// Fill the rename template for `file`; the extension is not part of it
pub fn render_name(file: &LabelFile, template: &str) -> String {
    let labels: String = file.labels().iter().map(|l| format!("{} ", l.name())).collect();

    template
        .replace("%label%", &labels)
        .replace("%id%", &file.id().to_string())
        .replace("%name%", file.original_file_name())
}
