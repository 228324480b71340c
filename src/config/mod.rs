// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Labeling settings and their JSON persistence

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::{LabelError, Result};

/// What happens to each file once its target is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    #[default]
    Copy,
    Move,
}

/// How labels show up in the target path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LabelFilesBy {
    /// Put each file in a folder named after its label(s)
    #[default]
    Subfolder,
    /// Rename each file with the rename template
    Rename,
}

/// Automated classification policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Automation {
    #[default]
    Manual,
    ByDuration,
    ByImageSize,
    ByFileType,
    ByFileSize,
}

/// Display names of the stock labels
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LabelNames {
    pub video: String,
    pub audio: String,
    pub text: String,
    pub archive: String,
    pub image: String,
    pub unknown: String,
    pub bigger: String,
    pub smaller: String,
}

impl Default for LabelNames {
    fn default() -> Self {
        Self {
            video: "Video".to_string(),
            audio: "Audio".to_string(),
            text: "Text".to_string(),
            archive: "Archive".to_string(),
            image: "Image".to_string(),
            unknown: "Unknown".to_string(),
            bigger: "Bigger".to_string(),
            smaller: "Smaller".to_string(),
        }
    }
}

/// Settings for one labeling project
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabelerSetting {
    /// The folder to sort
    #[serde(default)]
    pub input_folder: PathBuf,

    /// Backing field for the output folder, read through [`LabelerSetting::output_folder`]
    #[serde(default, rename = "output_folder")]
    output_folder: PathBuf,

    /// Sort into the input folder instead of the output folder
    #[serde(default = "default_true")]
    pub sort_in_input_folder: bool,

    #[serde(default)]
    pub operation: Operation,

    #[serde(default)]
    pub label_files_by: LabelFilesBy,

    /// Nest one subfolder per label instead of using only the first one
    #[serde(default)]
    pub allow_recursive_subfolders: bool,

    /// Search subfolders of the input folder
    #[serde(default)]
    pub allow_searching_subfolders: bool,

    /// Template used in rename mode; knows `%label%`, `%id%` and `%name%`
    #[serde(default = "default_rename_template")]
    pub rename_template: String,

    /// Extensions to look for, like "mp3" (not "*.mp3")
    #[serde(default)]
    pub filter: Vec<String>,

    #[serde(default)]
    pub use_filters: bool,

    #[serde(default)]
    pub automation: Automation,

    /// Minimum media duration for the "Bigger" label
    #[serde(default, with = "duration_text")]
    pub automation_duration: Duration,

    /// Label by extension instead of by file type
    #[serde(default)]
    pub automate_file_type_use_extensions: bool,

    /// Minimum file size in bytes for the "Bigger" label
    #[serde(default = "default_min_size")]
    pub automate_file_size_min_size: u64,

    #[serde(default = "default_min_dimension")]
    pub automate_image_size_min_width: u32,

    #[serde(default = "default_min_dimension")]
    pub automate_image_size_min_height: u32,

    #[serde(default)]
    pub label_names: LabelNames,

    /// Pause after each file during automated classification
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

// Default value functions
fn default_true() -> bool { true }
fn default_rename_template() -> String { "%label% - %name%".to_string() }
fn default_min_size() -> u64 { 1 }
fn default_min_dimension() -> u32 { 100 }
fn default_throttle_ms() -> u64 { 10 }

impl Default for LabelerSetting {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::new(),
            output_folder: PathBuf::new(),
            sort_in_input_folder: true,
            operation: Operation::default(),
            label_files_by: LabelFilesBy::default(),
            allow_recursive_subfolders: false,
            allow_searching_subfolders: false,
            rename_template: default_rename_template(),
            filter: Vec::new(),
            use_filters: false,
            automation: Automation::default(),
            automation_duration: Duration::ZERO,
            automate_file_type_use_extensions: false,
            automate_file_size_min_size: default_min_size(),
            automate_image_size_min_width: default_min_dimension(),
            automate_image_size_min_height: default_min_dimension(),
            label_names: LabelNames::default(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

impl LabelerSetting {
    /// Settings for sorting `input_folder` in place
    pub fn with_input(input_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            ..Self::default()
        }
    }

    /// The folder files are sorted into. Reads as the input folder while
    /// `sort_in_input_folder` is set.
    pub fn output_folder(&self) -> &Path {
        if self.sort_in_input_folder {
            &self.input_folder
        } else {
            &self.output_folder
        }
    }

    /// Set the output folder; this turns `sort_in_input_folder` off
    pub fn set_output_folder(&mut self, folder: impl Into<PathBuf>) {
        self.sort_in_input_folder = false;
        self.output_folder = folder.into();
    }

    /// The stored output folder, ignoring `sort_in_input_folder`
    pub fn raw_output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Check the settings before a run
    pub fn validate(&self) -> Result<()> {
        if self.input_folder.as_os_str().is_empty() {
            return Err(LabelError::Config("No input folder set".to_string()));
        }
        if !self.sort_in_input_folder && self.output_folder.as_os_str().is_empty() {
            return Err(LabelError::Config("No output folder set".to_string()));
        }
        if self.label_files_by == LabelFilesBy::Rename && self.rename_template.trim().is_empty() {
            return Err(LabelError::Config("Rename template is empty".to_string()));
        }
        if self.label_files_by == LabelFilesBy::Rename && self.output_folder.as_os_str().is_empty() {
            return Err(LabelError::Config("Rename mode needs an output folder".to_string()));
        }
        if self.use_filters && self.filter.iter().all(|f| f.trim().is_empty()) {
            return Err(LabelError::Config("Filters enabled but none given".to_string()));
        }
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| LabelError::Config(format!("Failed to parse config: {}", e)))?;
            infer_in_place_flag(&mut value);
            let settings: Self = serde_json::from_value(value)
                .map_err(|e| LabelError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(settings)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// A hand-written config naming an output folder but not the in-place flag
/// means to sort into that folder
fn infer_in_place_flag(value: &mut serde_json::Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    if object.contains_key("sort_in_input_folder") {
        return;
    }
    let has_output = object
        .get("output_folder")
        .and_then(|v| v.as_str())
        .is_some_and(|v| !v.trim().is_empty());
    if has_output {
        object.insert("sort_in_input_folder".to_string(), serde_json::Value::Bool(false));
    }
}

/// `path` made absolute against the current directory, with `.` components dropped
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Parse a duration written as `[d:]hh:mm:ss[.fffffff]`
pub fn parse_duration(text: &str) -> Result<Duration> {
    let invalid = || LabelError::Config(format!("Invalid duration '{}', expected d:hh:mm:ss.fffffff", text));

    let text = text.trim();
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let numbers = parts
        .iter()
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                p.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<u64>>>()
        .ok_or_else(invalid)?;

    let (days, hours, minutes, seconds) = match numbers.as_slice() {
        [h, m, s] => (0, *h, *m, *s),
        [d, h, m, s] => (*d, *h, *m, *s),
        _ => return Err(invalid()),
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    // 100 ns ticks, up to seven digits
    let ticks = match fraction {
        Some(f) if f.is_empty() || f.len() > 7 || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid())
        }
        Some(f) => f.parse::<u32>().map_err(|_| invalid())? * 10u32.pow(7 - f.len() as u32),
        None => 0,
    };

    let total_secs = days
        .checked_mul(86_400)
        .and_then(|s| s.checked_add(hours * 3600 + minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok(Duration::new(total_secs, ticks * 100))
}

/// Format a duration as `d:hh:mm:ss.fffffff`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{}:{:02}:{:02}:{:02}.{:07}",
        secs / 86_400,
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        duration.subsec_nanos() / 100
    )
}

/// Parse a byte count with an optional binary unit, like `1000`, `10 KB` or `2mb`
pub fn parse_byte_size(text: &str) -> Result<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);

    let value: u64 = number
        .parse()
        .map_err(|_| LabelError::Config(format!("Invalid size '{}'", text)))?;

    let power: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1 << 10,
        "MB" | "M" => 1 << 20,
        "GB" | "G" => 1 << 30,
        "TB" | "T" => 1 << 40,
        other => return Err(LabelError::Config(format!("Unknown size unit '{}'", other))),
    };

    value
        .checked_mul(power)
        .ok_or_else(|| LabelError::Config(format!("Size '{}' is too large", text)))
}

/// Serde adapter storing a [`Duration`] as `d:hh:mm:ss.fffffff`
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_folder_follows_input_when_sorting_in_place() {
        let mut settings = LabelerSetting::with_input("/in");
        assert_eq!(settings.output_folder(), Path::new("/in"));

        settings.set_output_folder("/out");
        assert!(!settings.sort_in_input_folder);
        assert_eq!(settings.output_folder(), Path::new("/out"));

        settings.sort_in_input_folder = true;
        assert_eq!(settings.output_folder(), Path::new("/in"));
        assert_eq!(settings.raw_output_folder(), Path::new("/out"));
    }

    #[test]
    fn test_defaults() {
        let settings = LabelerSetting::default();
        assert_eq!(settings.rename_template, "%label% - %name%");
        assert_eq!(settings.operation, Operation::Copy);
        assert_eq!(settings.label_files_by, LabelFilesBy::Subfolder);
        assert_eq!(settings.automation, Automation::Manual);
        assert_eq!(settings.automate_file_size_min_size, 1);
        assert_eq!(settings.automate_image_size_min_width, 100);
        assert!(settings.sort_in_input_folder);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0:00:01:30.0000000").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("00:02:00").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1:00:00:00").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("00:00:01.5").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("00:61:00").is_err());
        assert!(parse_duration("1:2").is_err());
        assert!(parse_duration("aa:bb:cc").is_err());
        assert!(parse_duration("00:00:01.").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "0:00:01:30.0000000");
        assert_eq!(
            format_duration(Duration::new(93_784, 500_000_000)),
            "1:02:03:04.5000000"
        );
        let d = Duration::new(3723, 1_234_500);
        assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
    }

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("1000").unwrap(), 1000);
        assert_eq!(parse_byte_size("10 KB").unwrap(), 10 * 1024);
        assert_eq!(parse_byte_size("2mb").unwrap(), 2 * 1024 * 1024);
        assert!(parse_byte_size("abc").is_err());
        assert!(parse_byte_size("5 parsecs").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_output_folder() {
        let mut settings = LabelerSetting::with_input("/in");
        settings.set_output_folder("/out");
        settings.automation = Automation::ByDuration;
        settings.automation_duration = Duration::from_secs(300);

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"automation\":\"by_duration\""));
        assert!(json.contains("0:00:05:00.0000000"));

        let back: LabelerSetting = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        assert_eq!(back.output_folder(), Path::new("/out"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: LabelerSetting = serde_json::from_str(r#"{"input_folder": "/music"}"#).unwrap();
        assert!(settings.sort_in_input_folder);
        assert_eq!(settings.throttle_ms, 10);
        assert_eq!(settings.label_names.bigger, "Bigger");
    }

    #[test]
    fn test_load_with_output_folder_sorts_there() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bluelabel.json");

        std::fs::write(&path, r#"{"input_folder": "/in", "output_folder": "/out"}"#).unwrap();
        let settings = LabelerSetting::load(&path).unwrap();
        assert!(!settings.sort_in_input_folder);
        assert_eq!(settings.output_folder(), Path::new("/out"));

        std::fs::write(
            &path,
            r#"{"input_folder": "/in", "output_folder": "/out", "sort_in_input_folder": true}"#,
        )
        .unwrap();
        let settings = LabelerSetting::load(&path).unwrap();
        assert_eq!(settings.output_folder(), Path::new("/in"));

        std::fs::write(&path, r#"{"input_folder": "/in", "output_folder": ""}"#).unwrap();
        assert!(LabelerSetting::load(&path).unwrap().sort_in_input_folder);
    }

    #[test]
    fn test_absolute_path() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_path(Path::new("rel/dir")).unwrap(), cwd.join("rel").join("dir"));
        assert_eq!(absolute_path(Path::new(".")).unwrap(), cwd);
        assert_eq!(absolute_path(Path::new("/in/./x")).unwrap(), PathBuf::from("/in/x"));
    }

    #[test]
    fn test_validate() {
        assert!(LabelerSetting::default().validate().is_err());

        let mut settings = LabelerSetting::with_input("/in");
        assert!(settings.validate().is_ok());

        settings.use_filters = true;
        assert!(settings.validate().is_err());
        settings.filter = vec!["mp3".to_string()];
        assert!(settings.validate().is_ok());
    }
}
