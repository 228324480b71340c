// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! End-to-end runs over real directories: scan, label, sort and undo

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bluelabel::classify::Backends;
use bluelabel::config::{Automation, LabelFilesBy, Operation};
use bluelabel::error::BatchError;
use bluelabel::history::History;
use bluelabel::progress::{NoProgress, ProgressStatus};
use bluelabel::{scanner, Label, LabelFile, LabelRun, LabelerSetting, Plan, SortExecutor};

/// Temporary input tree with helpers for building and checking it
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Settings sorting this fixture in place, without throttling
    fn settings(&self) -> LabelerSetting {
        let mut settings = LabelerSetting::with_input(self.path());
        settings.throttle_ms = 0;
        settings
    }
}

fn names(files: &[LabelFile]) -> Vec<String> {
    let mut names: Vec<String> = files
        .iter()
        .map(|f| format!("{}{}", f.original_file_name(), f.file_extension()))
        .collect();
    names.sort();
    names
}

// ============================================================================
// Scanning
// ============================================================================

#[test]
fn test_scan_top_level_only_by_default() {
    let fixture = TestFixture::new();
    fixture.create_file("a.txt", b"a");
    fixture.create_file("b.mp3", b"b");
    fixture.create_file("nested/c.txt", b"c");

    let files = scanner::scan(&fixture.settings()).unwrap();
    assert_eq!(names(&files), vec!["a.txt", "b.mp3"]);

    let mut settings = fixture.settings();
    settings.allow_searching_subfolders = true;
    let files = scanner::scan(&settings).unwrap();
    assert_eq!(names(&files), vec!["a.txt", "b.mp3", "c.txt"]);
}

#[test]
fn test_scan_overlapping_filters_yield_unique_ids() {
    let fixture = TestFixture::new();
    fixture.create_file("song.MP3", b"s");
    fixture.create_file("notes.txt", b"n");

    let mut settings = fixture.settings();
    settings.use_filters = true;
    settings.filter = vec!["mp3".to_string(), "*.mp3".to_string(), ".MP3".to_string()];

    let files = scanner::scan(&settings).unwrap();
    assert_eq!(names(&files), vec!["song.MP3"]);
    assert_eq!(files[0].id(), 0);
}

// ============================================================================
// Automated labeling
// ============================================================================

#[test]
fn test_file_type_run_resolves_subfolders() {
    let fixture = TestFixture::new();
    fixture.create_file("clip.mp4", b"v");
    fixture.create_file("readme.md", b"t");
    fixture.create_file("blob.xyz", b"?");

    let mut settings = fixture.settings();
    settings.automation = Automation::ByFileType;

    let files = LabelRun::new(&settings, Backends::default()).run(&NoProgress).unwrap();
    for file in &files {
        let expected = match file.original_file_name() {
            "clip" => "Video",
            "readme" => "Text",
            _ => "Unknown",
        };
        assert_eq!(file.labels(), &[Label::new(expected)]);

        let name = format!("{}{}", file.original_file_name(), file.file_extension());
        assert_eq!(
            file.final_target_path(),
            Some(fixture.path().join(expected).join(name).as_path())
        );
    }
}

#[test]
fn test_extension_run_shares_labels_case_insensitively() {
    let fixture = TestFixture::new();
    fixture.create_file("one.JPG", b"1");
    fixture.create_file("two.jpg", b"2");
    fixture.create_file("Makefile", b"3");

    let mut settings = fixture.settings();
    settings.automation = Automation::ByFileType;
    settings.automate_file_type_use_extensions = true;

    let files = LabelRun::new(&settings, Backends::default()).run(&NoProgress).unwrap();
    for file in &files {
        let expected = if file.file_extension().is_empty() { "Unknown" } else { "jpg" };
        assert_eq!(file.labels()[0].name(), expected);
    }
}

#[test]
fn test_size_threshold_is_inclusive() {
    let fixture = TestFixture::new();
    fixture.create_file("small.bin", &[0u8; 999]);
    fixture.create_file("exact.bin", &[0u8; 1000]);

    let mut settings = fixture.settings();
    settings.automation = Automation::ByFileSize;
    settings.automate_file_size_min_size = 1000;

    let files = LabelRun::new(&settings, Backends::default()).run(&NoProgress).unwrap();
    for file in &files {
        let expected = if file.original_file_name() == "exact" { "Bigger" } else { "Smaller" };
        assert_eq!(file.labels(), &[Label::new(expected)]);
    }
}

#[test]
fn test_empty_folder_reports_no_files_loaded() {
    let fixture = TestFixture::new();
    let mut settings = fixture.settings();
    settings.automation = Automation::ByFileType;

    let errors = LabelRun::new(&settings, Backends::default())
        .run(&NoProgress)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.entries()[0], BatchError::NoFilesLoaded));
}

#[test]
fn test_duration_run_without_media_backend_cannot_start() {
    let fixture = TestFixture::new();
    fixture.create_file("song.mp3", b"s");
    let mut settings = fixture.settings();
    settings.automation = Automation::ByDuration;

    let errors = LabelRun::new(&settings, Backends::default())
        .run(&NoProgress)
        .unwrap_err();
    assert!(matches!(errors.entries()[0], BatchError::Setup(_)));
}

#[test]
fn test_progress_never_goes_backwards() {
    let fixture = TestFixture::new();
    for i in 0..7 {
        fixture.create_file(&format!("f{}.txt", i), b"x");
    }
    let mut settings = fixture.settings();
    settings.automation = Automation::ByFileType;

    let seen = std::cell::RefCell::new(Vec::new());
    let sink = |s: &ProgressStatus| {
        if !s.indeterminate {
            seen.borrow_mut().push(s.percent);
        }
    };
    LabelRun::new(&settings, Backends::default()).run(&sink).unwrap();

    let seen = seen.into_inner();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100));
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_copy_into_output_folder() {
    let fixture = TestFixture::new();
    fixture.create_file("in/photo.png", b"p");
    fixture.create_file("in/song.mp3", b"s");

    let mut settings = fixture.settings();
    settings.input_folder = fixture.path().join("in");
    settings.set_output_folder(fixture.path().join("out"));
    settings.automation = Automation::ByFileType;

    let mut files = LabelRun::new(&settings, Backends::default()).run(&NoProgress).unwrap();
    let errors = SortExecutor::new(&settings).execute(&mut files, &NoProgress);

    assert!(errors.is_empty());
    fixture.assert_file_exists("in/photo.png");
    fixture.assert_file_exists("out/Image/photo.png");
    fixture.assert_file_exists("out/Audio/song.mp3");
}

#[test]
fn test_move_with_rename_template() {
    let fixture = TestFixture::new();
    let song = fixture.create_file("in/song.mp3", b"s");

    let mut settings = fixture.settings();
    settings.input_folder = fixture.path().join("in");
    settings.set_output_folder(fixture.path().join("out"));
    settings.label_files_by = LabelFilesBy::Rename;
    settings.rename_template = "%label% - %name%".to_string();
    settings.operation = Operation::Move;

    let mut file = LabelFile::new(song, 3);
    file.extend_labels([Label::new("Audio")]);

    let errors = SortExecutor::new(&settings).execute(std::slice::from_mut(&mut file), &NoProgress);
    assert!(errors.is_empty());
    fixture.assert_file_not_exists("in/song.mp3");
    fixture.assert_file_exists("out/Audio  - song.mp3");
}

#[test]
fn test_failed_copy_is_isolated() {
    let fixture = TestFixture::new();
    let first = fixture.create_file("first.txt", b"1");
    let second = fixture.create_file("second.txt", b"2");
    // A regular file where a directory is needed makes the second copy fail
    fixture.create_file("blocker", b"");

    let settings = fixture.settings();
    let mut a = LabelFile::new(&first, 0);
    a.extend_labels([Label::new("Text")]);
    let mut b = LabelFile::new(&second, 1);
    b.extend_labels([Label::new("Text")]);
    b.set_final_target_path(fixture.path().join("blocker").join("second.txt"));

    let mut files = vec![a, b];
    let errors = SortExecutor::new(&settings).execute(&mut files, &NoProgress);

    assert_eq!(errors.len(), 1);
    let message = errors.messages().remove(0);
    assert!(message.starts_with(&format!("Error copying file: {}", second.display())));
    assert!(!message.contains("first.txt"));
    fixture.assert_file_exists("Text/first.txt");
}

// ============================================================================
// Plans and undo
// ============================================================================

#[test]
fn test_plan_edit_then_sort_and_undo() {
    let fixture = TestFixture::new();
    fixture.create_file("in/a.txt", b"a");
    fixture.create_file("in/b.txt", b"b");

    let mut settings = fixture.settings();
    settings.input_folder = fixture.path().join("in");
    settings.operation = Operation::Move;

    let files = LabelRun::new(&settings, Backends::default()).run(&NoProgress).unwrap();
    let plan_path = fixture.path().join("plan.json");
    Plan::new(settings.clone(), files).save(&plan_path).unwrap();

    let mut plan = Plan::load(&plan_path).unwrap();
    let plan_settings = plan.settings.clone();
    for file in plan.files.iter_mut() {
        file.add_label(Label::new("Docs"), &plan_settings);
        file.add_label(Label::new("Notes"), &plan_settings);
        assert_eq!(file.labels(), &[Label::new("Notes")]);
    }

    let journal = History::new(fixture.path().join("journal.jsonl"));
    let errors = SortExecutor::new(&plan.settings)
        .with_journal(&journal)
        .execute(&mut plan.files, &NoProgress);
    assert!(errors.is_empty());
    fixture.assert_file_exists("in/Notes/a.txt");
    fixture.assert_file_not_exists("in/a.txt");

    let undone = journal.undo_recent(10, false).unwrap();
    assert_eq!(undone.len(), 2);
    fixture.assert_file_exists("in/a.txt");
    fixture.assert_file_exists("in/b.txt");
    fixture.assert_file_not_exists("in/Notes/a.txt");
}
