// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! BlueLabel: label files and sort them into folders

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use bluelabel::classify::Backends;
use bluelabel::config::{
    format_duration, parse_byte_size, parse_duration, Automation, LabelFilesBy, Operation,
};
use bluelabel::history::History;
use bluelabel::media::MediaBackend;
use bluelabel::progress::{CancelSignal, Progress, ProgressStatus};
use bluelabel::{
    resolver, scanner, Label, LabelError, LabelFile, LabelRun, LabelerSetting, Plan, Result,
    SortExecutor,
};

/// BlueLabel CLI - label files and sort them into folders
#[derive(Parser, Debug)]
#[command(name = "bluelabel")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Label files by type, size, duration or resolution and sort them", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to settings file (JSON format)
    #[arg(short, long, default_value = "bluelabel.json", global = true)]
    config: PathBuf,

    /// Transfer journal used for undo
    #[arg(long, default_value = "bluelabel_history.jsonl", global = true)]
    journal: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the files a run would pick up
    Scan {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Scan and label files, then save the result for review
    Plan {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Where to write the plan
        #[arg(short, long, default_value = "plan.json")]
        output: PathBuf,
    },

    /// Show the files of a saved plan and where they will go
    Show {
        /// Plan file
        plan: PathBuf,
    },

    /// Change the labels or target of one file in a saved plan
    Label {
        /// Plan file
        plan: PathBuf,

        /// File id as shown by `show`
        #[arg(long)]
        id: usize,

        /// Labels to add
        #[arg(short, long)]
        add: Vec<String>,

        /// Labels to remove
        #[arg(short, long)]
        remove: Vec<String>,

        /// Remove all labels first
        #[arg(long)]
        clear: bool,

        /// Override the target path
        #[arg(long)]
        target: Option<PathBuf>,
    },

    /// Copy or move the files of a saved plan
    Sort {
        /// Plan file
        plan: PathBuf,

        /// Don't record transfers in the journal
        #[arg(long)]
        no_journal: bool,
    },

    /// Scan, label automatically and sort in one go
    Run {
        #[command(flatten)]
        settings: SettingsArgs,

        /// Actually transfer files (otherwise only show the plan)
        #[arg(short, long)]
        yes: bool,

        /// Don't record transfers in the journal
        #[arg(long)]
        no_journal: bool,
    },

    /// History and undo operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent transfers
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Undo recent transfers
    Undo {
        /// Number of transfers to undo
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Dry run (show what would be undone)
        #[arg(long)]
        dry_run: bool,
    },

    /// Clear all history
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current settings
    Show,

    /// Generate default settings file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "bluelabel.json")]
        output: PathBuf,
    },

    /// Validate settings file
    Validate,
}

/// Overrides for the loaded settings
#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// Folder to scan
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sort into this folder instead of the input folder
    #[arg(long)]
    output_folder: Option<PathBuf>,

    /// Copy or move
    #[arg(long, value_enum)]
    operation: Option<Operation>,

    /// Sort into label subfolders or rename
    #[arg(long, value_enum)]
    label_by: Option<LabelFilesBy>,

    /// Rename template using %label%, %id% and %name%
    #[arg(long)]
    template: Option<String>,

    /// One nested subfolder per label
    #[arg(long)]
    nest: bool,

    /// Also scan subfolders
    #[arg(short, long)]
    recursive: bool,

    /// Only take these extensions (comma separated)
    #[arg(long, value_delimiter = ',')]
    filter: Vec<String>,

    /// Automatic labeling policy
    #[arg(short, long, value_enum)]
    automation: Option<Automation>,

    /// Duration threshold as [d:]hh:mm:ss[.fffffff]
    #[arg(long, value_parser = duration_arg)]
    min_duration: Option<Duration>,

    /// Label by extension instead of file category
    #[arg(long)]
    use_extensions: bool,

    /// Size threshold, e.g. 1500, 512KB, 2MB
    #[arg(long, value_parser = size_arg)]
    min_size: Option<u64>,

    /// Minimum width for the bigger label
    #[arg(long)]
    min_width: Option<u32>,

    /// Minimum height for the bigger label
    #[arg(long)]
    min_height: Option<u32>,

    /// Pause between files in milliseconds
    #[arg(long)]
    throttle_ms: Option<u64>,
}

impl SettingsArgs {
    fn apply(&self, settings: &mut LabelerSetting) {
        if let Some(input) = &self.input {
            settings.input_folder = input.clone();
        }
        if let Some(output) = &self.output_folder {
            settings.set_output_folder(output.clone());
        }
        if let Some(operation) = self.operation {
            settings.operation = operation;
        }
        if let Some(label_by) = self.label_by {
            settings.label_files_by = label_by;
        }
        if let Some(template) = &self.template {
            settings.rename_template = template.clone();
        }
        if self.nest {
            settings.allow_recursive_subfolders = true;
        }
        if self.recursive {
            settings.allow_searching_subfolders = true;
        }
        if !self.filter.is_empty() {
            settings.filter = self.filter.clone();
            settings.use_filters = true;
        }
        if let Some(automation) = self.automation {
            settings.automation = automation;
        }
        if let Some(duration) = self.min_duration {
            settings.automation_duration = duration;
        }
        if self.use_extensions {
            settings.automate_file_type_use_extensions = true;
        }
        if let Some(size) = self.min_size {
            settings.automate_file_size_min_size = size;
        }
        if let Some(width) = self.min_width {
            settings.automate_image_size_min_width = width;
        }
        if let Some(height) = self.min_height {
            settings.automate_image_size_min_height = height;
        }
        if let Some(ms) = self.throttle_ms {
            settings.throttle_ms = ms;
        }
    }
}

fn duration_arg(text: &str) -> std::result::Result<Duration, String> {
    parse_duration(text).map_err(|e| e.to_string())
}

fn size_arg(text: &str) -> std::result::Result<u64, String> {
    parse_byte_size(text).map_err(|e| e.to_string())
}

/// Terminal progress bar fed by batch status updates
struct BarProgress {
    bar: ProgressBar,
}

const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:40.blue}] {pos:>3}% {wide_msg}";

impl BarProgress {
    fn new(quiet: bool) -> Self {
        if quiet {
            return Self { bar: ProgressBar::hidden() };
        }

        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for BarProgress {
    fn update(&self, status: &ProgressStatus) {
        self.bar.set_prefix(status.title.clone());
        self.bar.set_message(status.working_on.clone());
        if status.indeterminate {
            self.bar.tick();
        } else {
            self.bar.set_position(u64::from(status.percent));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = LabelerSetting::load(&cli.config)?;
    let history = History::new(cli.journal.clone());
    // Settings and journal often sit in the folder being sorted
    let own_files = vec![cli.config.clone(), cli.journal.clone()];

    match cli.command {
        Commands::Scan { settings: args } => run_scan(settings, &args, &own_files, &cli.format),
        Commands::Plan { settings: args, output } => {
            let mut excluded = own_files;
            excluded.push(output.clone());
            run_plan(settings, &args, &output, excluded, &cli.format, cli.quiet).await
        }
        Commands::Show { plan } => run_show(&plan, &cli.format),
        Commands::Label { plan, id, add, remove, clear, target } => {
            run_label(&plan, id, add, remove, clear, target)
        }
        Commands::Sort { plan, no_journal } => {
            let journal = (!no_journal).then_some(history);
            run_sort(&plan, journal, cli.quiet).await
        }
        Commands::Run { settings: args, yes, no_journal } => {
            let journal = (!no_journal).then_some(history);
            run_all(settings, &args, yes, journal, own_files, &cli.format, cli.quiet).await
        }
        Commands::History { action } => run_history_command(&history, action, &cli.format),
        Commands::Config { action } => run_config_command(settings, action, &cli.config),
    }
}

/// Cancel signal raised by Ctrl+C; batches stop between files
fn cancel_on_ctrl_c() -> CancelSignal {
    let (cancel_tx, cancel_rx) = watch::channel(false);

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping after the current file...");
            let _ = cancel_tx.send(true);
        }
    });

    cancel_rx
}

fn worker_failed(e: tokio::task::JoinError) -> LabelError {
    LabelError::FileSystem(std::io::Error::new(std::io::ErrorKind::Other, e))
}

/// Scan and label on a blocking worker; media probing runs on its own thread
async fn label_files(settings: &LabelerSetting, excluded: Vec<PathBuf>, quiet: bool) -> Result<Vec<LabelFile>> {
    let media = match settings.automation {
        Automation::ByDuration | Automation::ByImageSize => Some(MediaBackend::spawn_default()?),
        _ => None,
    };
    let backends = media
        .as_ref()
        .map(|m| Backends::with_media(m.handle()))
        .unwrap_or_default();

    let run_settings = settings.clone();
    let cancel = cancel_on_ctrl_c();
    let progress = BarProgress::new(quiet);

    let result = tokio::task::spawn_blocking(move || {
        let result = LabelRun::new(&run_settings, backends)
            .with_cancel(cancel)
            .excluding(excluded)
            .run(&progress);
        progress.finish();
        result
    })
    .await
    .map_err(worker_failed)?;

    if let Some(media) = media {
        media.shutdown();
    }

    Ok(result?)
}

/// Transfer files on a blocking worker
async fn sort_files(
    settings: &LabelerSetting,
    mut files: Vec<LabelFile>,
    journal: Option<History>,
    quiet: bool,
) -> Result<Vec<LabelFile>> {
    let settings = settings.clone();
    let cancel = cancel_on_ctrl_c();
    let progress = BarProgress::new(quiet);

    let result = tokio::task::spawn_blocking(move || {
        let mut executor = SortExecutor::new(&settings).with_cancel(cancel);
        if let Some(journal) = &journal {
            executor = executor.with_journal(journal);
        }
        let errors = executor.execute(&mut files, &progress);
        progress.finish();
        errors.into_result().map(|()| files)
    })
    .await
    .map_err(worker_failed)?;

    Ok(result?)
}

fn run_scan(mut settings: LabelerSetting, args: &SettingsArgs, excluded: &[PathBuf], format: &str) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;

    let files = scanner::scan_excluding(&settings, excluded)?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&files)?),
        _ => {
            for file in &files {
                println!("{:>5}  {:<11} {}", file.id(), file.file_type().to_string(), file.original_path().display());
            }
            println!("\nFound {} files", files.len());
        }
    }
    Ok(())
}

async fn run_plan(
    mut settings: LabelerSetting,
    args: &SettingsArgs,
    output: &Path,
    excluded: Vec<PathBuf>,
    format: &str,
    quiet: bool,
) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;

    let files = label_files(&settings, excluded, quiet).await?;
    print_files(&files, &settings, format)?;

    let plan = Plan::new(settings, files);
    plan.save(output)?;
    info!("Saved plan for {} files to {:?}", plan.files.len(), output);

    let unlabelled = plan.unlabelled().count();
    if unlabelled > 0 {
        info!("{} files still need a label", unlabelled);
    }
    Ok(())
}

fn run_show(plan_path: &Path, format: &str) -> Result<()> {
    let plan = Plan::load(plan_path)?;
    print_files(&plan.files, &plan.settings, format)
}

fn run_label(
    plan_path: &Path,
    id: usize,
    add: Vec<String>,
    remove: Vec<String>,
    clear: bool,
    target: Option<PathBuf>,
) -> Result<()> {
    let mut plan = Plan::load(plan_path)?;
    let settings = plan.settings.clone();
    let file = plan.file_mut(id)?;

    if clear {
        file.clear_labels();
    }
    for name in remove {
        if !file.remove_label(&Label::new(name.as_str())) {
            warn!("File {} has no label '{}'", id, name);
        }
    }
    for name in add {
        file.add_label(Label::new(name), &settings);
    }

    if let Some(target) = target {
        file.set_final_target_path(target);
    } else if !file.labels().is_empty() {
        if let Err(e) = resolver::resolve(file, &settings) {
            warn!("Cannot resolve target for file {}: {}", id, e);
        }
    }

    println!("{}", describe(file, &settings));
    plan.save(plan_path)
}

async fn run_sort(plan_path: &Path, journal: Option<History>, quiet: bool) -> Result<()> {
    let plan = Plan::load(plan_path)?;
    plan.settings.validate()?;

    let unlabelled = plan.unlabelled().count();
    if unlabelled > 0 {
        warn!("{} files have no label and will fail", unlabelled);
    }

    let files = sort_files(&plan.settings, plan.files, journal, quiet).await?;
    println!("Sorted {} files", files.len());
    Ok(())
}

async fn run_all(
    mut settings: LabelerSetting,
    args: &SettingsArgs,
    yes: bool,
    journal: Option<History>,
    excluded: Vec<PathBuf>,
    format: &str,
    quiet: bool,
) -> Result<()> {
    args.apply(&mut settings);
    settings.validate()?;

    if settings.automation == Automation::Manual {
        return Err(LabelError::Config(
            "run needs an automation; use plan and label to label by hand".to_string(),
        ));
    }

    let files = label_files(&settings, excluded, quiet).await?;
    print_files(&files, &settings, format)?;

    if !yes {
        warn!("DRY RUN - pass --yes to transfer these files");
        return Ok(());
    }

    let files = sort_files(&settings, files, journal, quiet).await?;
    println!("Sorted {} files", files.len());
    Ok(())
}

/// One-line summary of a file and where it goes
fn describe(file: &LabelFile, settings: &LabelerSetting) -> String {
    let labels: Vec<&str> = file.labels().iter().map(|l| l.name()).collect();
    let target = file
        .final_target_path()
        .map(Path::to_path_buf)
        .or_else(|| resolver::target_path(file, settings).ok())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:>5}  [{}] {} -> {}",
        file.id(),
        labels.join(", "),
        file.original_path().display(),
        target
    )
}

fn print_files(files: &[LabelFile], settings: &LabelerSetting, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(files)?),
        _ => {
            for file in files {
                println!("{}", describe(file, settings));
            }
        }
    }
    Ok(())
}

/// Run history commands
fn run_history_command(history: &History, action: HistoryCommands, format: &str) -> Result<()> {
    match action {
        HistoryCommands::List { count } => {
            let entries = history.get_recent(count)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            println!("Recent history ({} entries):", entries.len());
            for entry in entries {
                let status = if entry.undone { "[UNDONE]" } else { "" };
                println!("  {} {:?} {} -> {} {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.operation,
                    entry.source.display(),
                    entry.destination.display(),
                    status
                );
            }
        }
        HistoryCommands::Undo { count, dry_run } => {
            let undone = history.undo_recent(count, dry_run)?;
            if undone.is_empty() {
                println!("No transfers to undo");
                return Ok(());
            }
            let verb = if dry_run { "Would undo" } else { "Undone" };
            for entry in undone {
                println!("{}: {} -> {}", verb, entry.destination.display(), entry.source.display());
            }
        }
        HistoryCommands::Clear { force } => {
            if !force {
                eprintln!("Use --force to confirm clearing history");
                return Ok(());
            }
            history.clear()?;
            println!("History cleared");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(settings: LabelerSetting, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            LabelerSetting::default().save(&output)?;
            println!("Generated settings at {:?}", output);
        }
        ConfigCommands::Validate => {
            settings.validate()?;
            println!("Settings at {:?} are valid", config_path);
            println!("  Input folder: {}", settings.input_folder.display());
            println!("  Output folder: {}", settings.output_folder().display());
            println!("  Operation: {:?}, by {:?}", settings.operation, settings.label_files_by);
            println!("  Automation: {:?}", settings.automation);
            if settings.automation == Automation::ByDuration {
                println!("  Duration: {}", format_duration(settings.automation_duration));
            }
        }
    }

    Ok(())
}
