//! Command-line interface: batch runs, previews, offsets and settings

use crate::batch::{
    BatchConfig, BatchControl, BatchObserver, BatchRunner, BatchStatistics, ProcessingResult,
    ProcessingTask, plan_tasks,
};
use crate::io::checkpoint::{CheckpointManager, settings_hash};
use crate::io::configuration::PREVIEW_MAX_SIZE;
use crate::io::error::{AnnotateError, Result, invalid_parameter};
use crate::io::image::{OutputFormat, discover_images, save_output};
use crate::io::progress::ProgressManager;
use crate::io::settings::Settings;
use crate::io::spreadsheet::{RowData, SheetIndex};
use crate::layout::PanelPosition;
use crate::render::Compositor;
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "panelstamp")]
#[command(
    author,
    version,
    about = "Annotate screenshots with spreadsheet data, fixed text and a stamp"
)]
/// Command-line arguments
pub struct Cli {
    /// Settings file to use instead of the per-user default
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Only report warnings and errors; hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate every image in the source folder
    Run(RunArgs),
    /// Render a reduced preview of one image and print element positions
    Preview(PreviewArgs),
    /// Adjust per-element offsets
    Offset {
        /// Offset operation
        #[command(subcommand)]
        action: OffsetAction,
    },
    /// Inspect or reset the settings file
    Settings {
        /// Settings operation
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Options for a batch run; each one overrides the settings file for this run only
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Folder containing the screenshots
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Folder receiving annotated images
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Spreadsheet with one row per position
    #[arg(short = 'x', long, value_name = "FILE")]
    pub spreadsheet: Option<PathBuf>,

    /// Stamp image placed below the text
    #[arg(long, value_name = "FILE")]
    pub stamp: Option<PathBuf>,

    /// Output format: png, jpg or pdf
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Panel position: left or bottom
    #[arg(short, long, value_parser = parse_position)]
    pub position: Option<PanelPosition>,

    /// Worker threads; 0 picks a count from the available cores
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Ignore any checkpoint and process every image
    #[arg(long)]
    pub fresh: bool,

    /// Read p (pause), r (resume) and c (cancel) commands from stdin
    #[arg(short, long)]
    pub interactive: bool,
}

impl RunArgs {
    /// Apply the command-line overrides to `settings`
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(source) = &self.source {
            settings.paths.source_folder = Some(source.clone());
        }
        if let Some(output) = &self.output {
            settings.paths.output_folder = Some(output.clone());
        }
        if let Some(spreadsheet) = &self.spreadsheet {
            settings.paths.spreadsheet = Some(spreadsheet.clone());
        }
        if let Some(stamp) = &self.stamp {
            settings.paths.stamp_file = Some(stamp.clone());
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if let Some(position) = self.position {
            settings.output.position = position;
        }
        if let Some(threads) = self.threads {
            settings.performance.thread_count = threads;
        }
    }
}

/// Options for a preview
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Screenshot to preview
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Where to write the preview PNG; defaults to `<stem>_preview.png` beside the image
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Preview width limit in pixels
    #[arg(long, default_value_t = PREVIEW_MAX_SIZE.0)]
    pub max_width: u32,

    /// Preview height limit in pixels
    #[arg(long, default_value_t = PREVIEW_MAX_SIZE.1)]
    pub max_height: u32,

    /// Spreadsheet to read the image's row from
    #[arg(short = 'x', long, value_name = "FILE")]
    pub spreadsheet: Option<PathBuf>,
}

/// Offset operations
#[derive(Subcommand, Debug)]
pub enum OffsetAction {
    /// Move one element by `(dx, dy)` pixels on every image
    Set {
        /// Element name: a field key, `divider`, `text_N` or `stamp`
        element: String,
        /// Horizontal displacement
        #[arg(allow_hyphen_values = true)]
        dx: i32,
        /// Vertical displacement
        #[arg(allow_hyphen_values = true)]
        dy: i32,
    },
    /// Remove every offset
    Reset,
}

/// Settings file operations
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the effective settings as JSON
    Show,
    /// Overwrite the settings file with defaults
    Reset,
    /// Print the settings file location
    Path,
}

fn parse_format(value: &str) -> std::result::Result<OutputFormat, String> {
    value.parse::<OutputFormat>().map_err(|e| e.to_string())
}

fn parse_position(value: &str) -> std::result::Result<PanelPosition, String> {
    match value.to_ascii_lowercase().as_str() {
        "left" => Ok(PanelPosition::Left),
        "bottom" => Ok(PanelPosition::Bottom),
        other => Err(format!("unknown panel position '{other}', expected left or bottom")),
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// A line typed on stdin during an interactive run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Hold workers before their next task
    Pause,
    /// Release held workers
    Resume,
    /// Stop starting tasks
    Cancel,
}

impl ControlCommand {
    /// Parse `p`, `r` or `c` (or the full words), ignoring case and whitespace
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    /// Forward the command to `control`
    pub fn apply(self, control: &BatchControl) {
        match self {
            Self::Pause => control.pause(),
            Self::Resume => control.resume(),
            Self::Cancel => control.cancel(),
        }
    }
}

fn spawn_command_listener(control: BatchControl) -> Result<()> {
    std::thread::Builder::new()
        .name("panelstamp-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let Some(command) = ControlCommand::parse(&line) else {
                    warn!(input = line.trim(), "Unknown command, use p, r or c");
                    continue;
                };
                info!(?command, "Control command");
                command.apply(&control);
                if command == ControlCommand::Cancel {
                    break;
                }
            }
        })
        .map(drop)
        .map_err(|e| AnnotateError::ThreadPool {
            reason: e.to_string(),
        })
}

/// Batch observer that keeps the checkpoint in step and drives the progress display
pub struct RunObserver {
    checkpoint: CheckpointManager,
    progress: Option<ProgressManager>,
}

impl RunObserver {
    /// Observer writing to `checkpoint` and, when given, showing `progress`
    pub const fn new(checkpoint: CheckpointManager, progress: Option<ProgressManager>) -> Self {
        Self {
            checkpoint,
            progress,
        }
    }

    /// Checkpoint state after the events seen so far
    pub const fn checkpoint(&self) -> &CheckpointManager {
        &self.checkpoint
    }
}

impl BatchObserver for RunObserver {
    fn on_started(&mut self, total: usize) {
        if let Some(progress) = &mut self.progress {
            progress.on_started(total);
        }
    }

    fn on_file_processed(&mut self, result: &ProcessingResult) {
        if result.success {
            self.checkpoint.mark_processed(&result.file_name);
        } else {
            self.checkpoint
                .mark_failed(&result.file_name, &result.message);
        }
        if let Some(progress) = &mut self.progress {
            progress.on_file_processed(result);
        }
    }

    fn on_statistics(&mut self, statistics: &BatchStatistics) {
        debug!(
            processed = statistics.processed,
            total = statistics.total,
            speed = statistics.speed,
            remaining = statistics.remaining,
            "Progress"
        );
        if let Some(progress) = &mut self.progress {
            progress.on_statistics(statistics);
        }
    }

    fn on_checkpoint(&mut self) {
        if let Err(error) = self.checkpoint.save_progress() {
            warn!(%error, "Could not save checkpoint");
        }
    }

    fn on_finished(&mut self, statistics: &BatchStatistics, cancelled: bool) {
        if let Some(progress) = &mut self.progress {
            progress.on_finished(statistics, cancelled);
        }

        let outcome = if cancelled {
            self.checkpoint.save_progress()
        } else {
            self.checkpoint.clear()
        };
        if let Err(error) = outcome {
            warn!(%error, "Could not update checkpoint");
        } else if cancelled {
            info!(
                path = %self.checkpoint.path().display(),
                "Progress saved, rerun to resume"
            );
        }
    }
}

/// Keep only the tasks still pending in a checkpoint that matches `hash`,
/// or start a new session covering every task
///
/// Images missing from a matching checkpoint are added to it and processed.
///
/// # Errors
///
/// Returns an error if the session cannot be written
pub fn resume_or_start(
    checkpoint: &mut CheckpointManager,
    tasks: Vec<ProcessingTask>,
    hash: String,
    fresh: bool,
) -> Result<Vec<ProcessingTask>> {
    if !fresh {
        let stored_hash = checkpoint.load_session().map_or_else(
            |error| {
                warn!(%error, "Ignoring unreadable checkpoint");
                None
            },
            |session| session.map(|session| session.settings_hash.clone()),
        );

        match stored_hash {
            Some(stored) if stored == hash => {
                let files: Vec<String> = tasks.iter().map(ProcessingTask::file_name).collect();
                let added = checkpoint.add_files(&files)?;
                if added > 0 {
                    info!(added, "New images since the checkpoint was written");
                }
                let pending: HashSet<String> = checkpoint.pending_files().into_iter().collect();
                let stats = checkpoint.statistics();
                info!(
                    processed = stats.processed,
                    failed = stats.failed,
                    pending = stats.pending,
                    "Resuming from checkpoint"
                );
                return Ok(tasks
                    .into_iter()
                    .filter(|task| pending.contains(&task.file_name()))
                    .collect());
            }
            Some(_) => info!("Settings changed since the checkpoint, starting over"),
            None => {}
        }
    }

    let files = tasks.iter().map(ProcessingTask::file_name).collect();
    checkpoint.create_session(files, hash)?;
    Ok(tasks)
}

fn required_path<'a>(
    value: Option<&'a PathBuf>,
    parameter: &'static str,
    flag: &str,
) -> Result<&'a Path> {
    value.map(PathBuf::as_path).ok_or_else(|| {
        invalid_parameter(
            parameter,
            &"<unset>",
            &format!("set it in the settings file or pass {flag}"),
        )
    })
}

/// Dispatches parsed command-line arguments
pub struct FileProcessor {
    cli: Cli,
}

impl FileProcessor {
    /// Create a processor for the given arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Settings file in effect for this invocation
    pub fn settings_path(&self) -> PathBuf {
        self.cli.settings.clone().unwrap_or_else(Settings::default_path)
    }

    fn load_settings(&self) -> Settings {
        Settings::load_or_default(&self.settings_path())
    }

    /// Execute the requested command
    ///
    /// # Errors
    ///
    /// Returns an error if validation, settings I/O or processing fails
    pub fn process(&self) -> Result<()> {
        match &self.cli.command {
            Command::Run(args) => self.run_batch(args).map(|_| ()),
            Command::Preview(args) => self.preview(args),
            Command::Offset { action } => self.offset(action),
            Command::Settings { action } => self.settings(action),
        }
    }

    /// Validate inputs, then annotate every pending image
    ///
    /// Returns `None` when nothing was left to process.
    ///
    /// # Errors
    ///
    /// Returns an error if an input is missing or the batch cannot start
    pub fn run_batch(&self, args: &RunArgs) -> Result<Option<BatchStatistics>> {
        let mut settings = self.load_settings();
        args.apply_to(&mut settings);

        let source = required_path(settings.paths.source_folder.as_ref(), "source_folder", "--source")?;
        if !source.is_dir() {
            return Err(invalid_parameter(
                "source_folder",
                &source.display(),
                &"folder does not exist",
            ));
        }
        let spreadsheet =
            required_path(settings.paths.spreadsheet.as_ref(), "spreadsheet", "--spreadsheet")?;
        if !spreadsheet.is_file() {
            return Err(invalid_parameter(
                "spreadsheet",
                &spreadsheet.display(),
                &"file does not exist",
            ));
        }
        let output = required_path(settings.paths.output_folder.as_ref(), "output_folder", "--output")?;

        let images = discover_images(source)?;
        if images.is_empty() {
            return Err(invalid_parameter(
                "source_folder",
                &source.display(),
                &"no png or jpg images found",
            ));
        }

        let index = SheetIndex::open(spreadsheet, &settings.column_mapping())?;
        let plan = plan_tasks(
            &images,
            &index,
            output,
            settings.output.format,
            &settings.enabled_fixed_texts(),
        );
        info!(
            images = images.len(),
            matched = plan.tasks.len(),
            skipped = plan.skipped.len(),
            "Planned batch"
        );

        let compositor = build_compositor(&settings)?;
        let mut checkpoint = CheckpointManager::new(output);
        let tasks = resume_or_start(
            &mut checkpoint,
            plan.tasks,
            settings_hash(&settings.fingerprint())?,
            args.fresh,
        )?;
        if tasks.is_empty() {
            info!("Nothing left to process");
            checkpoint.clear()?;
            return Ok(None);
        }

        let control = BatchControl::new();
        if args.interactive {
            spawn_command_listener(control.clone())?;
            info!("Type p to pause, r to resume, c to cancel");
        }

        let runner = BatchRunner::new(BatchConfig::from(&settings.performance), control);
        let progress = (!self.cli.quiet).then(ProgressManager::new);
        let mut observer = RunObserver::new(checkpoint, progress);
        let statistics = runner.run(&tasks, plan.skipped.len(), &compositor, &mut observer)?;

        info!(
            success = statistics.success,
            failed = statistics.failed,
            skipped = statistics.skipped,
            elapsed = statistics.elapsed,
            "Run complete"
        );
        Ok(Some(statistics))
    }

    // Allow print: the element report is the command's output
    #[allow(clippy::print_stdout)]
    fn preview(&self, args: &PreviewArgs) -> Result<()> {
        let mut settings = self.load_settings();
        if let Some(spreadsheet) = &args.spreadsheet {
            settings.paths.spreadsheet = Some(spreadsheet.clone());
        }
        let compositor = build_compositor(&settings)?;

        let row = preview_row(&settings, &args.image)?;
        let content = compositor.content_for(&row, &settings.enabled_fixed_texts());
        let preview = compositor.preview(&args.image, &content, (args.max_width, args.max_height))?;

        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| preview_path_for(&args.image));
        save_output(
            &preview.image,
            &output_path,
            OutputFormat::Png,
            compositor.background(),
        )?;
        info!(path = %output_path.display(), "Preview written");

        let report = serde_json::to_string_pretty(&preview.layout)?;
        println!("{report}");
        Ok(())
    }

    fn offset(&self, action: &OffsetAction) -> Result<()> {
        let path = self.settings_path();
        let mut settings = Settings::load_or_default(&path);
        match action {
            OffsetAction::Set { element, dx, dy } => {
                settings.set_offset(element, *dx, *dy);
                info!(element = element.as_str(), dx, dy, "Offset set");
            }
            OffsetAction::Reset => {
                settings.reset_offsets();
                info!("Offsets reset");
            }
        }
        settings.save(&path)
    }

    // Allow print: these commands report to stdout
    #[allow(clippy::print_stdout)]
    fn settings(&self, action: &SettingsAction) -> Result<()> {
        let path = self.settings_path();
        match action {
            SettingsAction::Show => {
                let settings = Settings::load_or_default(&path);
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Reset => {
                let mut settings = Settings::load_or_default(&path);
                settings.reset();
                settings.save(&path)?;
                info!(path = %path.display(), "Settings reset");
            }
            SettingsAction::Path => println!("{}", path.display()),
        }
        Ok(())
    }
}

fn build_compositor(settings: &Settings) -> Result<Compositor> {
    let mut compositor = Compositor::new(settings)?;
    if settings.stamp.enabled
        && let Some(stamp) = &settings.paths.stamp_file
    {
        compositor.load_stamp(stamp)?;
    }
    Ok(compositor)
}

// Missing spreadsheet or row falls back to fixed texts only
fn preview_row(settings: &Settings, image: &Path) -> Result<RowData> {
    let Some(spreadsheet) = settings.paths.spreadsheet.as_deref() else {
        warn!("No spreadsheet configured, previewing fixed texts only");
        return Ok(RowData::new());
    };
    let index = SheetIndex::open(spreadsheet, &settings.column_mapping())?;
    Ok(index.lookup_for_file(image).cloned().unwrap_or_else(|| {
        warn!(file = %image.display(), "No spreadsheet row for image");
        RowData::new()
    }))
}

/// Default preview location: `<stem>_preview.png` next to the image
pub fn preview_path_for(image: &Path) -> PathBuf {
    let stem = image.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{stem}_preview.png");
    image
        .parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}
