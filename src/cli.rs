//! Command-line interface module for sortbox.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Choosing the folder to organize (argument, environment, picker, Downloads)
//! - Loading configuration
//! - Driving the organizer with console progress output

use crate::config::{Config, ConfigError};
use crate::file_organizer::{
    OrganizeError, OrganizeOptions, OrganizeReport, Organizer, ProgressEvent, TargetState,
};
use crate::output::OutputFormatter;
use crate::picker::{self, PickerError};
use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable that supplies a default folder.
pub const PATH_ENV_VAR: &str = "DOWNLOADS_PATH";

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const TARGET_ERROR: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
    pub const NO_TARGET: u8 = 3;
}

/// Organize files in a folder into category subfolders.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "sortbox",
    version,
    about = "Organize files in a folder into categories",
    long_about = "Moves every file directly inside a folder into a subfolder named after its \
                  extension category (Images, Documents, Videos, Music, Archives, Installers, \
                  Scripts or Others). Subfolders are left untouched.\n\n\
                  Without --path, a native folder picker asks which folder to organize; \
                  progress and the summary are printed to this console rather than a \
                  separate window. Use --no-gui to fall back to the Downloads folder."
)]
pub struct Args {
    /// Path to folder to organize.
    #[arg(short, long, env = PATH_ENV_VAR)]
    pub path: Option<PathBuf>,

    /// Create the path if it doesn't exist.
    #[arg(long)]
    pub create: bool,

    /// Don't show folder picker GUI when no --path is provided.
    #[arg(long)]
    pub no_gui: bool,

    /// Show what would be moved without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Run options derived from the flags.
    pub fn options(&self) -> OrganizeOptions {
        OrganizeOptions {
            create_missing: self.create,
            dry_run: self.dry_run,
        }
    }
}

/// Errors surfaced by the command-line front end.
#[derive(Debug)]
pub enum CliError {
    /// The configuration file could not be loaded or compiled.
    Config(ConfigError),
    /// The run was aborted at directory level.
    Organize(OrganizeError),
    /// The folder picker could not be shown.
    Picker(PickerError),
    /// No folder was given and none could be derived.
    NoTarget,
}

impl CliError {
    /// Maps the error to the process exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => exit_codes::CONFIG_ERROR,
            Self::Organize(_) => exit_codes::TARGET_ERROR,
            Self::Picker(_) | Self::NoTarget => exit_codes::NO_TARGET,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Error loading configuration: {}", e),
            Self::Organize(OrganizeError::TargetNotFound { path }) => write!(
                f,
                "Error: path {} does not exist. Use --create to create it or pass a valid --path.",
                path.display()
            ),
            Self::Organize(e) => write!(f, "Error: {}", e),
            Self::Picker(e) => write!(
                f,
                "Could not open folder picker GUI: {}. Run with --path <folder> or --no-gui to avoid GUI.",
                e
            ),
            Self::NoTarget => write!(
                f,
                "No folder to organize: pass --path <folder> or set {}",
                PATH_ENV_VAR
            ),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<OrganizeError> for CliError {
    fn from(e: OrganizeError) -> Self {
        Self::Organize(e)
    }
}

/// Where the folder to organize comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    /// A folder was determined.
    Folder(PathBuf),
    /// The user closed the picker without choosing.
    Cancelled,
}

/// Determines the folder to organize.
///
/// Order: `--path` (or `DOWNLOADS_PATH`), then the folder picker unless
/// `--no-gui`, then the user's Downloads directory.
pub fn resolve_target(args: &Args) -> Result<TargetChoice, CliError> {
    if let Some(path) = &args.path {
        return Ok(TargetChoice::Folder(path.clone()));
    }

    if !args.no_gui {
        return match picker::pick_folder().map_err(CliError::Picker)? {
            Some(path) => Ok(TargetChoice::Folder(path)),
            None => Ok(TargetChoice::Cancelled),
        };
    }

    default_downloads_dir()
        .map(TargetChoice::Folder)
        .ok_or(CliError::NoTarget)
}

/// The current user's Downloads directory, if the platform knows one.
pub fn default_downloads_dir() -> Option<PathBuf> {
    directories::UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
}

/// Runs the CLI application with parsed arguments.
///
/// This is the main entry point for CLI operations.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortbox::cli::{run_cli, Args};
///
/// let args = Args::parse_from(["sortbox", "--path", "/home/me/Downloads", "--dry-run"]);
/// if let Err(e) = run_cli(&args) {
///     eprintln!("{}", e);
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<(), CliError> {
    let target = match resolve_target(args)? {
        TargetChoice::Folder(path) => path,
        TargetChoice::Cancelled => {
            OutputFormatter::info("No folder selected. Exiting.");
            return Ok(());
        }
    };

    run_cli_with_config(&target, args.options(), args.config.as_deref()).map(|_| ())
}

/// Organizes `target` with console output and an optional configuration file.
///
/// This function:
/// 1. Loads configuration (category table and filters)
/// 2. Creates the folder if missing and allowed
/// 3. Plans the moves and sizes a progress bar
/// 4. Moves each file, printing one line per file
/// 5. Prints a summary table
///
/// # Arguments
///
/// * `target` - The directory to organize
/// * `options` - Creation and dry-run switches
/// * `config_path` - Optional path to configuration file
pub fn run_cli_with_config(
    target: &Path,
    options: OrganizeOptions,
    config_path: Option<&Path>,
) -> Result<OrganizeReport, CliError> {
    let config = Config::load(config_path)?;
    let organizer = Organizer::new(config.category_table()?)
        .with_filters(config.compile_filters()?)
        .with_options(options);

    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", target.display()));
    } else {
        OutputFormatter::info(&format!("Organizing files in: {}", target.display()));
    }
    info!(folder = %target.display(), dry_run = options.dry_run, "starting run");

    let mut print_event = |event: &ProgressEvent<'_>| {
        if let Some(line) = console_line(event) {
            println!("{}", line);
        }
    };
    let state = organizer.prepare_target(target, Some(&mut print_event))?;

    let plan = match state {
        TargetState::Existing => organizer.plan(target)?,
        TargetState::Created | TargetState::WouldCreate => Vec::new(),
    };
    debug!(files = plan.len(), "files to organize");

    if plan.is_empty() && state == TargetState::Existing {
        print_event(&ProgressEvent::NothingToDo { path: target });
    }

    let pb = OutputFormatter::create_progress_bar(plan.len() as u64);
    let mut report = {
        let mut on_progress = |event: &ProgressEvent<'_>| {
            pb.println(OutputFormatter::event_line(event));
            pb.inc(1);
        };
        organizer.execute(target, &plan, Some(&mut on_progress))
    };
    pb.finish_and_clear();
    report.created_target = state == TargetState::Created;

    print_summary(&report, &organizer);
    Ok(report)
}

/// Console rendering of a setup event.
///
/// A missing target is left to the returned `CliError`, which carries the
/// `--create` hint, so it is printed only once.
fn console_line(event: &ProgressEvent<'_>) -> Option<String> {
    match event {
        ProgressEvent::TargetNotFound { .. } => None,
        _ => Some(OutputFormatter::event_line(event)),
    }
}

fn print_summary(report: &OrganizeReport, organizer: &Organizer) {
    if !report.moved.is_empty() {
        let rows = report.summary_rows(organizer.table());
        OutputFormatter::summary_table(&rows, report.moved.len());
    }

    if !report.failed.is_empty() {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be organized. Please review errors above.",
            report.failed.len()
        ));
    }

    if report.dry_run {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    } else {
        OutputFormatter::success("Done organizing!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "sortbox",
            "--path",
            "/tmp/inbox",
            "--create",
            "--no-gui",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.path, Some(PathBuf::from("/tmp/inbox")));
        assert_eq!(
            args.options(),
            OrganizeOptions {
                create_missing: true,
                dry_run: true,
            }
        );
        assert!(args.no_gui);
    }

    #[test]
    fn test_short_path_flag() {
        let args = Args::try_parse_from(["sortbox", "-p", "inbox"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("inbox")));
        assert!(!args.create);
    }

    #[test]
    fn test_explicit_path_wins() {
        let args = Args {
            path: Some(PathBuf::from("/some/where")),
            ..Args::default()
        };

        assert_eq!(
            resolve_target(&args).unwrap(),
            TargetChoice::Folder(PathBuf::from("/some/where"))
        );
    }

    #[test]
    fn test_exit_codes() {
        let missing = CliError::Organize(OrganizeError::TargetNotFound {
            path: PathBuf::from("x"),
        });
        assert_eq!(missing.exit_code(), exit_codes::TARGET_ERROR);
        assert!(missing.to_string().contains("--create"));

        let config = CliError::Config(ConfigError::ConfigInvalid("bad".to_string()));
        assert_eq!(config.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(CliError::NoTarget.exit_code(), exit_codes::NO_TARGET);
        assert_eq!(
            CliError::Picker(PickerError::NotCompiled).exit_code(),
            exit_codes::NO_TARGET
        );
    }

    #[test]
    fn test_path_reads_downloads_env_var() {
        let command = Args::command();
        let path_arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "path")
            .unwrap();

        assert_eq!(path_arg.get_env(), Some(OsStr::new(PATH_ENV_VAR)));
        assert_eq!(PATH_ENV_VAR, "DOWNLOADS_PATH");
    }

    #[test]
    fn test_no_gui_uses_downloads_or_reports_no_target() {
        let args = Args {
            no_gui: true,
            ..Args::default()
        };

        match resolve_target(&args) {
            Ok(TargetChoice::Folder(path)) => {
                assert_eq!(Some(path), default_downloads_dir());
            }
            Err(CliError::NoTarget) => assert!(default_downloads_dir().is_none()),
            other => panic!("unexpected target choice: {:?}", other),
        }
    }

    #[test]
    fn test_help_describes_picker_and_console_output() {
        let command = Args::command();
        let long_about = command.get_long_about().unwrap().to_string();

        assert!(long_about.contains("folder picker"));
        assert!(long_about.contains("console"));
    }

    #[test]
    fn test_missing_target_not_printed_twice() {
        let missing = ProgressEvent::TargetNotFound {
            path: Path::new("gone"),
        };
        let created = ProgressEvent::TargetCreated {
            path: Path::new("new"),
        };

        assert_eq!(console_line(&missing), None);
        assert!(console_line(&created).unwrap().contains("new"));

        let err = CliError::Organize(OrganizeError::TargetNotFound {
            path: PathBuf::from("gone"),
        });
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_run_cli_with_config_moves_files() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("song.wav"), "").unwrap();
        fs::write(base.join("tool.bat"), "").unwrap();
        let config_path = config_dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        let report =
            run_cli_with_config(base, OrganizeOptions::default(), Some(&config_path)).unwrap();

        assert_eq!(report.moved.len(), 2);
        assert!(base.join("Music/song.wav").exists());
        assert!(base.join("Scripts/tool.bat").exists());
    }

    #[test]
    fn test_run_cli_with_missing_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        let result = run_cli_with_config(
            temp_dir.path(),
            OrganizeOptions::default(),
            Some(&missing),
        );

        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::ConfigNotFound(_)))
        ));
    }
}
