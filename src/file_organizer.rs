/// File organization system for moving files into category directories.
///
/// This module scans the direct children of a target directory, classifies
/// every regular file by extension and moves it into a category subdirectory.
/// A failure to move one file is reported and never stops the remaining files.
use crate::config::CompiledFilters;
use crate::file_category::CategoryTable;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Represents a single completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// The category the file was moved to.
    pub category: String,
}

/// A file that was classified but not yet moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// The file as found in the target directory.
    pub source: PathBuf,
    /// Name of the destination category directory.
    pub category: String,
}

impl PlannedMove {
    /// The file name shown in progress lines.
    pub fn file_name(&self) -> String {
        display_name(&self.source)
    }
}

/// A file that could not be moved, with the reason.
#[derive(Debug)]
pub struct FailedMove {
    pub path: PathBuf,
    pub category: String,
    pub error: OrganizeError,
}

/// One notable event of a run, rendered as a single human-readable line.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// The target directory was missing and has been created.
    TargetCreated { path: &'a Path },
    /// The target directory does not exist and creation was not requested.
    TargetNotFound { path: &'a Path },
    /// A file was moved into its category directory.
    Moved { file_name: &'a str, category: &'a str },
    /// A file could not be moved and was left in place.
    Failed {
        file_name: &'a str,
        error: &'a OrganizeError,
    },
    /// Dry run: the target directory would be created.
    WouldCreate { path: &'a Path },
    /// Dry run: a file would be moved.
    WouldMove { file_name: &'a str, category: &'a str },
    /// There were no files to organize.
    NothingToDo { path: &'a Path },
}

impl fmt::Display for ProgressEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetCreated { path } => write!(f, "Created: {}", path.display()),
            Self::TargetNotFound { path } => {
                write!(f, "Path not found: {}. Nothing to do.", path.display())
            }
            Self::Moved {
                file_name,
                category,
            } => write!(f, "Moved: {} → {}/", file_name, category),
            Self::Failed { file_name, error } => write!(f, "Failed: {}: {}", file_name, error),
            Self::WouldCreate { path } => write!(f, "Would create: {}", path.display()),
            Self::WouldMove {
                file_name,
                category,
            } => write!(f, "Would move: {} → {}/", file_name, category),
            Self::NothingToDo { path } => {
                write!(f, "No files to organize in {}", path.display())
            }
        }
    }
}

/// Line-oriented progress callback. Every event formats to one line.
pub type ProgressSink<'s> = &'s mut dyn for<'e> FnMut(&ProgressEvent<'e>);

/// Errors that can occur during file organization operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target directory does not exist and creation was not requested.
    TargetNotFound { path: PathBuf },
    /// The target directory was missing and could not be created.
    TargetCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// The target path exists but cannot be listed as a directory.
    InvalidTarget {
        path: PathBuf,
        source: io::Error,
    },
    /// Failed to create a category directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// A file with the same name already exists in the category directory.
    DestinationExists { destination: PathBuf },
}

impl OrganizeError {
    /// Returns true for errors that abort a whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound { .. }
                | Self::TargetCreationFailed { .. }
                | Self::InvalidTarget { .. }
        )
    }
}

impl fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { path } => {
                write!(f, "Path {} does not exist", path.display())
            }
            Self::TargetCreationFailed { path, source } => {
                write!(f, "Failed to create path {}: {}", path.display(), source)
            }
            Self::InvalidTarget { path, source } => {
                write!(f, "Cannot read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DestinationExists { destination } => {
                write!(f, "{} already exists", destination.display())
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TargetCreationFailed { source, .. }
            | Self::InvalidTarget { source, .. }
            | Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::TargetNotFound { .. } | Self::DestinationExists { .. } => None,
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Switches controlling a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Create the target directory (and its parents) when it is missing.
    pub create_missing: bool,
    /// Classify and report without creating or moving anything.
    pub dry_run: bool,
}

/// State of the target directory after [`Organizer::prepare_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// The directory already existed.
    Existing,
    /// The directory was just created, so it is empty.
    Created,
    /// Dry run over a missing directory that would be created.
    WouldCreate,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Moves performed (or planned, for a dry run), in processing order.
    pub moved: Vec<Operation>,
    /// Files left in place because their move failed.
    pub failed: Vec<FailedMove>,
    /// Whether the target directory was created by this run.
    pub created_target: bool,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl OrganizeReport {
    /// Number of files moved per category.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in &self.moved {
            *counts.entry(op.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Per-category counts in the order of `table`, skipping empty categories.
    pub fn summary_rows(&self, table: &CategoryTable) -> Vec<(String, usize)> {
        let counts = self.category_counts();
        table
            .names()
            .filter_map(|name| counts.get(name).map(|count| (name.to_string(), *count)))
            .collect()
    }

    /// Returns true if every file was moved.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Organizes the direct children of a directory into category subdirectories.
///
/// The organizer owns its category table, filters and options; nothing is
/// read from process-wide state.
#[derive(Debug, Default)]
pub struct Organizer {
    table: CategoryTable,
    filters: CompiledFilters,
    options: OrganizeOptions,
}

impl Organizer {
    /// Creates an organizer with the given table and no filters.
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Replaces the file filters.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the run options.
    pub fn with_options(mut self, options: OrganizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Organizes `target` in one pass: prepare, plan, execute.
    ///
    /// Directory-level problems (missing or unreadable target) abort the run
    /// and are returned as errors. Per-file problems are reported through the
    /// sink and collected in the report.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortbox::file_organizer::Organizer;
    /// use sortbox::file_category::CategoryTable;
    /// use std::path::Path;
    ///
    /// let organizer = Organizer::new(CategoryTable::default());
    /// let mut print = |event: &sortbox::ProgressEvent<'_>| println!("{}", event);
    /// match organizer.organize(Path::new("/home/me/Downloads"), Some(&mut print)) {
    ///     Ok(report) => println!("{} files moved", report.moved.len()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn organize(
        &self,
        target: &Path,
        on_progress: Option<ProgressSink<'_>>,
    ) -> OrganizeResult<OrganizeReport> {
        let mut progress = Progress::new(on_progress);
        let state = self.prepare_target_with(target, &mut progress)?;
        let plan = match state {
            TargetState::Existing => self.plan(target)?,
            TargetState::Created | TargetState::WouldCreate => Vec::new(),
        };

        if plan.is_empty() && state == TargetState::Existing {
            progress.emit(&ProgressEvent::NothingToDo { path: target });
        }

        let mut report = self.execute_with(target, &plan, &mut progress);
        report.created_target = state == TargetState::Created;
        Ok(report)
    }

    /// Makes sure the target directory exists, creating it if allowed.
    ///
    /// # Errors
    ///
    /// `TargetNotFound` when the directory is missing and creation is off,
    /// `TargetCreationFailed` when creating it fails.
    pub fn prepare_target(
        &self,
        target: &Path,
        on_progress: Option<ProgressSink<'_>>,
    ) -> OrganizeResult<TargetState> {
        self.prepare_target_with(target, &mut Progress::new(on_progress))
    }

    fn prepare_target_with(
        &self,
        target: &Path,
        progress: &mut Progress<'_>,
    ) -> OrganizeResult<TargetState> {
        if target.exists() {
            return Ok(TargetState::Existing);
        }

        if !self.options.create_missing {
            progress.emit(&ProgressEvent::TargetNotFound { path: target });
            return Err(OrganizeError::TargetNotFound {
                path: target.to_path_buf(),
            });
        }

        if self.options.dry_run {
            progress.emit(&ProgressEvent::WouldCreate { path: target });
            return Ok(TargetState::WouldCreate);
        }

        fs::create_dir_all(target).map_err(|e| OrganizeError::TargetCreationFailed {
            path: target.to_path_buf(),
            source: e,
        })?;
        info!(path = %target.display(), "created target directory");
        progress.emit(&ProgressEvent::TargetCreated { path: target });
        Ok(TargetState::Created)
    }

    /// Lists the regular files directly inside `target` and assigns each a category.
    ///
    /// Subdirectories (and links to them) are skipped, as are files excluded
    /// by the configured filters. Entries come back in filesystem order.
    ///
    /// # Errors
    ///
    /// `InvalidTarget` if the directory cannot be listed.
    pub fn plan(&self, target: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        let entries = fs::read_dir(target).map_err(|e| OrganizeError::InvalidTarget {
            path: target.to_path_buf(),
            source: e,
        })?;

        let mut plan = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();

            // Follows symlinks: a link to a file is organized, a link to a directory is not.
            if !path.is_file() {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }

            if !self.filters.should_include(&path) {
                debug!(path = %path.display(), "skipping filtered file");
                continue;
            }

            let category = self.table.categorize(&path).to_string();
            plan.push(PlannedMove {
                source: path,
                category,
            });
        }

        debug!(count = plan.len(), "planned moves");
        Ok(plan)
    }

    /// Performs the planned moves, reporting each one.
    ///
    /// Never fails as a whole: every per-file error is caught, reported and
    /// recorded, and processing continues with the next file.
    pub fn execute(
        &self,
        target: &Path,
        plan: &[PlannedMove],
        on_progress: Option<ProgressSink<'_>>,
    ) -> OrganizeReport {
        self.execute_with(target, plan, &mut Progress::new(on_progress))
    }

    fn execute_with(
        &self,
        target: &Path,
        plan: &[PlannedMove],
        progress: &mut Progress<'_>,
    ) -> OrganizeReport {
        let mut report = OrganizeReport {
            dry_run: self.options.dry_run,
            ..OrganizeReport::default()
        };

        for planned in plan {
            let file_name = planned.file_name();
            let result = if self.options.dry_run {
                preview_move(target, &planned.source, &planned.category)
            } else {
                move_to_category(target, &planned.source, &planned.category)
            };

            match result {
                Ok(operation) => {
                    let event = if self.options.dry_run {
                        ProgressEvent::WouldMove {
                            file_name: &file_name,
                            category: &operation.category,
                        }
                    } else {
                        ProgressEvent::Moved {
                            file_name: &file_name,
                            category: &operation.category,
                        }
                    };
                    progress.emit(&event);
                    report.moved.push(operation);
                }
                Err(error) => {
                    debug!(file = %file_name, error = %error, "move failed");
                    progress.emit(&ProgressEvent::Failed {
                        file_name: &file_name,
                        error: &error,
                    });
                    report.failed.push(FailedMove {
                        path: planned.source.clone(),
                        category: planned.category.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            moved = report.moved.len(),
            failed = report.failed.len(),
            dry_run = report.dry_run,
            "organization finished"
        );
        report
    }
}

/// Optional sink wrapper shared by the steps of a run.
struct Progress<'a> {
    sink: Option<ProgressSink<'a>>,
}

impl<'a> Progress<'a> {
    fn new(sink: Option<ProgressSink<'a>>) -> Self {
        Self { sink }
    }

    fn emit(&mut self, event: &ProgressEvent<'_>) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink(event);
        }
    }
}

/// Organizes `target` with the built-in category table and no filters.
///
/// This is the plain entry point: pass `create_missing` to create a missing
/// target, and an optional sink to receive one line per event.
pub fn organize(
    target: &Path,
    create_missing: bool,
    on_progress: Option<ProgressSink<'_>>,
) -> OrganizeResult<OrganizeReport> {
    Organizer::new(CategoryTable::default())
        .with_options(OrganizeOptions {
            create_missing,
            dry_run: false,
        })
        .organize(target, on_progress)
}

/// Moves a file into its category directory within the target and records the operation.
///
/// The category directory is created if needed; one that already exists,
/// including one created concurrently, is not an error. Existing files at the
/// destination are never overwritten.
pub fn move_to_category(
    target: &Path,
    file_path: &Path,
    category: &str,
) -> OrganizeResult<Operation> {
    let category_path = target.join(category);
    let destination_path = destination_for(&category_path, file_path)?;

    match fs::create_dir(&category_path) {
        Ok(()) => debug!(path = %category_path.display(), "created category directory"),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && category_path.is_dir() => {}
        Err(e) => {
            return Err(OrganizeError::DirectoryCreationFailed {
                path: category_path,
                source: e,
            });
        }
    }

    // rename() silently replaces existing files on Unix.
    if destination_path.symlink_metadata().is_ok() {
        return Err(OrganizeError::DestinationExists {
            destination: destination_path,
        });
    }

    fs::rename(file_path, &destination_path).map_err(|e| OrganizeError::FileMoveFailure {
        source: file_path.to_path_buf(),
        destination: destination_path.clone(),
        source_error: e,
    })?;

    Ok(Operation {
        original_path: file_path.to_path_buf(),
        new_path: destination_path,
        category: category.to_string(),
    })
}

/// Computes the operation a move would perform without touching the filesystem.
fn preview_move(target: &Path, file_path: &Path, category: &str) -> OrganizeResult<Operation> {
    let destination_path = destination_for(&target.join(category), file_path)?;
    if destination_path.symlink_metadata().is_ok() {
        return Err(OrganizeError::DestinationExists {
            destination: destination_path,
        });
    }

    Ok(Operation {
        original_path: file_path.to_path_buf(),
        new_path: destination_path,
        category: category.to_string(),
    })
}

fn destination_for(category_path: &Path, file_path: &Path) -> OrganizeResult<PathBuf> {
    let file_name = file_path
        .file_name()
        .ok_or_else(|| OrganizeError::FileMoveFailure {
            source: file_path.to_path_buf(),
            destination: category_path.to_path_buf(),
            source_error: io::Error::new(
                io::ErrorKind::InvalidInput,
                "file has no name component",
            ),
        })?;
    Ok(category_path.join(file_name))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
