//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! a progress bar for the move pass, and the per-category summary table.

use crate::file_organizer::ProgressEvent;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for operations
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortbox::output::OutputFormatter;
    /// OutputFormatter::success("Done organizing!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Renders a progress event as one styled line.
    ///
    /// The text is the event's `Display` output; only the marker and color
    /// depend on the kind of event.
    pub fn event_line(event: &ProgressEvent<'_>) -> String {
        let line = event.to_string();
        match event {
            ProgressEvent::Moved { .. } | ProgressEvent::TargetCreated { .. } => {
                format!("{} {}", "✓".green(), line)
            }
            ProgressEvent::Failed { .. } | ProgressEvent::TargetNotFound { .. } => {
                format!("{} {}", "✗".red(), line.red())
            }
            ProgressEvent::WouldMove { .. } | ProgressEvent::WouldCreate { .. } => {
                format!("[DRY RUN] {}", line).yellow().to_string()
            }
            ProgressEvent::NothingToDo { .. } => line.cyan().to_string(),
        }
    }

    /// Creates and returns a progress bar for file operations.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of files to process
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortbox::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Arguments
    ///
    /// * `rows` - Category names with file counts, printed in the given order
    /// * `total_files` - Total number of files organized
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortbox::output::OutputFormatter;
    ///
    /// let rows = vec![("Images".to_string(), 8), ("Documents".to_string(), 15)];
    /// OutputFormatter::summary_table(&rows, 23);
    /// ```
    pub fn summary_table(rows: &[(String, usize)], total_files: usize) {
        Self::header("SUMMARY");
        for line in Self::summary_lines(rows, total_files) {
            println!("{}", line);
        }
    }

    /// Renders the summary table body, one string per line.
    pub fn summary_lines(rows: &[(String, usize)], total_files: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 4);

        let max_category_len = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // At least "Category" width

        lines.push(format!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        ));
        lines.push("-".repeat(max_category_len + 10));

        for (category, count) in rows {
            lines.push(format!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural_files(*count),
                width = max_category_len
            ));
        }

        lines.push("-".repeat(max_category_len + 10));
        lines.push(format!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural_files(total_files),
            width = max_category_len
        ));
        lines
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural_files(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
