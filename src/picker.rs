//! Native folder picker used when no path is given on the command line.

use std::fmt;
use std::path::PathBuf;

const DIALOG_TITLE: &str = "Select folder to organize";

/// The picker could not be shown at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerError {
    /// Built without the `picker` feature.
    NotCompiled,
    /// No graphical session to show a dialog in.
    NoDisplay,
}

impl fmt::Display for PickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCompiled => write!(f, "this build has no folder picker support"),
            Self::NoDisplay => write!(f, "no graphical display is available"),
        }
    }
}

impl std::error::Error for PickerError {}

/// Asks the user to choose a folder.
///
/// Returns `Ok(None)` when the dialog was closed without a choice.
#[cfg(feature = "picker")]
pub fn pick_folder() -> Result<Option<PathBuf>, PickerError> {
    if !display_available() {
        return Err(PickerError::NoDisplay);
    }
    Ok(rfd::FileDialog::new().set_title(DIALOG_TITLE).pick_folder())
}

#[cfg(not(feature = "picker"))]
pub fn pick_folder() -> Result<Option<PathBuf>, PickerError> {
    tracing::debug!(title = DIALOG_TITLE, "folder picker not compiled in");
    Err(PickerError::NotCompiled)
}

#[cfg(all(feature = "picker", unix, not(target_os = "macos")))]
fn display_available() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

#[cfg(all(feature = "picker", not(all(unix, not(target_os = "macos")))))]
fn display_available() -> bool {
    true
}
