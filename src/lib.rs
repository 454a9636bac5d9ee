//! sortbox - tidy a folder by file category
//!
//! This library classifies the files directly inside a folder by extension
//! and moves each one into a category subdirectory (Images, Documents,
//! Videos, Music, Archives, Installers, Scripts, or Others). Category tables
//! and file filters can be supplied through a TOML configuration file.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod picker;

pub use config::{CompiledFilters, Config, ConfigError};
pub use file_category::{Category, CategoryTable, FALLBACK_CATEGORY};
pub use file_organizer::{
    OrganizeError, OrganizeOptions, OrganizeReport, OrganizeResult, Organizer, ProgressEvent,
    ProgressSink, organize,
};

pub use cli::{Args, run_cli, run_cli_with_config};
