//! Category table and file filtering configuration.
//!
//! This module loads an optional TOML configuration file that can replace the
//! built-in category table and add filtering rules. It supports:
//! - An ordered list of categories with their extensions
//! - A custom fallback category name
//! - Exact filename, extension, glob and regex exclusions
//! - Include (whitelist) globs that override exclusions
//!
//! Configuration is read-only; nothing is ever written back.
//!
//! # Configuration File Format
//!
//! ```toml
//! fallback = "Others"
//!
//! [[categories]]
//! name = "Images"
//! extensions = [".jpg", ".png"]
//!
//! [filters]
//! skip_hidden = false
//!
//! [filters.exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::file_category::{Category, CategoryTable, FALLBACK_CATEGORY};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory when no config path is given.
pub const LOCAL_CONFIG_FILE: &str = ".sortboxrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// A category entry has an empty name.
    EmptyCategoryName,
    /// A category name is not a single plain directory name.
    InvalidCategoryName(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::EmptyCategoryName => {
                write!(f, "Invalid configuration: category names must not be empty")
            }
            ConfigError::InvalidCategoryName(name) => write!(
                f,
                "Invalid category name '{}': expected a single folder name without separators",
                name
            ),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(
                    f,
                    "Invalid glob pattern '{}': expected *.ext or name?.txt",
                    pattern
                )
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ordered category definitions. `None` keeps the built-in table.
    #[serde(default)]
    pub categories: Option<Vec<CategoryDef>>,

    /// Name of the directory for files matching no category.
    #[serde(default)]
    pub fallback: Option<String>,

    /// Rules deciding which files are left alone.
    #[serde(default)]
    pub filters: FilterRules,
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to leave hidden files (starting with ".") in place. Defaults to false.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, with or without the dot (e.g., "crdownload").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.sortboxrc.toml` in the current directory
    /// 3. Look for `sortbox/config.toml` in the platform config directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(dirs) = directories::ProjectDirs::from("", "", "sortbox") {
            let user_config = dirs.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::load_from_file(&user_config);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Build the category table described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyCategoryName` if a category or the fallback has a blank name,
    /// and `ConfigError::InvalidCategoryName` if a name would leave the target folder
    /// (`.`, `..`, separators, absolute paths).
    pub fn category_table(&self) -> Result<CategoryTable, ConfigError> {
        let fallback = match &self.fallback {
            Some(name) => validate_category_name(name)?,
            None => FALLBACK_CATEGORY.to_string(),
        };

        let Some(defs) = &self.categories else {
            let defaults = CategoryTable::default();
            return Ok(CategoryTable::new(defaults.categories().to_vec(), fallback));
        };

        let categories = defs
            .iter()
            .map(|def| {
                validate_category_name(&def.name).map(|name| Category::new(name, &def.extensions))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CategoryTable::new(categories, fallback))
    }

    /// Compile the filter rules into optimized structures for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Compiled, optimized filter structures for efficient file matching.
///
/// Patterns are parsed once here instead of on every file.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if a file should be organized (not excluded).
    ///
    /// Only the file name is considered. Checks run in this order:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and skipped, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.include_patterns.iter().any(|p| p.matches(&file_name)) {
            return true;
        }

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|re| re.is_match(&file_name))
    }
}

/// Category names become directories directly under the target, so each must be
/// exactly one normal path component.
fn validate_category_name(raw: &str) -> Result<String, ConfigError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ConfigError::EmptyCategoryName);
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(name.to_string()),
        _ => Err(ConfigError::InvalidCategoryName(name.to_string())),
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters_from(toml_text: &str) -> CompiledFilters {
        Config::from_toml(toml_text)
            .expect("valid toml")
            .compile_filters()
            .expect("valid filters")
    }

    #[test]
    fn test_default_config_includes_everything() {
        let compiled = Config::default().compile_filters().unwrap();

        assert!(compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("photo.jpg")));
        assert!(compiled.should_include(Path::new("README")));
    }

    #[test]
    fn test_default_config_uses_builtin_table() {
        let table = Config::default().category_table().unwrap();
        assert_eq!(table, CategoryTable::default());
    }

    #[test]
    fn test_custom_categories_keep_file_order() {
        let config = Config::from_toml(
            r#"
            fallback = "Misc"

            [[categories]]
            name = "Books"
            extensions = ["epub", ".PDF"]

            [[categories]]
            name = "Papers"
            extensions = [".pdf"]
            "#,
        )
        .unwrap();
        let table = config.category_table().unwrap();

        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["Books", "Papers", "Misc"]);
        assert_eq!(table.categorize(Path::new("paper.pdf")), "Books");
        assert_eq!(table.categorize(Path::new("photo.jpg")), "Misc");
    }

    #[test]
    fn test_fallback_without_categories_keeps_default_table() {
        let config = Config::from_toml(r#"fallback = "Unsorted""#).unwrap();
        let table = config.category_table().unwrap();

        assert_eq!(table.fallback(), "Unsorted");
        assert_eq!(table.categorize(Path::new("song.mp3")), "Music");
        assert_eq!(table.categorize(Path::new("data.bin")), "Unsorted");
    }

    #[test]
    fn test_empty_category_name_rejected() {
        let config = Config::from_toml(
            r#"
            [[categories]]
            name = "  "
            extensions = [".x"]
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.category_table(),
            Err(ConfigError::EmptyCategoryName)
        ));
    }

    #[test]
    fn test_category_names_must_stay_inside_target() {
        for bad in ["..", ".", "a/b", "/abs", "../Escaped", "a\\b", "Images/"] {
            let config = Config::from_toml(&format!(
                "[[categories]]\nname = '{}'\nextensions = ['.jpg']\n",
                bad
            ))
            .unwrap();
            assert!(
                matches!(
                    config.category_table(),
                    Err(ConfigError::InvalidCategoryName(_))
                ),
                "category name {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_fallback_name_must_stay_inside_target() {
        for bad in ["..", "/abs", "a/b"] {
            let config = Config::from_toml(&format!("fallback = '{}'", bad)).unwrap();
            assert!(matches!(
                config.category_table(),
                Err(ConfigError::InvalidCategoryName(_))
            ));
        }
    }

    #[test]
    fn test_plain_names_with_dots_accepted() {
        let config = Config::from_toml(
            r#"
            fallback = "Misc.files"

            [[categories]]
            name = "v1.0 Docs"
            extensions = [".md"]
            "#,
        )
        .unwrap();

        let table = config.category_table().unwrap();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["v1.0 Docs", "Misc.files"]);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_toml("categories = 3");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_skip_hidden_files() {
        let compiled = filters_from(
            r#"
            [filters]
            skip_hidden = true
            "#,
        );

        assert!(!compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("visible.txt")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            filenames = ["Thumbs.db", "desktop.ini"]
            "#,
        );

        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(!compiled.should_include(Path::new("/downloads/desktop.ini")));
        assert!(compiled.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_exclude_extensions() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            extensions = ["part", ".crdownload"]
            "#,
        );

        assert!(!compiled.should_include(Path::new("movie.mkv.part")));
        assert!(!compiled.should_include(Path::new("setup.exe.CRDOWNLOAD")));
        assert!(compiled.should_include(Path::new("movie.mkv")));
    }

    #[test]
    fn test_exclude_glob_patterns_match_file_name() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            patterns = ["*.tmp", "[0-9]*.log", "file?.txt"]
            "#,
        );

        assert!(!compiled.should_include(Path::new("/inbox/cache.tmp")));
        assert!(!compiled.should_include(Path::new("1app.log")));
        assert!(!compiled.should_include(Path::new("file1.txt")));
        assert!(compiled.should_include(Path::new("app.log")));
        assert!(compiled.should_include(Path::new("file12.txt")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = filters_from(
            r#"
            [filters]
            skip_hidden = true

            [filters.include]
            patterns = [".important"]
            "#,
        );

        assert!(compiled.should_include(Path::new(".important")));
        assert!(!compiled.should_include(Path::new(".other")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            regex = ['^~\$.*']
            "#,
        );

        assert!(!compiled.should_include(Path::new("~$report.docx")));
        assert!(compiled.should_include(Path::new("report.docx")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let config = Config::from_toml(
            r#"
            [filters.exclude]
            regex = ["[invalid("]
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.compile_filters(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_glob_pattern_returns_error() {
        let config = Config::from_toml(
            r#"
            [filters.exclude]
            patterns = ["[invalid"]
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.compile_filters(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }
}
