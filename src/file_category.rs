/// Extension-based categorization for organizing files.
///
/// This module maps file extensions to named categories (e.g., "Images",
/// "Documents"). Categories are kept in an ordered table so that the first
/// matching category wins if two categories ever list the same extension.
///
/// # Examples
///
/// ```
/// use sortbox::file_category::CategoryTable;
/// use std::path::Path;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.categorize(Path::new("photo.JPG")), "Images");
/// assert_eq!(table.categorize(Path::new("notes.txt")), "Documents");
/// assert_eq!(table.categorize(Path::new("archive.tar.gz")), "Others");
/// ```
use std::path::Path;

/// Name of the category used when no extension matches.
pub const FALLBACK_CATEGORY: &str = "Others";

const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg"]),
    ("Documents", &[".pdf", ".docx", ".txt", ".xlsx", ".pptx"]),
    ("Videos", &[".mp4", ".mov", ".avi", ".mkv"]),
    ("Music", &[".mp3", ".wav", ".flac"]),
    ("Archives", &[".zip", ".rar", ".7z", ".tar"]),
    ("Installers", &[".exe", ".msi", ".dmg"]),
    ("Scripts", &[".py", ".js", ".sh", ".bat"]),
];

/// A named bucket of file extensions.
///
/// The category name doubles as the name of the subdirectory files are moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    /// Creates a category, normalizing every extension to lowercase with a leading dot.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    /// Returns the category name, which is also its directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the recognized extensions, lowercase and dot-prefixed.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if this category lists the given normalized extension.
    fn contains(&self, normalized_ext: &str) -> bool {
        self.extensions.iter().any(|ext| ext == normalized_ext)
    }
}

/// Ordered mapping from category names to extension sets.
///
/// The table is built once and then only read. Lookups scan categories in
/// their defined order and return the first match, falling back to
/// [`FALLBACK_CATEGORY`] (or a custom fallback name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryTable {
    /// Creates a table from an ordered list of categories and a fallback name.
    pub fn new(categories: Vec<Category>, fallback: impl Into<String>) -> Self {
        Self {
            categories,
            fallback: fallback.into(),
        }
    }

    /// Returns the categories in lookup order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns the name used for files matching no category.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Returns every destination name in table order, fallback last.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .map(Category::name)
            .chain(std::iter::once(self.fallback.as_str()))
    }

    /// Maps a file extension to the first category listing it.
    ///
    /// The extension may be given with or without its leading dot and in any case.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortbox::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.category_for_extension("PNG"), Some("Images"));
    /// assert_eq!(table.category_for_extension(".mp3"), Some("Music"));
    /// assert_eq!(table.category_for_extension("gz"), None);
    /// ```
    pub fn category_for_extension(&self, ext: &str) -> Option<&str> {
        let normalized = normalize_extension(ext);
        self.categories
            .iter()
            .find(|category| category.contains(&normalized))
            .map(Category::name)
    }

    /// Determines the destination category for a file path.
    ///
    /// Only the last extension counts, so `archive.tar.gz` is looked up as `.gz`.
    /// Files with no extension land in the fallback category.
    pub fn categorize(&self, file_path: &Path) -> &str {
        file_path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .filter(|ext| !ext.is_empty())
            .and_then(|ext| self.category_for_extension(&ext))
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, extensions)| Category::new(*name, extensions.iter()))
            .collect();
        Self::new(categories, FALLBACK_CATEGORY)
    }
}

/// Lowercases an extension and makes sure it starts with a single dot.
fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = CategoryTable::default();
        let names: Vec<_> = table.names().collect();
        assert_eq!(
            names,
            vec![
                "Images",
                "Documents",
                "Videos",
                "Music",
                "Archives",
                "Installers",
                "Scripts",
                "Others"
            ]
        );
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let table = CategoryTable::default();
        assert_eq!(table.category_for_extension("JPG"), Some("Images"));
        assert_eq!(table.category_for_extension(".Pdf"), Some("Documents"));
        assert_eq!(table.category_for_extension("mkv"), Some("Videos"));
    }

    #[test]
    fn test_categorize_paths() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(Path::new("song.FLAC")), "Music");
        assert_eq!(table.categorize(Path::new("setup.exe")), "Installers");
        assert_eq!(table.categorize(Path::new("run.sh")), "Scripts");
        assert_eq!(table.categorize(Path::new("backup.7z")), "Archives");
    }

    #[test]
    fn test_categorize_uses_last_extension_only() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(Path::new("archive.tar.gz")), "Others");
        assert_eq!(table.categorize(Path::new("report.final.pdf")), "Documents");
    }

    #[test]
    fn test_categorize_without_extension_falls_back() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(Path::new("README")), "Others");
        assert_eq!(table.categorize(Path::new(".bashrc")), "Others");
        assert_eq!(table.categorize(Path::new("trailing.")), "Others");
    }

    #[test]
    fn test_first_matching_category_wins() {
        let table = CategoryTable::new(
            vec![
                Category::new("Web", ["html", ".svg"]),
                Category::new("Images", [".svg", ".png"]),
            ],
            "Misc",
        );
        assert_eq!(table.categorize(Path::new("logo.svg")), "Web");
        assert_eq!(table.categorize(Path::new("logo.png")), "Images");
        assert_eq!(table.categorize(Path::new("logo.bin")), "Misc");
    }

    #[test]
    fn test_extensions_are_normalized() {
        let category = Category::new("Books", ["EPUB", ".Mobi", " pdf "]);
        assert_eq!(category.extensions(), &[".epub", ".mobi", ".pdf"]);
    }
}
