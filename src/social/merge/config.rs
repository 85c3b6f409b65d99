use std::path::PathBuf;

/// Directory scanned for source workbooks when none is given.
pub const DEFAULT_INPUT_DIR: &str = "files";
/// SQLite database written when none is given.
pub const DEFAULT_DATABASE: &str = "merged_social_data.db";
/// Workbook written when none is given.
pub const DEFAULT_WORKBOOK: &str = "merged_social_data.xlsx";

/// Order in which source workbooks are processed. It decides which
/// surrogate keys every file receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileOrder {
    /// Lexicographic by file name.
    #[default]
    Name,
    /// Directory enumeration order as reported by the filesystem.
    Listing,
}

/// Settings for one merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    pub input_dir: PathBuf,
    pub database: PathBuf,
    pub workbook: PathBuf,
    pub order: FileOrder,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            database: PathBuf::from(DEFAULT_DATABASE),
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            order: FileOrder::default(),
        }
    }
}
