use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::social::merge::aggregate::{MergedTable, SheetAggregator};
use crate::social::merge::config::MergeConfig;
use crate::social::merge::error::Result;
use crate::social::merge::io::{excel_read, excel_write, source, sqlite_write};
use crate::social::merge::keys::{KeyAllocator, KeyKind};
use crate::social::merge::model::SourceFile;
use crate::social::merge::normalize::normalize_sheet;
use crate::social::merge::unify::{discover_post_ids, rewrite_foreign_keys};

/// Counts reported once a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MergeSummary {
    pub files_processed: usize,
    pub posts_remapped: u64,
    pub comments_assigned: u64,
    pub cells_rewritten: usize,
    pub tables: usize,
}

/// What a single file contributed to the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    /// `(old, new)` post identifiers in discovery order.
    pub post_ids: Vec<(i64, u64)>,
    pub cells_rewritten: usize,
    pub sheets_kept: usize,
}

/// Accumulates source files into merged tables.
///
/// Files must be fed one at a time in processing order. Each file is fully
/// unified and normalized before the next one starts, since both counters
/// are shared by every later file.
#[derive(Debug, Default)]
pub struct Merger {
    keys: KeyAllocator,
    aggregator: SheetAggregator,
    files_processed: usize,
    cells_rewritten: usize,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unifies identifiers of one file and adds its sheets to the merge.
    #[instrument(level = "info", skip_all, fields(file = %file.path.display()))]
    pub fn add_file(&mut self, file: SourceFile) -> FileReport {
        let file_index = self.files_processed;
        let mapping = discover_post_ids(&file.sheets, &mut self.keys);

        let mut cells_rewritten = 0;
        let mut sheets_kept = 0;
        for mut sheet in file.sheets {
            cells_rewritten += rewrite_foreign_keys(&mut sheet, &mapping);
            if let Some(sheet) = normalize_sheet(sheet, file_index, &mut self.keys) {
                self.aggregator.add(sheet);
                sheets_kept += 1;
            }
        }

        self.files_processed += 1;
        self.cells_rewritten += cells_rewritten;
        info!(
            posts = mapping.len(),
            cells_rewritten, sheets_kept, "file merged"
        );

        FileReport {
            path: file.path,
            post_ids: mapping.iter().collect(),
            cells_rewritten,
            sheets_kept,
        }
    }

    /// Concatenates everything added so far.
    pub fn finish(self) -> (Vec<MergedTable>, MergeSummary) {
        let summary = MergeSummary {
            files_processed: self.files_processed,
            posts_remapped: self.keys.issued(KeyKind::Post),
            comments_assigned: self.keys.issued(KeyKind::Comment),
            cells_rewritten: self.cells_rewritten,
            tables: self.aggregator.len(),
        };
        (self.aggregator.finish(), summary)
    }
}

/// Merges already parsed files, in the given order.
pub fn merge_files(files: impl IntoIterator<Item = SourceFile>) -> (Vec<MergedTable>, MergeSummary) {
    let mut merger = Merger::new();
    for file in files {
        merger.add_file(file);
    }
    merger.finish()
}

/// Reads every workbook of the input directory, merges them and writes the
/// SQLite database and the merged workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(
        input = %config.input_dir.display(),
        database = %config.database.display(),
        workbook = %config.workbook.display(),
        order = ?config.order
    )
)]
pub fn run(config: &MergeConfig) -> Result<MergeSummary> {
    let paths = source::list_workbooks(&config.input_dir, config.order)?;
    info!(file_count = paths.len(), "source workbooks found");

    let mut merger = Merger::new();
    for path in &paths {
        let file = excel_read::read_workbook(path)?;
        debug!(file = %path.display(), sheet_count = file.sheets.len(), "workbook read");
        merger.add_file(file);
    }

    let (tables, summary) = merger.finish();
    sqlite_write::write_database(&config.database, &tables)?;
    info!(table_count = tables.len(), "database written");
    excel_write::write_workbook(&config.workbook, &tables)?;
    info!(sheet_count = tables.len(), "workbook written");

    Ok(summary)
}
