use std::collections::HashMap;

use crate::social::merge::model::{CellValue, Sheet};

/// Result of concatenating every per-file version of a sheet.
pub type MergedTable = Sheet;

/// Collects normalized sheets and groups them by their original name.
///
/// Sheet names are matched exactly here: `Comments` and `comments` end up in
/// different tables even though the schema rules treat them alike.
#[derive(Debug, Default)]
pub struct SheetAggregator {
    buckets: Vec<(String, Vec<Sheet>)>,
    positions: HashMap<String, usize>,
}

impl SheetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sheet: Sheet) {
        match self.positions.get(&sheet.name) {
            Some(&position) => self.buckets[position].1.push(sheet),
            None => {
                self.positions.insert(sheet.name.clone(), self.buckets.len());
                self.buckets.push((sheet.name.clone(), vec![sheet]));
            }
        }
    }

    /// Number of distinct sheet names seen so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Concatenates each bucket into one table, in first-seen name order.
    pub fn finish(self) -> Vec<MergedTable> {
        self.buckets
            .into_iter()
            .map(|(name, sheets)| concat_sheets(name, sheets))
            .collect()
    }
}

/// Row-wise concatenation with a column union in first-seen order. Cells of
/// columns a part lacks are filled with missing values.
fn concat_sheets(name: String, parts: Vec<Sheet>) -> MergedTable {
    let mut columns: Vec<String> = Vec::new();
    let mut column_positions: HashMap<String, usize> = HashMap::new();
    for part in &parts {
        for column in &part.columns {
            if !column_positions.contains_key(column) {
                column_positions.insert(column.clone(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let mut merged = Sheet::new(name, columns);
    for part in parts {
        let targets: Vec<usize> = part
            .columns
            .iter()
            .map(|column| column_positions[column])
            .collect();
        for row in part.rows {
            let mut merged_row = vec![CellValue::Missing; merged.columns.len()];
            for (cell, &target) in row.into_iter().zip(&targets) {
                merged_row[target] = cell;
            }
            merged.rows.push(merged_row);
        }
    }
    merged
}
