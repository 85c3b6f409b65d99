use std::collections::HashSet;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::social::merge::error::{MergeError, Result};
use crate::social::merge::model::{CellValue, Sheet, SourceFile};

/// Reads every worksheet of an `.xlsx` file, in workbook order.
///
/// The first row of each sheet is its header. Rows with no data at all are
/// skipped.
pub fn read_workbook(path: &Path) -> Result<SourceFile> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .ok_or_else(|| MergeError::InvalidWorkbook {
                path: path.to_path_buf(),
                reason: format!("missing sheet '{name}'"),
            })??;
        let sheet = range_to_sheet(name, &range);
        debug!(
            sheet = %sheet.name,
            rows = sheet.row_count(),
            columns = sheet.columns.len(),
            "sheet loaded"
        );
        sheets.push(sheet);
    }

    Ok(SourceFile::new(path, sheets))
}

fn range_to_sheet(name: String, range: &calamine::Range<DataType>) -> Sheet {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row),
        None => Vec::new(),
    };

    let mut sheet = Sheet::new(name, headers);
    for row in rows {
        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
            continue;
        }
        sheet.push_row(row.iter().map(cell_value).collect());
    }
    sheet
}

/// Renders header cells to column names. Blank headers become
/// `Unnamed: {index}` and repeated names get a `.1`, `.2`, ... suffix.
fn header_names(row: &[DataType]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(row.len());

    for (index, cell) in row.iter().enumerate() {
        let mut name = cell_to_string(cell);
        if name.is_empty() {
            name = format!("Unnamed: {index}");
        }
        if seen.contains(&name) {
            let base = name.clone();
            let mut counter = 1;
            while seen.contains(&name) {
                name = format!("{base}.{counter}");
                counter += 1;
            }
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty | DataType::Error(_) => CellValue::Missing,
        DataType::Int(value) => CellValue::Int(*value),
        DataType::Float(value) => float_value(*value),
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(serial) => CellValue::DateTime(*serial),
        other => CellValue::Text(other.to_string()),
    }
}

/// Spreadsheets store every number as a float; whole values come back as
/// integers.
fn float_value(value: f64) -> CellValue {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        CellValue::Int(value as i64)
    } else {
        CellValue::Float(value)
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.trim().to_string(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}
