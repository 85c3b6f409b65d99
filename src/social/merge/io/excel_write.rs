use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::social::merge::aggregate::MergedTable;
use crate::social::merge::error::Result;
use crate::social::merge::model::CellValue;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Writes each merged table to its own worksheet, named after the table.
/// Names that Excel would consider equal to an earlier sheet (it ignores
/// case) get a `_1`, `_2`, ... suffix. The header row is frozen and
/// filtered; no index column is added.
pub fn write_workbook(path: &Path, tables: &[MergedTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let mut sheet_names = SheetNameRegistry::default();

    for table in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(sheet_names.assign(&table.name))?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let excel_col = col_idx as u16;
                match cell {
                    CellValue::Missing => {}
                    CellValue::Int(value) => {
                        worksheet.write_number(excel_row, excel_col, *value as f64)?;
                    }
                    CellValue::Float(value) => {
                        worksheet.write_number(excel_row, excel_col, *value)?;
                    }
                    CellValue::Text(value) => {
                        worksheet.write_string(excel_row, excel_col, value)?;
                    }
                    CellValue::Bool(value) => {
                        worksheet.write_boolean(excel_row, excel_col, *value)?;
                    }
                    CellValue::DateTime(serial) => {
                        worksheet.write_number_with_format(
                            excel_row,
                            excel_col,
                            *serial,
                            &datetime_format,
                        )?;
                    }
                    CellValue::Composite(value) => {
                        let json_string = serde_json::to_string(value)?;
                        worksheet.write_string(excel_row, excel_col, &json_string)?;
                    }
                }
            }
        }

        if !table.columns.is_empty() {
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
            worksheet.set_freeze_panes(1, 0)?;
        }
    }

    workbook_writer.save(path)?;
    Ok(())
}

/// Hands out worksheet names that are unique under Excel's case-insensitive
/// comparison.
#[derive(Debug, Default)]
struct SheetNameRegistry {
    used: HashSet<String>,
}

impl SheetNameRegistry {
    fn assign(&mut self, raw: &str) -> String {
        if self.used.insert(raw.to_lowercase()) {
            return raw.to_string();
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let max_prefix = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            let prefix: String = raw.chars().take(max_prefix).collect();
            let candidate = format!("{prefix}{suffix}");
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
