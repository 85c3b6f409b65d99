use std::borrow::Cow;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Normalized name of the sheet holding annotated post features.
pub const POST_FEATURES_SHEET: &str = "post features";
/// Normalized name of the sheet holding comments.
pub const COMMENTS_SHEET: &str = "comments";
/// Normalized name of the shared events sheet.
pub const EVENTS_SHEET: &str = "events";
/// Column carrying a file-local post identifier.
pub const POST_ID_COLUMN: &str = "post-id";
/// Column receiving the surrogate comment identifier.
pub const COMMENT_ID_COLUMN: &str = "comment_id";

/// A single cell of a sheet, keeping the original value kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No data in the cell. Distinct from empty text and zero.
    #[default]
    Missing,
    /// Integral number.
    Int(i64),
    /// Non-integral (or out of `i64` range) number.
    Float(f64),
    /// Text literal.
    Text(String),
    /// Boolean literal.
    Bool(bool),
    /// Date/time stored as an Excel serial day number.
    DateTime(f64),
    /// List or record-like value.
    Composite(serde_json::Value),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Textual rendering used when deciding whether a cell looks like an
    /// identifier. Only numbers and text have one.
    pub fn string_form(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Int(value) => Some(Cow::Owned(value.to_string())),
            CellValue::Float(value) => Some(Cow::Owned(value.to_string())),
            CellValue::Text(value) => Some(Cow::Borrowed(value)),
            _ => None,
        }
    }

    /// Renders the value as text for sinks that need a textual column.
    /// Returns `None` for missing cells.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Int(value) => Some(value.to_string()),
            CellValue::Float(value) => Some(value.to_string()),
            CellValue::Text(value) => Some(value.clone()),
            CellValue::Bool(value) => Some(value.to_string()),
            CellValue::DateTime(serial) => Some(
                excel_serial_to_datetime(*serial)
                    .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| serial.to_string()),
            ),
            CellValue::Composite(value) => Some(value.to_string()),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Converts an Excel serial day number (1900 date system) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Lowercases and trims a sheet name for comparisons.
pub fn normalize_sheet_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A named table of rows by columns. Every row holds exactly one cell per
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Name used for case and whitespace insensitive comparisons.
    pub fn normalized_name(&self) -> String {
        normalize_sheet_name(&self.name)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|candidate| candidate == column)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(row);
    }

    /// Returns the values of a column in row order.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &CellValue>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Adds the column filled with missing values unless it already exists.
    /// Returns the column index either way.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(index) = self.column_index(column) {
            return index;
        }
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(CellValue::Missing);
        }
        self.columns.len() - 1
    }
}

/// A parsed source workbook with its sheets in workbook order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub sheets: Vec<Sheet>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, sheets: Vec<Sheet>) -> Self {
        Self {
            path: path.into(),
            sheets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_compare_trimmed_and_lowercased() {
        assert_eq!(normalize_sheet_name(" Events "), "events");
        assert_eq!(normalize_sheet_name("EVENTS"), "events");
        assert_eq!(normalize_sheet_name("Post Features"), POST_FEATURES_SHEET);
    }

    #[test]
    fn ensure_column_pads_existing_rows() {
        let mut sheet = Sheet::new("Comments", vec!["text".to_string()]);
        sheet.push_row(vec!["hello".into()]);
        sheet.push_row(vec![]);

        let index = sheet.ensure_column("label");
        assert_eq!(index, 1);
        assert_eq!(sheet.ensure_column("label"), 1);
        assert_eq!(sheet.rows[0], vec![CellValue::from("hello"), CellValue::Missing]);
        assert_eq!(sheet.rows[1], vec![CellValue::Missing, CellValue::Missing]);
    }

    #[test]
    fn datetime_text_uses_calendar_form() {
        let value = CellValue::DateTime(45000.5);
        assert_eq!(value.to_text().as_deref(), Some("2023-03-15 12:00:00"));
        assert_eq!(CellValue::Missing.to_text(), None);
    }
}
