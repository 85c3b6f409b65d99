use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, Transaction, params_from_iter};
use tracing::{debug, warn};

use crate::social::merge::aggregate::MergedTable;
use crate::social::merge::error::Result;
use crate::social::merge::model::CellValue;

/// Storage class chosen for a column from the values it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAffinity {
    Integer,
    Real,
    Timestamp,
    Text,
}

impl ColumnAffinity {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnAffinity::Integer => "INTEGER",
            ColumnAffinity::Real => "REAL",
            ColumnAffinity::Timestamp => "TIMESTAMP",
            ColumnAffinity::Text => "TEXT",
        }
    }

    /// Converts a cell for storage in a column of this affinity. Missing
    /// cells become `NULL`.
    fn encode(self, cell: &CellValue) -> Value {
        match (self, cell) {
            (_, CellValue::Missing) => Value::Null,
            (ColumnAffinity::Integer, CellValue::Int(value)) => Value::Integer(*value),
            (ColumnAffinity::Integer, CellValue::Bool(value)) => Value::Integer(i64::from(*value)),
            (ColumnAffinity::Real, CellValue::Int(value)) => Value::Real(*value as f64),
            (ColumnAffinity::Real, CellValue::Float(value)) => Value::Real(*value),
            (_, other) => other.to_text().map(Value::Text).unwrap_or(Value::Null),
        }
    }
}

/// Picks the column affinity from its present values. Composite values and
/// any mix that has no common numeric form fall back to text.
pub fn infer_affinity<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> ColumnAffinity {
    let mut ints = false;
    let mut floats = false;
    let mut bools = false;
    let mut datetimes = false;

    for cell in cells {
        match cell {
            CellValue::Missing => {}
            CellValue::Int(_) => ints = true,
            CellValue::Float(_) => floats = true,
            CellValue::Bool(_) => bools = true,
            CellValue::DateTime(_) => datetimes = true,
            CellValue::Text(_) | CellValue::Composite(_) => return ColumnAffinity::Text,
        }
    }

    match (ints, floats, bools, datetimes) {
        (true, false, false, false) | (false, false, true, false) => ColumnAffinity::Integer,
        (_, true, false, false) => ColumnAffinity::Real,
        (false, false, false, true) => ColumnAffinity::Timestamp,
        _ => ColumnAffinity::Text,
    }
}

/// Relation name for a sheet: trimmed, with spaces and hyphens replaced by
/// underscores.
pub fn relation_name(sheet_name: &str) -> String {
    sheet_name.trim().replace([' ', '-'], "_")
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Writes every merged table into the SQLite database at `path`, replacing
/// relations of the same name. All tables are written in one transaction.
pub fn write_database(path: &Path, tables: &[MergedTable]) -> Result<()> {
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    for table in tables {
        write_table(&tx, table)?;
    }
    tx.commit()?;
    Ok(())
}

fn write_table(tx: &Transaction<'_>, table: &MergedTable) -> Result<()> {
    let relation = quote_identifier(&relation_name(&table.name));
    tx.execute(&format!("DROP TABLE IF EXISTS {relation}"), [])?;

    if table.columns.is_empty() {
        warn!(sheet = %table.name, "skipping table without columns");
        return Ok(());
    }

    let affinities: Vec<ColumnAffinity> = (0..table.columns.len())
        .map(|index| infer_affinity(table.rows.iter().map(|row| &row[index])))
        .collect();

    let column_defs: Vec<String> = table
        .columns
        .iter()
        .zip(&affinities)
        .map(|(column, affinity)| format!("{} {}", quote_identifier(column), affinity.sql_type()))
        .collect();
    tx.execute(
        &format!("CREATE TABLE {relation} ({})", column_defs.join(", ")),
        [],
    )?;

    let column_list: Vec<String> = table.columns.iter().map(|c| quote_identifier(c)).collect();
    let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{i}")).collect();
    let mut insert = tx.prepare_cached(&format!(
        "INSERT INTO {relation} ({}) VALUES ({})",
        column_list.join(", "),
        placeholders.join(", ")
    ))?;
    for row in &table.rows {
        let values = row
            .iter()
            .zip(&affinities)
            .map(|(cell, affinity)| affinity.encode(cell));
        insert.execute(params_from_iter(values))?;
    }

    debug!(relation = %relation, rows = table.rows.len(), "table persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::merge::model::Sheet;

    #[test]
    fn relation_names_replace_spaces_and_hyphens() {
        assert_eq!(relation_name(" Post Features "), "Post_Features");
        assert_eq!(relation_name("user-events list"), "user_events_list");
    }

    #[test]
    fn affinity_follows_present_values() {
        use CellValue::*;
        assert_eq!(infer_affinity(&[Int(1), Missing, Int(2)]), ColumnAffinity::Integer);
        assert_eq!(infer_affinity(&[Int(1), Float(2.5)]), ColumnAffinity::Real);
        assert_eq!(infer_affinity(&[Bool(true), Bool(false)]), ColumnAffinity::Integer);
        assert_eq!(infer_affinity(&[DateTime(45000.0)]), ColumnAffinity::Timestamp);
        assert_eq!(infer_affinity(&[Int(1), "x".into()]), ColumnAffinity::Text);
        assert_eq!(infer_affinity(&[Int(1), Bool(true)]), ColumnAffinity::Text);
        assert_eq!(infer_affinity(&[Missing, Missing]), ColumnAffinity::Text);
        assert_eq!(infer_affinity(std::iter::empty::<&CellValue>()), ColumnAffinity::Text);
    }

    #[test]
    fn writes_tables_with_nulls_and_stringified_composites() {
        let mut table = Sheet::new(
            "Post Features",
            vec!["post-id".to_string(), "tags".to_string(), "label".to_string()],
        );
        table.push_row(vec![
            CellValue::Int(1),
            CellValue::Composite(serde_json::json!(["a", "b"])),
            CellValue::Missing,
        ]);
        table.push_row(vec![CellValue::Int(2), "plain".into(), "spam".into()]);

        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("merged.db");
        write_database(&path, std::slice::from_ref(&table)).expect("first write");
        write_database(&path, &[table]).expect("rewrite replaces table");

        let conn = Connection::open(&path).expect("database opened");
        let rows: Vec<(i64, String, Option<String>)> = conn
            .prepare("SELECT \"post-id\", tags, label FROM Post_Features ORDER BY \"post-id\"")
            .expect("query prepared")
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .expect("query ran")
            .collect::<std::result::Result<_, _>>()
            .expect("rows read");

        assert_eq!(
            rows,
            vec![
                (1, "[\"a\",\"b\"]".to_string(), None),
                (2, "plain".to_string(), Some("spam".to_string())),
            ]
        );
    }
}
