//! Per-file post identifier unification.
//!
//! Post identifiers are only unique inside the workbook that defines them.
//! [`discover_post_ids`] assigns every local identifier a run-wide surrogate
//! and [`rewrite_foreign_keys`] replaces references to those identifiers
//! wherever they occur.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::social::merge::keys::{KeyAllocator, KeyKind};
use crate::social::merge::model::{CellValue, EVENTS_SHEET, POST_ID_COLUMN, Sheet};

/// Outcome of interpreting a cell as a post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    Post(i64),
    NotAnIdentifier,
}

/// Interprets a `post-id` cell as an integer identifier.
///
/// Whole numbers are taken as-is, fractional numbers are truncated toward
/// zero and text is parsed after trimming surrounding whitespace. Anything
/// else is not an identifier.
pub fn parse_identifier(cell: &CellValue) -> Identifier {
    match cell {
        CellValue::Int(value) => Identifier::Post(*value),
        CellValue::Float(value)
            if value.is_finite() && value.trunc().abs() < i64::MAX as f64 =>
        {
            Identifier::Post(value.trunc() as i64)
        }
        CellValue::Text(value) => value
            .trim()
            .parse::<i64>()
            .map(Identifier::Post)
            .unwrap_or(Identifier::NotAnIdentifier),
        _ => Identifier::NotAnIdentifier,
    }
}

/// Heuristic foreign key test: a present cell whose string form is made only
/// of ASCII decimal digits.
///
/// This deliberately ignores which column the cell lives in. Sheets do not
/// declare their foreign keys, so any digits-only value that matches a known
/// post identifier is treated as a reference to it.
pub fn looks_like_foreign_key(cell: &CellValue) -> bool {
    match cell.string_form() {
        Some(text) => !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit()),
        None => false,
    }
}

/// File-scoped mapping from local post identifiers to surrogate keys, kept
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIdMapping {
    index: HashMap<i64, u64>,
    order: Vec<(i64, u64)>,
}

impl PostIdMapping {
    pub fn get(&self, old_id: i64) -> Option<u64> {
        self.index.get(&old_id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pairs of `(old, new)` identifiers in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.order.iter().copied()
    }

    fn get_or_allocate(&mut self, old_id: i64, keys: &mut KeyAllocator) -> u64 {
        if let Some(new_id) = self.get(old_id) {
            return new_id;
        }
        let new_id = keys.allocate(KeyKind::Post);
        self.index.insert(old_id, new_id);
        self.order.push((old_id, new_id));
        new_id
    }

    /// Returns the surrogate for a cell that looks like a foreign key to a
    /// known post.
    fn lookup_cell(&self, cell: &CellValue) -> Option<u64> {
        if !looks_like_foreign_key(cell) {
            return None;
        }
        let old_id = cell.string_form()?.parse::<i64>().ok()?;
        self.get(old_id)
    }
}

/// Builds the post identifier mapping of one file, allocating a surrogate
/// for every identifier seen in a `post-id` column of a non-events sheet.
#[instrument(level = "debug", skip_all, fields(sheet_count = sheets.len()))]
pub fn discover_post_ids(sheets: &[Sheet], keys: &mut KeyAllocator) -> PostIdMapping {
    let mut mapping = PostIdMapping::default();

    for sheet in sheets {
        if sheet.normalized_name() == EVENTS_SHEET {
            continue;
        }
        let Some(values) = sheet.column_values(POST_ID_COLUMN) else {
            continue;
        };
        for cell in values.filter(|cell| !cell.is_missing()) {
            if let Identifier::Post(old_id) = parse_identifier(cell) {
                mapping.get_or_allocate(old_id, keys);
            }
        }
    }

    debug!(post_count = mapping.len(), "post identifiers discovered");
    mapping
}

/// Replaces every cell that references a mapped post identifier with its
/// surrogate. Events sheets are left untouched. Returns the number of cells
/// rewritten.
pub fn rewrite_foreign_keys(sheet: &mut Sheet, mapping: &PostIdMapping) -> usize {
    if mapping.is_empty() || sheet.normalized_name() == EVENTS_SHEET {
        return 0;
    }

    let mut rewritten = 0;
    for cell in sheet.rows.iter_mut().flatten() {
        if let Some(new_id) = mapping.lookup_cell(cell) {
            *cell = CellValue::Int(new_id as i64);
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> Sheet {
        let mut sheet = Sheet::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            sheet.push_row(row);
        }
        sheet
    }

    #[test]
    fn parses_numbers_and_trimmed_text() {
        assert_eq!(parse_identifier(&CellValue::Int(7)), Identifier::Post(7));
        assert_eq!(parse_identifier(&CellValue::Float(5.9)), Identifier::Post(5));
        assert_eq!(parse_identifier(&" 12 ".into()), Identifier::Post(12));
        assert_eq!(parse_identifier(&"-3".into()), Identifier::Post(-3));
        assert_eq!(parse_identifier(&"12.0".into()), Identifier::NotAnIdentifier);
        assert_eq!(parse_identifier(&"abc".into()), Identifier::NotAnIdentifier);
        assert_eq!(parse_identifier(&CellValue::Bool(true)), Identifier::NotAnIdentifier);
        assert_eq!(parse_identifier(&CellValue::Float(f64::NAN)), Identifier::NotAnIdentifier);
    }

    #[test]
    fn foreign_key_heuristic_requires_plain_digits() {
        assert!(looks_like_foreign_key(&CellValue::Int(42)));
        assert!(looks_like_foreign_key(&"007".into()));
        assert!(!looks_like_foreign_key(&CellValue::Int(-4)));
        assert!(!looks_like_foreign_key(&CellValue::Float(4.5)));
        assert!(!looks_like_foreign_key(&" 4".into()));
        assert!(!looks_like_foreign_key(&"５".into()));
        assert!(!looks_like_foreign_key(&"".into()));
        assert!(!looks_like_foreign_key(&CellValue::Missing));
        assert!(!looks_like_foreign_key(&CellValue::Bool(true)));
    }

    #[test]
    fn discovery_follows_sheet_then_row_order_and_skips_events() {
        let sheets = vec![
            sheet("Events", &["post-id"], vec![vec![CellValue::Int(100)]]),
            sheet(
                "Posts",
                &["post-id", "text"],
                vec![
                    vec![CellValue::Int(9), "a".into()],
                    vec![CellValue::Missing, "b".into()],
                    vec!["oops".into(), "c".into()],
                    vec![CellValue::Int(9), "d".into()],
                ],
            ),
            sheet("Post Features", &["post-id"], vec![vec!["4".into()]]),
            sheet("Annotations", &["other"], vec![vec![CellValue::Int(1)]]),
        ];
        let mut keys = KeyAllocator::new();
        keys.allocate(KeyKind::Post);

        let mapping = discover_post_ids(&sheets, &mut keys);

        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(9, 2), (4, 3)]);
        assert_eq!(mapping.get(100), None);
        assert_eq!(keys.peek(KeyKind::Post), 4);
    }

    #[test]
    fn rewrite_touches_any_column_but_only_mapped_digits() {
        let mut keys = KeyAllocator::new();
        let mut posts = sheet(
            "Posts",
            &["post-id", "reply-to", "score", "note"],
            vec![
                vec![CellValue::Int(5), CellValue::Int(7), CellValue::Int(3), "5".into()],
                vec![CellValue::Int(7), CellValue::Missing, CellValue::Float(5.5), "x5".into()],
            ],
        );
        let mapping = discover_post_ids(std::slice::from_ref(&posts), &mut keys);

        let rewritten = rewrite_foreign_keys(&mut posts, &mapping);

        assert_eq!(rewritten, 4);
        assert_eq!(
            posts.rows[0],
            vec![CellValue::Int(1), CellValue::Int(2), CellValue::Int(3), CellValue::Int(1)]
        );
        assert_eq!(
            posts.rows[1],
            vec![CellValue::Int(2), CellValue::Missing, CellValue::Float(5.5), "x5".into()]
        );
    }

    #[test]
    fn rewrite_leaves_events_alone() {
        let mut keys = KeyAllocator::new();
        let posts = sheet("Posts", &["post-id"], vec![vec![CellValue::Int(5)]]);
        let mapping = discover_post_ids(&[posts], &mut keys);
        let mut events = sheet(" EVENTS", &["post"], vec![vec![CellValue::Int(5)]]);

        assert_eq!(rewrite_foreign_keys(&mut events, &mapping), 0);
        assert_eq!(events.rows[0], vec![CellValue::Int(5)]);
    }

    #[test]
    fn oversized_digit_strings_pass_through() {
        let mut keys = KeyAllocator::new();
        let mut posts = sheet(
            "Posts",
            &["post-id", "ref"],
            vec![vec![CellValue::Int(1), "99999999999999999999999".into()]],
        );
        let mapping = discover_post_ids(std::slice::from_ref(&posts), &mut keys);
        rewrite_foreign_keys(&mut posts, &mapping);
        assert_eq!(posts.rows[0][1], CellValue::from("99999999999999999999999"));
    }
}
