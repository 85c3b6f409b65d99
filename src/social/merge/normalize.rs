use tracing::debug;

use crate::social::merge::keys::{KeyAllocator, KeyKind};
use crate::social::merge::model::{
    COMMENT_ID_COLUMN, COMMENTS_SHEET, CellValue, EVENTS_SHEET, POST_FEATURES_SHEET, Sheet,
};

/// Annotator label columns every post features table carries.
pub const POST_LABEL_COLUMNS: [&str; 3] = [
    "annotatorOne_post_label",
    "annotatorTwo_post_label",
    "annotatorThree_post_label",
];

/// Label columns every comments table carries.
pub const COMMENT_LABEL_COLUMNS: [&str; 4] = [
    "annotatorOne_comment_label",
    "annotatorTwo_comment_label",
    "annotatorThree_comment_label",
    "label",
];

/// Applies the per-sheet schema rules to a sheet of the file at
/// `file_index`.
///
/// Returns `None` when the sheet is dropped from the merge, which only
/// happens to events sheets outside the first file.
pub fn normalize_sheet(
    mut sheet: Sheet,
    file_index: usize,
    keys: &mut KeyAllocator,
) -> Option<Sheet> {
    match sheet.normalized_name().as_str() {
        POST_FEATURES_SHEET => {
            ensure_columns(&mut sheet, &POST_LABEL_COLUMNS);
        }
        COMMENTS_SHEET => {
            assign_comment_ids(&mut sheet, keys);
            ensure_columns(&mut sheet, &COMMENT_LABEL_COLUMNS);
        }
        EVENTS_SHEET if file_index > 0 => {
            debug!(sheet = %sheet.name, file_index, "dropping events sheet of later file");
            return None;
        }
        _ => {}
    }
    Some(sheet)
}

fn ensure_columns(sheet: &mut Sheet, columns: &[&str]) {
    for column in columns {
        sheet.ensure_column(column);
    }
}

/// Overwrites (or appends) `comment_id` with a contiguous block of comment
/// surrogates in row order.
fn assign_comment_ids(sheet: &mut Sheet, keys: &mut KeyAllocator) {
    let ids = keys.allocate_block(KeyKind::Comment, sheet.row_count());
    let column = sheet.ensure_column(COMMENT_ID_COLUMN);
    for (row, id) in sheet.rows.iter_mut().zip(ids) {
        row[column] = CellValue::Int(id as i64);
    }
}
