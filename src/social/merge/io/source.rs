use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::social::merge::config::FileOrder;
use crate::social::merge::error::{MergeError, Result};

/// Lists the `.xlsx` workbooks directly inside `dir`.
///
/// The returned order decides which surrogate keys each file receives, so
/// [`FileOrder::Name`] is the reproducible choice. [`FileOrder::Listing`]
/// keeps whatever order the filesystem reports.
pub fn list_workbooks(dir: &Path, order: FileOrder) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MergeError::MissingInput(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_workbook(&path) {
            paths.push(path);
        }
    }

    if order == FileOrder::Name {
        paths.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    }
    debug!(count = paths.len(), ?order, "workbooks listed");
    Ok(paths)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_only_workbooks_sorted_by_name() {
        let dir = tempdir().expect("temporary directory");
        for name in ["b.xlsx", "a.XLSX", "notes.txt", "c.xlsx.bak"] {
            fs::write(dir.path().join(name), b"").expect("fixture written");
        }
        fs::create_dir(dir.path().join("nested.xlsx")).expect("directory created");

        let paths = list_workbooks(dir.path(), FileOrder::Name).expect("listed");
        let names: Vec<_> = paths
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.XLSX", "b.xlsx"]);
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().expect("temporary directory");
        let missing = dir.path().join("files");

        let error = list_workbooks(&missing, FileOrder::Listing).unwrap_err();
        assert!(matches!(error, MergeError::MissingInput(path) if path == missing));
    }
}
