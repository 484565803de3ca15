use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{ReportError, Result};

/// Returns the most recently modified `.xlsx` workbook in `dir`.
///
/// Office lock files (`~$name.xlsx`) are ignored.
pub fn latest_workbook(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        return Err(ReportError::MissingInput(dir.to_path_buf()));
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_workbook(&path) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        debug!(path = %path.display(), "candidate workbook");
        let replace = match &newest {
            Some((current, current_path)) => {
                modified > *current || (modified == *current && path > *current_path)
            }
            None => true,
        };
        if replace {
            newest = Some((modified, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| ReportError::NoWorkbookFound(dir.to_path_buf()))
}

fn is_workbook(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    has_extension && !is_lock_file
}
