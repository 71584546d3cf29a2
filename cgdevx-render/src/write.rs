//! Change-gated atomic write shared by the parametrizer and patchers.
//!
//! Write protocol: skip if the updated content equals what is on disk, else
//! write to `<path>.cgdevx.tmp` and rename onto the final path (atomic on
//! POSIX). Skipping on equality is what makes every pass idempotent.

use std::path::{Path, PathBuf};

/// Write `updated` to `path` unless it already equals `current`.
///
/// Returns `true` if the file was rewritten.
pub(crate) fn write_if_changed(
    path: &Path,
    current: &str,
    updated: &str,
) -> Result<bool, std::io::Error> {
    if updated == current {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(false);
    }

    let tmp = PathBuf::from(format!("{}.cgdevx.tmp", path.display()));
    std::fs::write(&tmp, updated)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    tracing::info!("wrote: {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn equal_content_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.tf");
        fs::write(&path, "same").unwrap();
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        let written = write_if_changed(&path, "same", "same").unwrap();
        assert!(!written);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn changed_content_is_rewritten_and_tmp_removed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.tf");
        fs::write(&path, "old").unwrap();

        let written = write_if_changed(&path, "old", "new").unwrap();
        assert!(written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let tmp_path = PathBuf::from(format!("{}.cgdevx.tmp", path.display()));
        assert!(!tmp_path.exists(), ".cgdevx.tmp must be cleaned up");
    }
}
