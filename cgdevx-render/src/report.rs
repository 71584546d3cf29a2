//! Aggregated outcome of a best-effort patch pass.

use std::path::{Path, PathBuf};

/// A single file the patch pass could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFailure {
    pub path: PathBuf,
    pub detail: String,
}

/// Per-file outcomes of one patch pass.
///
/// A failure never aborts the pass; the remaining eligible files are still
/// patched and the failure is surfaced here for the caller to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub changed: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub failures: Vec<PatchFailure>,
}

impl PatchReport {
    pub fn record_changed(&mut self, path: impl Into<PathBuf>) {
        self.changed.push(path.into());
    }

    pub fn record_unchanged(&mut self, path: impl Into<PathBuf>) {
        self.unchanged.push(path.into());
    }

    pub fn record_failure(&mut self, path: &Path, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::warn!("patch skipped {}: {}", path.display(), detail);
        self.failures.push(PatchFailure {
            path: path.to_path_buf(),
            detail,
        });
    }

    /// Fold another pass's outcomes into this one.
    pub fn merge(&mut self, other: PatchReport) {
        self.changed.extend(other.changed);
        self.unchanged.extend(other.unchanged);
        self.failures.extend(other.failures);
    }

    /// True when no file failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
