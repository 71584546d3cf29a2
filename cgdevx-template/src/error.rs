//! Error types for cgdevx-template.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template acquisition and layout.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template remote or the pinned branch could not be fetched.
    #[error("template source unavailable ({url} @ {branch}): {detail}")]
    SourceUnavailable {
        url: String,
        branch: String,
        detail: String,
    },

    /// The scratch tree is missing a directory the layout requires.
    #[error("template tree is missing expected subtree {path}")]
    MissingSubtree { path: PathBuf },
}

/// Convenience constructor for [`TemplateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TemplateError {
    TemplateError::Io {
        path: path.into(),
        source,
    }
}
