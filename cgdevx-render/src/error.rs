//! Error types for cgdevx-render.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from parametrization.
///
/// The patch passes do not use this type; they are best-effort and report
/// per-file failures through [`crate::PatchReport`] instead.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`RenderError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
