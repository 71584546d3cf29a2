//! Error types for cgdevx-publish.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from the publish protocol.
#[derive(Debug, Error)]
pub enum PublishError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The git binary could not be spawned at all.
    #[error("failed to spawn git: {0}")]
    Spawn(#[source] std::io::Error),

    /// A git command failed for a reason other than branch protection.
    /// Carries the remote's error text verbatim.
    #[error("git {context} failed: {stderr}")]
    GitProtocol { context: String, stderr: String },

    /// The pull-request API transport failed or returned an error status
    /// the protocol does not recover from.
    #[error("pull request API call failed: {0}")]
    Api(#[source] Box<ureq::Error>),

    /// The pull-request API answered with a payload that does not decode.
    #[error("pull request API returned an unexpected payload: {0}")]
    ApiPayload(#[source] std::io::Error),

    /// Creation reported an existing pull request, but none was found open
    /// for the side branch.
    #[error("no open pull request found for head branch {head}")]
    PullRequestNotFound { head: String },
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
