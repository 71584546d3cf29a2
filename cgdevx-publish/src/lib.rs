//! # cgdevx-publish
//!
//! Branch-protection-aware publish protocol.
//!
//! Call [`publish`] to commit the rendered tree onto the remote default
//! branch. A clean fast-forward push is the happy path; a protection
//! rejection falls back to a uniquely named side branch plus a pull request,
//! optionally auto-merged. The default branch is never force-pushed.

pub mod api;
pub mod engine;
pub mod error;
pub mod git;

pub use api::{CreateOutcome, MergeOutcome, PullRequest, PullRequestApi};
pub use engine::{publish, PublishOutcome, COMMIT_MESSAGE, GENERATED_BRANCH_PREFIX};
pub use error::PublishError;
pub use git::{classify_push_rejection, GitRunner, PushRejection};
