//! # cgdevx-render
//!
//! Token parametrization and structural patching of the rendered tree.
//!
//! Call [`parametrize`] to substitute fragment and parameter placeholders
//! (fail-fast), then [`patch_backend_buckets`] and
//! [`patch_branch_protection_schema`] for the best-effort structural repairs.
//! The patch passes return a [`PatchReport`] instead of aborting on
//! individual bad files.

pub mod backend;
pub mod error;
pub mod parametrize;
pub mod report;
pub mod schema;

mod write;

pub use backend::patch_backend_buckets;
pub use error::RenderError;
pub use parametrize::{parametrize, ParametrizeSummary};
pub use report::{PatchFailure, PatchReport};
pub use schema::patch_branch_protection_schema;
