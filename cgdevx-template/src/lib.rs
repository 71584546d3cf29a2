//! # cgdevx-template
//!
//! Template acquisition and structural layout.
//!
//! Call [`acquire`] to fetch the pinned template branch into the workspace
//! scratch tree (or copy a local source tree in development mode), then
//! [`build_layout`] to reshape the scratch tree into the rendered-repository
//! layout.

pub mod acquire;
pub mod error;
pub mod layout;

pub use acquire::{acquire, check_branch_exists, NoProgress, Progress};
pub use error::TemplateError;
pub use layout::build_layout;
