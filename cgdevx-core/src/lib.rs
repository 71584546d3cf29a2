//! CG DevX core library — domain types, profile persistence, workspace paths.
//!
//! Public API surface:
//! - [`types`] — substitution tables and run configuration structs
//! - [`error`] — [`ProfileError`]
//! - [`profile`] — profile load
//! - [`workspace`] — [`Workspace`] path handle

pub mod error;
pub mod profile;
pub mod types;
pub mod workspace;

pub use error::ProfileError;
pub use types::{
    AcquireMode, ApiSettings, GitIdentity, Profile, RemoteTarget, SubstitutionTable,
    TemplateSource,
};
pub use workspace::Workspace;
