//! Profile persistence — the YAML run configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.cgdevx/
//!   profile.yaml   (run configuration — template source, remote, tables)
//!   gitops/        (rendered repository, rebuilt every run)
//!   push/          (publish clone workspace)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(path: &Path)` — explicit path; used in tests with `TempDir`
//! - `fn()` — derives the path from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use crate::error::ProfileError;
use crate::types::Profile;

/// `<home>/.cgdevx/profile.yaml` — pure, no I/O.
pub fn profile_path_at(home: &Path) -> PathBuf {
    home.join(".cgdevx").join("profile.yaml")
}

/// Load the profile from an explicit file path.
///
/// Returns `ProfileError::ProfileNotFound` if absent,
/// `ProfileError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<Profile, ProfileError> {
    if !path.exists() {
        return Err(ProfileError::ProfileNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ProfileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `load_at` convenience wrapper using `~/.cgdevx/profile.yaml`.
pub fn load() -> Result<Profile, ProfileError> {
    let home = dirs::home_dir().ok_or(ProfileError::HomeNotFound)?;
    load_at(&profile_path_at(&home))
}
