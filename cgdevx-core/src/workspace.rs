//! Workspace path handle.
//!
//! Every pipeline stage receives an explicit [`Workspace`] rather than
//! resolving a shared global directory. The workspace is exclusive to one
//! run; concurrent invocations against the same root are unsupported.
//!
//! Lifecycle: the acquirer wipes `gitops/` (and with it the scratch tree) at
//! the start of each run, and the publish engine wipes `push/` before
//! cloning. Nothing here survives across runs except what the remote
//! repository already holds.

use std::path::{Path, PathBuf};

/// Explicit handle over the local working directories of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Workspace rooted at an explicit directory. Used by tests with `TempDir`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<home>/.cgdevx` — the conventional per-user workspace root.
    pub fn under_home(home: &Path) -> Self {
        Self::at(home.join(".cgdevx"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The rendered repository output tree.
    pub fn gitops_dir(&self) -> PathBuf {
        self.root.join("gitops")
    }

    /// Scratch tree holding the raw template checkout before layout.
    pub fn scratch_dir(&self) -> PathBuf {
        self.gitops_dir().join(".tmp")
    }

    /// Fresh clone used by the publish protocol (never the rendered tree itself).
    pub fn push_dir(&self) -> PathBuf {
        self.root.join("push")
    }

    /// Infra subtree of the rendered repository.
    pub fn terraform_dir(&self) -> PathBuf {
        self.gitops_dir().join("terraform")
    }

    /// Pipelines subtree of the rendered repository.
    pub fn pipelines_dir(&self) -> PathBuf {
        self.gitops_dir().join("gitops-pipelines")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_hang_off_root() {
        let ws = Workspace::at("/work/run");
        assert_eq!(ws.gitops_dir(), PathBuf::from("/work/run/gitops"));
        assert_eq!(ws.scratch_dir(), PathBuf::from("/work/run/gitops/.tmp"));
        assert_eq!(ws.push_dir(), PathBuf::from("/work/run/push"));
        assert_eq!(ws.terraform_dir(), PathBuf::from("/work/run/gitops/terraform"));
        assert_eq!(
            ws.pipelines_dir(),
            PathBuf::from("/work/run/gitops/gitops-pipelines")
        );
    }

    #[test]
    fn under_home_uses_dot_cgdevx() {
        let ws = Workspace::under_home(Path::new("/home/me"));
        assert_eq!(ws.root(), Path::new("/home/me/.cgdevx"));
    }
}
