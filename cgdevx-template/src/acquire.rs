//! Template acquisition — clone the pinned branch into the scratch tree.
//!
//! The previous rendered repository is wiped first; a run always starts from
//! a clean workspace. In development mode ([`AcquireMode::CopyLocal`]) a
//! local source tree is copied instead of cloning.

use std::path::Path;
use std::process::Command;

use cgdevx_core::types::{AcquireMode, TemplateSource};
use cgdevx_core::Workspace;

use crate::error::{io_err, TemplateError};
use crate::layout::copy_tree;

// ---------------------------------------------------------------------------
// Progress hook
// ---------------------------------------------------------------------------

/// Best-effort progress callback around the network fetch.
///
/// The default implementation discards updates; callers that want a progress
/// bar implement [`Progress::update`].
pub trait Progress {
    fn update(&self, _message: &str) {}
}

/// The no-op hook used when no progress reporting is wanted.
pub struct NoProgress;

impl Progress for NoProgress {}

// ---------------------------------------------------------------------------
// Acquire
// ---------------------------------------------------------------------------

/// Fetch the template into the workspace scratch tree.
///
/// Wipes any previous rendered repository first. Clone failures are fatal
/// ([`TemplateError::SourceUnavailable`] with the git stderr).
pub fn acquire(
    source: &TemplateSource,
    mode: &AcquireMode,
    workspace: &Workspace,
    progress: &dyn Progress,
) -> Result<(), TemplateError> {
    let gitops = workspace.gitops_dir();
    if gitops.exists() {
        std::fs::remove_dir_all(&gitops).map_err(|e| io_err(&gitops, e))?;
    }

    let scratch = workspace.scratch_dir();

    match mode {
        AcquireMode::CopyLocal(src) => {
            tracing::info!("copying local template tree {}", src.display());
            copy_tree(src, &scratch)?;
        }
        AcquireMode::Clone => {
            std::fs::create_dir_all(&gitops).map_err(|e| io_err(&gitops, e))?;
            progress.update("cloning template");
            clone_branch(source, &scratch)?;
            progress.update("template ready");
        }
    }
    Ok(())
}

fn clone_branch(source: &TemplateSource, dest: &Path) -> Result<(), TemplateError> {
    let output = Command::new("git")
        .arg("clone")
        .arg("--branch")
        .arg(&source.branch)
        .arg("--single-branch")
        .arg("--depth")
        .arg("1")
        .arg(&source.url)
        .arg(dest)
        .output()
        .map_err(|e| TemplateError::SourceUnavailable {
            url: source.url.clone(),
            branch: source.branch.clone(),
            detail: format!("failed to run git: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TemplateError::SourceUnavailable {
            url: source.url.clone(),
            branch: source.branch.clone(),
            detail: stderr.trim().to_string(),
        });
    }
    tracing::info!("cloned {} @ {}", source.url, source.branch);
    Ok(())
}

// ---------------------------------------------------------------------------
// Branch existence probe
// ---------------------------------------------------------------------------

/// Check whether the pinned branch exists on the template remote.
///
/// Probes `GET {api}/repos/{owner}/{repo}/branches/{branch}` for GitHub-hosted
/// templates. Returns `Ok(false)` on 404 and `Ok(true)` on success; other
/// HTTP failures surface as [`TemplateError::SourceUnavailable`]. Non-GitHub
/// URLs are not probeable and report `SourceUnavailable`.
pub fn check_branch_exists(
    source: &TemplateSource,
    token: Option<&str>,
) -> Result<bool, TemplateError> {
    let url = branch_probe_url("https://api.github.com", &source.url, &source.branch).ok_or_else(
        || TemplateError::SourceUnavailable {
            url: source.url.clone(),
            branch: source.branch.clone(),
            detail: "cannot derive an API URL from the template URL".to_string(),
        },
    )?;

    let mut request = ureq::get(&url);
    if let Some(token) = token {
        request = request.set("Authorization", &format!("token {token}"));
    }

    match request.call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::Status(404, _)) => Ok(false),
        Err(e) => Err(TemplateError::SourceUnavailable {
            url: source.url.clone(),
            branch: source.branch.clone(),
            detail: e.to_string(),
        }),
    }
}

/// `https://github.com/{owner}/{repo}[.git]` → branch probe endpoint.
fn branch_probe_url(api_base: &str, repo_url: &str, branch: &str) -> Option<String> {
    let rest = repo_url
        .strip_prefix("https://github.com/")
        .or_else(|| repo_url.strip_prefix("git@github.com:"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some(format!("{api_base}/repos/{owner}/{repo}/branches/{branch}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn template_source(url: &str) -> TemplateSource {
        TemplateSource {
            url: url.to_string(),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn copy_local_populates_scratch() {
        let src = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("platform/terraform/vcs")).unwrap();
        fs::write(src.path().join("platform/terraform/vcs/main.tf"), "# tf\n").unwrap();

        let root = TempDir::new().unwrap();
        let ws = Workspace::at(root.path());
        acquire(
            &template_source("https://github.com/acme/tpl.git"),
            &AcquireMode::CopyLocal(src.path().to_path_buf()),
            &ws,
            &NoProgress,
        )
        .expect("acquire");

        assert!(ws
            .scratch_dir()
            .join("platform/terraform/vcs/main.tf")
            .exists());
    }

    #[test]
    fn acquire_wipes_previous_output_tree() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("marker"), "new").unwrap();

        let root = TempDir::new().unwrap();
        let ws = Workspace::at(root.path());
        let stale = ws.gitops_dir().join("stale.tf");
        fs::create_dir_all(ws.gitops_dir()).unwrap();
        fs::write(&stale, "old").unwrap();

        acquire(
            &template_source("https://github.com/acme/tpl.git"),
            &AcquireMode::CopyLocal(src.path().to_path_buf()),
            &ws,
            &NoProgress,
        )
        .expect("acquire");

        assert!(!stale.exists(), "previous rendered tree must be wiped");
        assert!(ws.scratch_dir().join("marker").exists());
    }

    #[test]
    fn clone_of_unreachable_source_is_source_unavailable() {
        let root = TempDir::new().unwrap();
        let ws = Workspace::at(root.path());
        let missing = root.path().join("no-such-repo");

        let err = acquire(
            &template_source(missing.to_str().unwrap()),
            &AcquireMode::Clone,
            &ws,
            &NoProgress,
        )
        .expect_err("clone should fail");
        assert!(matches!(err, TemplateError::SourceUnavailable { .. }));
    }

    #[test]
    fn probe_url_from_https_and_ssh_forms() {
        let https = branch_probe_url(
            "https://api.github.com",
            "https://github.com/acme/tpl.git",
            "v1",
        );
        assert_eq!(
            https.as_deref(),
            Some("https://api.github.com/repos/acme/tpl/branches/v1")
        );

        let ssh = branch_probe_url("https://api.github.com", "git@github.com:acme/tpl.git", "v1");
        assert_eq!(ssh, https);

        assert!(branch_probe_url("https://api.github.com", "https://example.com/x.git", "v1").is_none());
    }
}
