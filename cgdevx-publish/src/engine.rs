//! The publish state machine.
//!
//! The rendered tree is never a git working copy itself — it shares no
//! history with the remote. Publishing always goes through a fresh clone of
//! the remote default branch: overlay the rendered content, stage, commit
//! only if anything changed, push plain (never forced), and on a protection
//! rejection fall back to a uniquely named side branch plus a pull request.

use std::path::Path;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use cgdevx_core::types::{GitIdentity, RemoteTarget};
use cgdevx_core::Workspace;

use crate::api::{CreateOutcome, MergeOutcome, PullRequest, PullRequestApi};
use crate::error::{io_err, PublishError};
use crate::git::{classify_push_rejection, GitRunner, PushRejection};

/// Conventional-commit message for every generated-tree commit.
pub const COMMIT_MESSAGE: &str = "chore: update generated gitops";

/// Side branches are named `cgdevx/generated/<UTC timestamp>`.
pub const GENERATED_BRANCH_PREFIX: &str = "cgdevx/generated/";

const PR_BODY: &str = "Automated update of the generated GitOps repository. \
Direct push to the default branch was rejected by branch protection; \
merge this pull request to apply the update.";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal state of one publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The rendered tree matches the branch head; no commit was created.
    NoChange,
    /// Dry-run: these paths would have been committed.
    WouldPublish { staged: Vec<String> },
    /// The default branch accepted a plain fast-forward push.
    DirectPush { branch: String },
    /// Protection rejected the push; the side branch holds the commit but no
    /// API access was configured to open a pull request.
    SideBranchPushed { branch: String },
    /// The fallback pull request was created (or reused) and squash-merged.
    PullRequestMerged { pr: PullRequest },
    /// The fallback pull request is open but the provider refused the merge.
    /// Actionable, not an error.
    PullRequestPending { pr: PullRequest },
}

// ---------------------------------------------------------------------------
// Publish
// ---------------------------------------------------------------------------

/// Publish the rendered tree to the remote default branch.
///
/// Any push failure not attributable to branch protection is fatal and
/// surfaces the remote's error text.
pub fn publish(
    remote: &RemoteTarget,
    identity: &GitIdentity,
    api: Option<&PullRequestApi>,
    rendered: &Path,
    workspace: &Workspace,
    dry_run: bool,
) -> Result<PublishOutcome, PublishError> {
    let push_dir = workspace.push_dir();
    if push_dir.exists() {
        std::fs::remove_dir_all(&push_dir).map_err(|e| io_err(&push_dir, e))?;
    }
    std::fs::create_dir_all(workspace.root()).map_err(|e| io_err(workspace.root(), e))?;

    let ssh_key = identity.ssh_key_path.as_deref();
    let push_dir_arg = push_dir.display().to_string();
    GitRunner::new(workspace.root(), ssh_key).run(&["clone", &remote.url, &push_dir_arg])?;

    let repo = GitRunner::new(&push_dir, ssh_key).with_identity(identity);
    let branch = remote.default_branch.as_str();

    // A just-provisioned remote has no branch yet; create it locally so the
    // first publish fast-forwards from nothing.
    let tracked = repo.run_capturing(&["checkout", "-B", branch, &format!("origin/{branch}")])?;
    if !tracked.success {
        repo.run(&["checkout", "-B", branch])?;
    }

    overlay(rendered, &push_dir)?;

    repo.run(&["add", "-A"])?;
    let status = repo.run(&["status", "--porcelain"])?;
    if status.trim().is_empty() {
        tracing::info!("rendered tree matches {branch}; nothing to publish");
        return Ok(PublishOutcome::NoChange);
    }

    if dry_run {
        let staged = status.lines().map(|l| l.trim().to_string()).collect();
        return Ok(PublishOutcome::WouldPublish { staged });
    }

    repo.run(&["commit", "-m", COMMIT_MESSAGE])?;

    let push = repo.run_capturing(&["push", "origin", branch])?;
    if push.success {
        tracing::info!("pushed {branch}");
        return Ok(PublishOutcome::DirectPush {
            branch: branch.to_string(),
        });
    }

    match classify_push_rejection(&push.stderr) {
        PushRejection::Other => Err(PublishError::GitProtocol {
            context: format!("push origin {branch}"),
            stderr: push.stderr.trim().to_string(),
        }),
        PushRejection::Protected => {
            tracing::warn!(
                "branch protection prevents direct push to {branch}; falling back to a pull request"
            );
            fallback_to_pull_request(&repo, remote, api, Utc::now())
        }
    }
}

// ---------------------------------------------------------------------------
// Pull-request fallback
// ---------------------------------------------------------------------------

fn generated_branch_name(now: DateTime<Utc>) -> String {
    format!("{GENERATED_BRANCH_PREFIX}{}", now.format("%Y%m%d%H%M%S"))
}

/// Push the commit to a fresh side branch and open (or reuse) a pull request.
fn fallback_to_pull_request(
    repo: &GitRunner,
    remote: &RemoteTarget,
    api: Option<&PullRequestApi>,
    now: DateTime<Utc>,
) -> Result<PublishOutcome, PublishError> {
    let base = remote.default_branch.as_str();
    let side = generated_branch_name(now);
    repo.run(&["push", "origin", &format!("HEAD:refs/heads/{side}")])?;
    tracing::info!("pushed side branch {side}");

    let Some(api) = api else {
        tracing::warn!(
            "no API access configured; open a pull request for {side} manually"
        );
        return Ok(PublishOutcome::SideBranchPushed { branch: side });
    };

    let pr = match api.create(&side, base, COMMIT_MESSAGE, PR_BODY)? {
        CreateOutcome::Created(pr) => pr,
        CreateOutcome::AlreadyExists => {
            tracing::info!("pull request for {side} already open; reusing it");
            api.find_open(&side, base)?
                .ok_or(PublishError::PullRequestNotFound { head: side.clone() })?
        }
    };

    match api.merge_squash(pr.number)? {
        MergeOutcome::Merged => Ok(PublishOutcome::PullRequestMerged { pr }),
        MergeOutcome::Refused(code) => {
            tracing::warn!(
                "merge of pull request #{} refused ({code}); left open for review",
                pr.number
            );
            Ok(PublishOutcome::PullRequestPending { pr })
        }
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// Make the clone's working tree identical to the rendered tree: wipe
/// everything except the version-control metadata, then copy the rendered
/// repository in.
fn overlay(rendered: &Path, clone: &Path) -> Result<(), PublishError> {
    let entries = std::fs::read_dir(clone).map_err(|e| io_err(clone, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(clone, e))?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type().map_err(|e| io_err(&path, e))?.is_dir() {
            std::fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
        } else {
            std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        }
    }

    for entry in WalkDir::new(rendered) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(rendered).to_path_buf();
            match e.into_io_error() {
                Some(io) => io_err(path, io),
                None => io_err(path, std::io::Error::other("walk error")),
            }
        })?;
        let rel = entry
            .path()
            .strip_prefix(rendered)
            .expect("walkdir yields paths under its root");
        let target = clone.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| io_err(&target, e))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
