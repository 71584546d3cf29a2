//! Child-process git transport and the push-rejection classifier.

use std::path::{Path, PathBuf};
use std::process::Command;

use cgdevx_core::types::GitIdentity;

use crate::error::PublishError;

// ---------------------------------------------------------------------------
// GitRunner
// ---------------------------------------------------------------------------

/// Captured result of one git command.
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs git commands in a fixed working directory with a fixed environment.
///
/// When an SSH key path is configured, all remote operations go through
/// `GIT_SSH_COMMAND` with host-key checking disabled — the remote is supplied
/// by the operator, not discovered.
#[derive(Debug, Clone)]
pub struct GitRunner {
    workdir: PathBuf,
    env: Vec<(String, String)>,
}

impl GitRunner {
    pub fn new(workdir: impl Into<PathBuf>, ssh_key: Option<&Path>) -> Self {
        let mut env = Vec::new();
        if let Some(key) = ssh_key {
            env.push((
                "GIT_SSH_COMMAND".to_string(),
                format!("ssh -o StrictHostKeyChecking=no -i {}", key.display()),
            ));
        }
        Self {
            workdir: workdir.into(),
            env,
        }
    }

    /// Fix the author and committer identity for subsequent commits.
    pub fn with_identity(mut self, identity: &GitIdentity) -> Self {
        for var in ["GIT_AUTHOR_NAME", "GIT_COMMITTER_NAME"] {
            self.env.push((var.to_string(), identity.author_name.clone()));
        }
        for var in ["GIT_AUTHOR_EMAIL", "GIT_COMMITTER_EMAIL"] {
            self.env.push((var.to_string(), identity.author_email.clone()));
        }
        self
    }

    /// Run a git command, capturing exit status and both streams.
    pub fn run_capturing(&self, args: &[&str]) -> Result<GitOutput, PublishError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(PublishError::Spawn)?;

        let result = GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            "git {} -> {}",
            args.join(" "),
            if result.success { "ok" } else { "failed" }
        );
        Ok(result)
    }

    /// Run a git command; a non-zero exit is a fatal protocol error carrying
    /// the remote stderr.
    pub fn run(&self, args: &[&str]) -> Result<String, PublishError> {
        let output = self.run_capturing(args)?;
        if !output.success {
            return Err(PublishError::GitProtocol {
                context: args.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

// ---------------------------------------------------------------------------
// Rejection classifier
// ---------------------------------------------------------------------------

/// Typed outcome of a rejected push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushRejection {
    /// The remote refused the push because the branch is protected.
    Protected,
    /// Anything else — treated as a fatal git protocol error.
    Other,
}

/// Phrasings the known providers emit when branch protection blocks a push.
/// Provider/version specific; a heuristic, expected to gain entries over time.
const PROTECTED_PHRASES: &[&str] = &[
    "Protected branch update failed",
    "protected branch hook declined",
    "GH006",
];

/// Map raw push stderr to a typed rejection.
pub fn classify_push_rejection(stderr: &str) -> PushRejection {
    if PROTECTED_PHRASES.iter().any(|p| stderr.contains(p)) {
        PushRejection::Protected
    } else {
        PushRejection::Other
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
