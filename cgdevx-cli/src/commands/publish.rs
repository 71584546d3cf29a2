//! `cgdevx publish` — push the rendered tree to the output remote.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use cgdevx_core::{types::Profile, Workspace};
use cgdevx_publish::{publish, PublishOutcome, PullRequestApi};

use super::{load_profile, resolve_workspace};

/// Arguments for `cgdevx publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Profile path (defaults to ~/.cgdevx/profile.yaml).
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Workspace root (defaults to ~/.cgdevx).
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Stop after staging and show what would be committed.
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishArgs {
    pub fn run(self) -> Result<()> {
        let profile = load_profile(self.profile.as_ref())?;
        let workspace = resolve_workspace(self.workspace.as_ref())?;
        publish_tree(&profile, &workspace, self.dry_run)
    }
}

/// Run the publish protocol and report the outcome. Shared with `cgdevx sync`.
pub(crate) fn publish_tree(profile: &Profile, workspace: &Workspace, dry_run: bool) -> Result<()> {
    let rendered = workspace.gitops_dir();
    if !rendered.is_dir() {
        bail!(
            "no rendered tree at {} — run `cgdevx render` first",
            rendered.display()
        );
    }

    let api = profile
        .api
        .as_ref()
        .map(|settings| PullRequestApi::new(settings, &profile.remote));

    let outcome = publish(
        &profile.remote,
        &profile.identity,
        api.as_ref(),
        &rendered,
        workspace,
        dry_run,
    )
    .context("publish failed")?;

    match outcome {
        PublishOutcome::NoChange => {
            println!("{} '{}' is already up to date", "✓".green(), profile.remote.repo);
        }
        PublishOutcome::WouldPublish { staged } => {
            println!("{} would commit {} path(s):", "~".dimmed(), staged.len());
            for line in staged {
                println!("  ~  {line}");
            }
        }
        PublishOutcome::DirectPush { branch } => {
            println!("{} pushed {}", "✓".green(), branch);
        }
        PublishOutcome::SideBranchPushed { branch } => {
            println!(
                "{} branch protection blocked the direct push; changes are on '{}' — open a pull request to merge them",
                "!".yellow(),
                branch
            );
        }
        PublishOutcome::PullRequestMerged { pr } => {
            println!("{} pull request #{} merged", "✓".green(), pr.number);
        }
        PublishOutcome::PullRequestPending { pr } => {
            let reference = pr
                .html_url
                .clone()
                .unwrap_or_else(|| format!("#{}", pr.number));
            println!(
                "{} pull request {} is open but not mergeable yet — approvals or checks are outstanding",
                "!".yellow(),
                reference
            );
        }
    }
    Ok(())
}
