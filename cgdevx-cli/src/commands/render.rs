//! `cgdevx render` — fetch, lay out, parametrize, and patch the tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use cgdevx_core::{
    types::{AcquireMode, Profile},
    Workspace,
};
use cgdevx_render::{
    parametrize, patch_backend_buckets, patch_branch_protection_schema, ParametrizeSummary,
};
use cgdevx_template::{acquire, build_layout, check_branch_exists, NoProgress};

use super::{load_profile, print_patch_report, resolve_workspace};

/// Arguments for `cgdevx render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Profile path (defaults to ~/.cgdevx/profile.yaml).
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Workspace root (defaults to ~/.cgdevx).
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let profile = load_profile(self.profile.as_ref())?;
        let workspace = resolve_workspace(self.workspace.as_ref())?;
        render_tree(&profile, &workspace)?;
        Ok(())
    }
}

/// Run the render pipeline: acquire → layout → parametrize → patch.
///
/// Shared with `cgdevx sync`.
pub(crate) fn render_tree(profile: &Profile, workspace: &Workspace) -> Result<ParametrizeSummary> {
    let mode = profile.acquire_mode();

    // Probe the pinned branch before cloning; the probe itself is
    // best-effort (non-GitHub templates cannot be probed).
    if mode == AcquireMode::Clone {
        let token = profile.api.as_ref().map(|api| api.token.as_str());
        match check_branch_exists(&profile.template, token) {
            Ok(false) => bail!(
                "template branch '{}' does not exist at {}",
                profile.template.branch,
                profile.template.url
            ),
            Ok(true) => {}
            Err(err) => println!("  {} branch probe skipped: {err}", "!".yellow()),
        }
    }

    acquire(&profile.template, &mode, workspace, &NoProgress)
        .context("failed to acquire template")?;

    build_layout(workspace).context("failed to build repository layout")?;

    let gitops = workspace.gitops_dir();
    let summary = parametrize(&gitops, &profile.fragments, &profile.parameters)
        .context("parametrization failed")?;

    let backend_report = patch_backend_buckets(&workspace.terraform_dir(), &profile.fragments);
    let schema_report = patch_branch_protection_schema(&workspace.terraform_dir());

    println!(
        "{} rendered '{}' ({} files substituted)",
        "✓".green(),
        gitops.display(),
        summary.rewritten.len()
    );
    print_patch_report("backend buckets", &backend_report);
    print_patch_report("provider schema", &schema_report);

    Ok(summary)
}
