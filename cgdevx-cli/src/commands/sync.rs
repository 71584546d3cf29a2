//! `cgdevx sync` — render then publish, end to end.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{load_profile, publish::publish_tree, render::render_tree, resolve_workspace};

/// Arguments for `cgdevx sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Profile path (defaults to ~/.cgdevx/profile.yaml).
    #[arg(long, short = 'p')]
    pub profile: Option<PathBuf>,

    /// Workspace root (defaults to ~/.cgdevx).
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Render, stage, and report without committing or pushing.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let profile = load_profile(self.profile.as_ref())?;
        let workspace = resolve_workspace(self.workspace.as_ref())?;

        render_tree(&profile, &workspace)?;
        publish_tree(&profile, &workspace, self.dry_run)
    }
}
