pub mod publish;
pub mod render;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use cgdevx_core::{profile, types::Profile, Workspace};
use cgdevx_render::PatchReport;

/// Resolve the profile from an explicit path or `~/.cgdevx/profile.yaml`.
pub(crate) fn load_profile(path: Option<&PathBuf>) -> Result<Profile> {
    match path {
        Some(path) => profile::load_at(path)
            .with_context(|| format!("failed to load profile '{}'", path.display())),
        None => profile::load().context("failed to load ~/.cgdevx/profile.yaml"),
    }
}

/// Resolve the workspace from an explicit root or `~/.cgdevx`.
pub(crate) fn resolve_workspace(root: Option<&PathBuf>) -> Result<Workspace> {
    match root {
        Some(root) => Ok(Workspace::at(root)),
        None => {
            let home = dirs::home_dir().context("could not determine home directory")?;
            Ok(Workspace::under_home(&home))
        }
    }
}

/// Print one patch pass summary, surfacing per-file failures as warnings.
pub(crate) fn print_patch_report(label: &str, report: &PatchReport) {
    println!(
        "  {} {} ({} patched, {} unchanged)",
        "·".dimmed(),
        label,
        report.changed.len(),
        report.unchanged.len()
    );
    for failure in &report.failures {
        println!(
            "  {} skipped {}: {}",
            "!".yellow(),
            failure.path.display(),
            failure.detail
        );
    }
}
