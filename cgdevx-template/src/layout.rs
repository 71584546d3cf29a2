//! Structural builder — reshape the scratch tree into the rendered layout.
//!
//! The template repository keeps its deliverable under `platform/`:
//! the infra subtree (`terraform/`), the pipeline subtree
//! (`gitops-pipelines/`) and a handful of root-level files. Everything else
//! in the checkout is development scaffolding and is discarded.
//!
//! Documentation handling: only files named `tpl_*.md` survive, and they are
//! renamed with the marker prefix stripped.

use std::path::Path;

use walkdir::WalkDir;

use cgdevx_core::Workspace;

use crate::error::{io_err, TemplateError};

/// Entry names that are development artifacts, never part of the output.
const SCRUB_NAMES: &[&str] = &[".DS_Store", ".terraform", ".github", ".idea"];

/// Documentation files carry this marker prefix in the template.
const DOC_MARKER_PREFIX: &str = "tpl_";

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Reshape the scratch tree into the final repository layout.
///
/// Any filesystem error is fatal; there is no partial-render recovery within
/// a run (the next invocation wipes and restarts cleanly).
pub fn build_layout(workspace: &Workspace) -> Result<(), TemplateError> {
    let scratch = workspace.scratch_dir();
    let gitops = workspace.gitops_dir();

    scrub_dev_artifacts(&scratch)?;

    let platform = scratch.join("platform");
    if !platform.is_dir() {
        return Err(TemplateError::MissingSubtree { path: platform });
    }

    copy_tree(&platform.join("terraform"), &workspace.terraform_dir())?;
    copy_tree(&platform.join("gitops-pipelines"), &workspace.pipelines_dir())?;
    copy_top_level_files(&platform, &gitops)?;

    prune_and_rename_docs(&gitops)?;

    std::fs::remove_dir_all(&scratch).map_err(|e| io_err(&scratch, e))?;
    tracing::info!("built repository layout at {}", gitops.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Scrub
// ---------------------------------------------------------------------------

/// Remove editor metadata and VCS-tool caches from the scratch tree.
fn scrub_dev_artifacts(root: &Path) -> Result<(), TemplateError> {
    let mut it = WalkDir::new(root).into_iter();
    while let Some(entry) = it.next() {
        let entry = entry.map_err(walk_err)?;
        let name = entry.file_name().to_string_lossy();
        if !SCRUB_NAMES.contains(&name.as_ref()) {
            continue;
        }
        let path = entry.path();
        if entry.file_type().is_dir() {
            std::fs::remove_dir_all(path).map_err(|e| io_err(path, e))?;
            it.skip_current_dir();
        } else {
            std::fs::remove_file(path).map_err(|e| io_err(path, e))?;
        }
        tracing::debug!("scrubbed {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Copy helpers
// ---------------------------------------------------------------------------

/// Recursively copy `src` into `dest`, creating `dest` and parents.
pub(crate) fn copy_tree(src: &Path, dest: &Path) -> Result<(), TemplateError> {
    if !src.is_dir() {
        return Err(TemplateError::MissingSubtree {
            path: src.to_path_buf(),
        });
    }
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(walk_err)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        let target = dest.join(rel);
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

/// Copy the immediate files of `src` (not subdirectories) into `dest`.
fn copy_top_level_files(src: &Path, dest: &Path) -> Result<(), TemplateError> {
    std::fs::create_dir_all(dest).map_err(|e| io_err(dest, e))?;
    let entries = std::fs::read_dir(src).map_err(|e| io_err(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(src, e))?;
        let path = entry.path();
        if path.is_file() {
            let target = dest.join(entry.file_name());
            std::fs::copy(&path, &target).map_err(|e| io_err(&target, e))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Documentation pass
// ---------------------------------------------------------------------------

/// Drop non-template documentation and strip the marker prefix from the rest.
fn prune_and_rename_docs(root: &Path) -> Result<(), TemplateError> {
    let mut to_remove = Vec::new();
    let mut to_rename = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(walk_err)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".md") {
            continue;
        }
        if let Some(stripped) = name.strip_prefix(DOC_MARKER_PREFIX) {
            let renamed = entry.path().with_file_name(stripped.to_string());
            to_rename.push((entry.path().to_path_buf(), renamed));
        } else {
            to_remove.push(entry.path().to_path_buf());
        }
    }

    for path in to_remove {
        std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!("dropped doc {}", path.display());
    }
    for (from, to) in to_rename {
        std::fs::rename(&from, &to).map_err(|e| io_err(&to, e))?;
        tracing::debug!("renamed doc {} -> {}", from.display(), to.display());
    }
    Ok(())
}

fn walk_err(err: walkdir::Error) -> TemplateError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    match err.into_io_error() {
        Some(io) => io_err(path, io),
        None => io_err(path, std::io::Error::other("walk error")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
