//! Schema compatibility patcher — repair known template/provider drift.
//!
//! Older template revisions emit `push_restrictions = var.push_restrictions`
//! as a direct argument on the branch-protection resource; the pinned
//! provider version requires the `restrict_pushes { push_allowances = ... }`
//! block form instead. This pass deletes the legacy argument, inserts the
//! block form when absent, and backfills the module's variable declaration.
//!
//! Targeted rules only. This is expected to grow new entries as template
//! revisions drift, not to generalize into a schema migrator. Best-effort:
//! failures land in the [`PatchReport`] and never abort the pipeline.

use std::path::Path;

use crate::report::PatchReport;
use crate::write::write_if_changed;

const LEGACY_ATTRIBUTE: &str = "push_restrictions";
const LEGACY_VALUE: &str = "var.push_restrictions";
const BLOCK_NAME: &str = "restrict_pushes";
/// Stable sibling attribute the block is anchored after.
const ANCHOR_ATTRIBUTE: &str = "enforce_admins";

const VARIABLE_DECLARATION: &str = r#"variable "push_restrictions" {
  description = "Actors allowed to push to the protected branch"
  type        = list(string)
  default     = []
}
"#;

/// Migrate the vcs module's branch-protection schema to the block form.
///
/// Idempotent: when the block form and the variable declaration are already
/// present and the legacy argument is gone, nothing is rewritten.
pub fn patch_branch_protection_schema(tf_root: &Path) -> PatchReport {
    let mut report = PatchReport::default();

    let module_dir = tf_root.join("vcs");
    if !module_dir.is_dir() {
        tracing::debug!("no vcs module under {}; nothing to migrate", tf_root.display());
        return report;
    }

    let main_tf = module_dir.join("main.tf");
    patch_resource_file(&main_tf, &mut report);

    // Backfill the declaration only when the resource actually references
    // the variable (either migrated or still carrying the legacy argument).
    let uses_variable = std::fs::read_to_string(&main_tf)
        .map(|content| content.contains(LEGACY_VALUE))
        .unwrap_or(false);
    if uses_variable {
        ensure_variable_declaration(&module_dir.join("variables.tf"), &mut report);
    }

    report
}

// ---------------------------------------------------------------------------
// Resource file
// ---------------------------------------------------------------------------

fn patch_resource_file(path: &Path, report: &mut PatchReport) {
    if !path.is_file() {
        return;
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            report.record_failure(path, e.to_string());
            return;
        }
    };

    let updated = match migrate_push_restrictions(&raw) {
        Ok(updated) => updated,
        Err(detail) => {
            report.record_failure(path, detail);
            return;
        }
    };

    match write_if_changed(path, &raw, &updated) {
        Ok(true) => report.record_changed(path),
        Ok(false) => report.record_unchanged(path),
        Err(e) => report.record_failure(path, e.to_string()),
    }
}

/// Drop the legacy argument and insert the block form after the anchor line.
///
/// A file with neither the legacy argument nor the anchor has no
/// branch-protection resource to migrate and passes through untouched.
fn migrate_push_restrictions(raw: &str) -> Result<String, String> {
    let mut had_legacy = false;
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let stripped = line.trim();
        if stripped.starts_with(LEGACY_ATTRIBUTE) && stripped.contains(LEGACY_VALUE) {
            had_legacy = true;
            continue;
        }
        lines.push(line.to_string());
    }

    if !raw.contains(BLOCK_NAME) {
        let anchor = lines
            .iter()
            .position(|l| l.trim_start().starts_with(ANCHOR_ATTRIBUTE));
        match anchor {
            Some(anchor) => {
                let indent = leading_whitespace(&lines[anchor]).to_string();
                let block = restrict_pushes_block(&indent);
                for (offset, block_line) in block.into_iter().enumerate() {
                    lines.insert(anchor + 1 + offset, block_line);
                }
            }
            None if had_legacy => {
                // The argument was dropped but the block has nowhere to go;
                // leave the file as it was rather than half-migrating it.
                return Err(format!(
                    "no `{ANCHOR_ATTRIBUTE}` anchor line to attach `{BLOCK_NAME}` to"
                ));
            }
            None => return Ok(raw.to_string()),
        }
    }

    let mut result = lines.join("\n");
    if raw.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

/// The block is guarded so it only materializes when the list is non-empty.
fn restrict_pushes_block(indent: &str) -> Vec<String> {
    vec![
        format!("{indent}dynamic \"restrict_pushes\" {{"),
        format!("{indent}  for_each = length(var.push_restrictions) > 0 ? [true] : []"),
        format!("{indent}  content {{"),
        format!("{indent}    push_allowances = var.push_restrictions"),
        format!("{indent}  }}"),
        format!("{indent}}}"),
    ]
}

// ---------------------------------------------------------------------------
// Variable declaration
// ---------------------------------------------------------------------------

fn ensure_variable_declaration(path: &Path, report: &mut PatchReport) {
    let raw = if path.is_file() {
        match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                report.record_failure(path, e.to_string());
                return;
            }
        }
    } else {
        String::new()
    };

    if raw.contains("variable \"push_restrictions\"") {
        report.record_unchanged(path);
        return;
    }

    let mut updated = raw.clone();
    if !updated.is_empty() && !updated.ends_with("\n\n") {
        if !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push('\n');
    }
    updated.push_str(VARIABLE_DECLARATION);

    match write_if_changed(path, &raw, &updated) {
        Ok(true) => report.record_changed(path),
        Ok(false) => report.record_unchanged(path),
        Err(e) => report.record_failure(path, e.to_string()),
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const LEGACY_MAIN_TF: &str = r#"resource "github_branch_protection" "main" {
  repository_id = github_repository.gitops.node_id
  pattern       = "main"

  enforce_admins          = false
  push_restrictions       = var.push_restrictions
  require_signed_commits  = false
}
"#;

    fn seed_module(tmp: &TempDir, main_tf: &str) -> std::path::PathBuf {
        let vcs = tmp.path().join("vcs");
        fs::create_dir_all(&vcs).unwrap();
        fs::write(vcs.join("main.tf"), main_tf).unwrap();
        fs::write(vcs.join("variables.tf"), "variable \"repo_name\" {\n  type = string\n}\n")
            .unwrap();
        vcs
    }

    #[test]
    fn legacy_argument_is_replaced_by_block_form() {
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(&tmp, LEGACY_MAIN_TF);

        let report = patch_branch_protection_schema(tmp.path());
        assert!(report.is_clean());

        let out = fs::read_to_string(vcs.join("main.tf")).unwrap();
        assert!(!out.contains("push_restrictions       = var.push_restrictions"));
        assert!(out.contains("dynamic \"restrict_pushes\" {"));
        assert!(out.contains("push_allowances = var.push_restrictions"));
        assert!(
            out.contains("length(var.push_restrictions) > 0"),
            "block must be guarded on a non-empty list"
        );
    }

    #[test]
    fn block_is_anchored_after_enforce_admins_at_its_indentation() {
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(&tmp, LEGACY_MAIN_TF);

        patch_branch_protection_schema(tmp.path());

        let out = fs::read_to_string(vcs.join("main.tf")).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        let anchor = lines
            .iter()
            .position(|l| l.trim_start().starts_with("enforce_admins"))
            .unwrap();
        assert_eq!(lines[anchor + 1], "  dynamic \"restrict_pushes\" {");
    }

    #[test]
    fn variable_declaration_is_backfilled() {
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(&tmp, LEGACY_MAIN_TF);

        patch_branch_protection_schema(tmp.path());

        let vars = fs::read_to_string(vcs.join("variables.tf")).unwrap();
        assert!(vars.contains("variable \"repo_name\""), "existing declarations kept");
        assert!(vars.contains("variable \"push_restrictions\""));
        assert!(vars.contains("default     = []"));
    }

    #[test]
    fn second_pass_is_noop() {
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(&tmp, LEGACY_MAIN_TF);

        patch_branch_protection_schema(tmp.path());
        let main_once = fs::read_to_string(vcs.join("main.tf")).unwrap();
        let vars_once = fs::read_to_string(vcs.join("variables.tf")).unwrap();

        let second = patch_branch_protection_schema(tmp.path());
        assert!(second.changed.is_empty(), "second pass must change nothing");
        assert_eq!(fs::read_to_string(vcs.join("main.tf")).unwrap(), main_once);
        assert_eq!(fs::read_to_string(vcs.join("variables.tf")).unwrap(), vars_once);
    }

    #[test]
    fn already_migrated_file_is_untouched() {
        let migrated = migrate_push_restrictions(LEGACY_MAIN_TF).unwrap();
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(&tmp, &migrated);

        let report = patch_branch_protection_schema(tmp.path());
        assert!(report.changed.iter().all(|p| !p.ends_with("main.tf")));
    }

    #[test]
    fn missing_anchor_is_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let vcs = seed_module(
            &tmp,
            "resource \"github_branch_protection\" \"main\" {\n  push_restrictions = var.push_restrictions\n}\n",
        );

        let report = patch_branch_protection_schema(tmp.path());

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].detail.contains("enforce_admins"));
        let out = fs::read_to_string(vcs.join("main.tf")).unwrap();
        assert!(
            out.contains("push_restrictions = var.push_restrictions"),
            "failed file must be left unmodified"
        );
    }

    #[test]
    fn missing_vcs_module_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let report = patch_branch_protection_schema(tmp.path());
        assert_eq!(report, PatchReport::default());
    }

    #[test]
    fn module_without_branch_protection_resource_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let vcs = tmp.path().join("vcs");
        fs::create_dir_all(&vcs).unwrap();
        let plain = "resource \"github_repository\" \"gitops\" {\n  name = \"gitops\"\n}\n";
        fs::write(vcs.join("main.tf"), plain).unwrap();

        let report = patch_branch_protection_schema(tmp.path());

        assert!(report.is_clean());
        assert!(report.changed.is_empty());
        assert_eq!(fs::read_to_string(vcs.join("main.tf")).unwrap(), plain);
        assert!(!vcs.join("variables.tf").exists(), "no declaration to backfill");
    }

    #[test]
    fn variables_file_is_created_when_absent() {
        let tmp = TempDir::new().unwrap();
        let vcs = tmp.path().join("vcs");
        fs::create_dir_all(&vcs).unwrap();
        fs::write(vcs.join("main.tf"), LEGACY_MAIN_TF).unwrap();

        patch_branch_protection_schema(tmp.path());

        let vars = fs::read_to_string(vcs.join("variables.tf")).unwrap();
        assert!(vars.contains("variable \"push_restrictions\""));
    }
}
