//! Backend directive patcher — keep remote-state bucket references current.
//!
//! A previously rendered repository may carry a literal bucket name with no
//! placeholder left to substitute. This pass rewrites the `bucket` attribute
//! of each module's `backend "s3"` block to the bucket recorded in that
//! module's backend fragment, and injects the attribute when the block lacks
//! one entirely.
//!
//! Best-effort: a read/write error on one file is recorded in the
//! [`PatchReport`] and the pass moves on. It never aborts the pipeline.

use std::path::Path;

use walkdir::WalkDir;

use cgdevx_core::types::SubstitutionTable;

use crate::report::PatchReport;
use crate::write::write_if_changed;

/// Infra module directory → fragment key holding its canonical backend block.
const BACKEND_FRAGMENTS: &[(&str, &str)] = &[
    ("vcs", "# <TF_VCS_REMOTE_BACKEND>"),
    ("hosting_provider", "# <TF_HOSTING_REMOTE_BACKEND>"),
    ("secrets", "# <TF_SECRETS_REMOTE_BACKEND>"),
    ("users", "# <TF_USERS_REMOTE_BACKEND>"),
    ("core_services", "# <TF_CORE_SERVICES_REMOTE_BACKEND>"),
];

/// Rewrite every module's backend bucket to match its fragment.
///
/// Idempotent: an already-correct file produces a byte-identical result and
/// the write is skipped.
pub fn patch_backend_buckets(tf_root: &Path, fragments: &SubstitutionTable) -> PatchReport {
    let mut report = PatchReport::default();

    for (module, fragment_key) in BACKEND_FRAGMENTS {
        let module_dir = tf_root.join(module);
        if !module_dir.is_dir() {
            continue;
        }
        let Some(replacement) = fragments.get(fragment_key) else {
            continue;
        };
        let Some(bucket) = extract_bucket(replacement) else {
            tracing::debug!("fragment {fragment_key} carries no bucket attribute");
            continue;
        };

        patch_module(&module_dir, &bucket, &mut report);
    }

    report
}

fn patch_module(module_dir: &Path, bucket: &str, report: &mut PatchReport) {
    for entry in WalkDir::new(module_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(module_dir).to_path_buf();
                report.record_failure(&path, e.to_string());
                continue;
            }
        };
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|e| e.to_str()) != Some("tf")
        {
            continue;
        }

        let path = entry.path();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                report.record_failure(path, e.to_string());
                continue;
            }
        };

        let updated = rewrite_backend_bucket(&raw, bucket);
        match write_if_changed(path, &raw, &updated) {
            Ok(true) => report.record_changed(path),
            Ok(false) => report.record_unchanged(path),
            Err(e) => report.record_failure(path, e.to_string()),
        }
    }
}

/// Pull the bucket name out of a backend fragment: the first line of the
/// shape `bucket = "<value>"`.
fn extract_bucket(replacement: &str) -> Option<String> {
    for line in replacement.lines() {
        let stripped = line.trim();
        if !stripped.starts_with("bucket") {
            continue;
        }
        if let Some((_, value)) = stripped.split_once('=') {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Line-oriented rewrite
// ---------------------------------------------------------------------------

/// Rewrite the `bucket` attribute of the file's `backend "s3"` block.
///
/// State machine over lines: OUTSIDE until a line opens the backend block,
/// then INSIDE tracking brace depth per line. A bucket-attribute line is
/// rewritten in place; if the block closes without one, a synthesized line
/// is inserted at the block's indentation immediately before the closing
/// delimiter. One matching block per file is patched.
fn rewrite_backend_bucket(raw: &str, bucket: &str) -> String {
    let mut updated: Vec<String> = Vec::new();
    let mut inside = false;
    let mut depth: i32 = 0;
    let mut bucket_seen = false;

    for line in raw.lines() {
        let stripped = line.trim();

        if !inside && stripped.starts_with("backend \"s3\"") {
            depth = brace_delta(line);
            updated.push(line.to_string());
            // A one-line `backend "s3" {}` closes immediately; leave it alone.
            inside = depth > 0;
            bucket_seen = false;
            continue;
        }

        if inside {
            depth += brace_delta(line);

            if stripped.starts_with("bucket") && stripped.contains('=') {
                let indent = leading_whitespace(line);
                updated.push(format!("{indent}bucket = \"{bucket}\""));
                bucket_seen = true;
            } else if depth <= 0 && stripped.starts_with('}') {
                if !bucket_seen {
                    let indent = leading_whitespace(line);
                    updated.push(format!("{indent}  bucket = \"{bucket}\""));
                }
                updated.push(line.to_string());
                inside = false;
            } else {
                updated.push(line.to_string());
            }
            continue;
        }

        updated.push(line.to_string());
    }

    let mut result = updated.join("\n");
    if raw.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn brace_delta(line: &str) -> i32 {
    line.matches('{').count() as i32 - line.matches('}').count() as i32
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
