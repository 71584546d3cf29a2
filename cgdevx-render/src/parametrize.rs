//! Ordered token substitution over the rendered tree.
//!
//! Every text file (infra declarations, YAML, Markdown) gets every fragment
//! substitution applied in table order, then every parameter substitution in
//! table order. Substitution is plain substring replacement, never regex —
//! template content legitimately contains regex- and template-looking text.
//!
//! Unlike the patch passes this engine is fail-fast: a read/write error on a
//! specific file aborts the run identifying that file.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use cgdevx_core::types::SubstitutionTable;

use crate::error::{io_err, RenderError};
use crate::write::write_if_changed;

/// File extensions the engine treats as substitutable text.
const TEXT_EXTENSIONS: &[&str] = &["tf", "yaml", "yml", "md"];

/// Outcome of one parametrization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParametrizeSummary {
    /// Files whose content changed and were rewritten.
    pub rewritten: Vec<PathBuf>,
    /// Candidate text files scanned (including unchanged ones).
    pub scanned: usize,
}

/// Apply both substitution tables to every text file under `tree`.
///
/// Idempotent: a second application with the same tables is a no-op,
/// provided no replacement value itself contains a table key.
pub fn parametrize(
    tree: &Path,
    fragments: &SubstitutionTable,
    parameters: &SubstitutionTable,
) -> Result<ParametrizeSummary, RenderError> {
    let mut summary = ParametrizeSummary::default();

    for entry in WalkDir::new(tree).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_default();
            match e.into_io_error() {
                Some(io) => io_err(path, io),
                None => io_err(path, std::io::Error::other("walk error")),
            }
        })?;
        if !entry.file_type().is_file() || !is_text_candidate(entry.path()) {
            continue;
        }

        let path = entry.path();
        summary.scanned += 1;

        let original = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let updated = substitute(&original, fragments, parameters);

        if write_if_changed(path, &original, &updated).map_err(|e| io_err(path, e))? {
            summary.rewritten.push(path.to_path_buf());
        }
    }

    Ok(summary)
}

fn is_text_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
}

/// Fragments first, then parameters, each in table order.
fn substitute(
    content: &str,
    fragments: &SubstitutionTable,
    parameters: &SubstitutionTable,
) -> String {
    let mut data = content.to_string();
    for (key, value) in fragments.iter().chain(parameters.iter()) {
        data = data.replace(key, value);
    }
    data
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn tables() -> (SubstitutionTable, SubstitutionTable) {
        let fragments: SubstitutionTable = [(
            "# <TF_VCS_REMOTE_BACKEND>",
            "backend \"s3\" {\n    bucket = \"acme-state\"\n  }",
        )]
        .into_iter()
        .collect();
        let parameters: SubstitutionTable = [
            ("<OWNER_EMAIL>", "admin@acme.dev"),
            ("<PRIMARY_CLUSTER_NAME>", "cc-cluster"),
        ]
        .into_iter()
        .collect();
        (fragments, parameters)
    }

    #[test]
    fn fragments_apply_before_parameters() {
        let tmp = TempDir::new().unwrap();
        let tf = tmp.path().join("main.tf");
        fs::write(
            &tf,
            "terraform {\n  # <TF_VCS_REMOTE_BACKEND>\n}\n# contact: <OWNER_EMAIL>\n",
        )
        .unwrap();

        let (fragments, parameters) = tables();
        let summary = parametrize(tmp.path(), &fragments, &parameters).expect("parametrize");

        assert_eq!(summary.rewritten.len(), 1);
        let out = fs::read_to_string(&tf).unwrap();
        assert!(out.contains("bucket = \"acme-state\""));
        assert!(out.contains("admin@acme.dev"));
        assert!(!out.contains("<TF_VCS_REMOTE_BACKEND>"));
        assert!(!out.contains("<OWNER_EMAIL>"));
    }

    #[test]
    fn second_pass_is_noop() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.yaml"), "cluster: <PRIMARY_CLUSTER_NAME>\n").unwrap();

        let (fragments, parameters) = tables();
        parametrize(tmp.path(), &fragments, &parameters).expect("first");
        let second = parametrize(tmp.path(), &fragments, &parameters).expect("second");

        assert!(second.rewritten.is_empty(), "second pass must rewrite nothing");
        assert_eq!(second.scanned, 1);
    }

    #[test]
    fn non_text_files_are_untouched() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("chart.tgz");
        fs::write(&bin, "<OWNER_EMAIL>").unwrap();

        let (fragments, parameters) = tables();
        let summary = parametrize(tmp.path(), &fragments, &parameters).expect("parametrize");

        assert_eq!(summary.scanned, 0);
        assert_eq!(fs::read_to_string(&bin).unwrap(), "<OWNER_EMAIL>");
    }

    #[test]
    fn no_table_key_survives_anywhere() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("pipelines")).unwrap();
        fs::write(
            tmp.path().join("main.tf"),
            "# <TF_VCS_REMOTE_BACKEND>\nowner = \"<OWNER_EMAIL>\"\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("pipelines/app.yaml"),
            "email: <OWNER_EMAIL>\nname: <PRIMARY_CLUSTER_NAME>\n",
        )
        .unwrap();
        fs::write(tmp.path().join("README.md"), "Contact <OWNER_EMAIL>.\n").unwrap();

        let (fragments, parameters) = tables();
        parametrize(tmp.path(), &fragments, &parameters).expect("parametrize");

        for entry in WalkDir::new(tmp.path()) {
            let entry = entry.unwrap();
            if !entry.file_type().is_file() {
                continue;
            }
            let content = fs::read_to_string(entry.path()).unwrap();
            for key in fragments.keys().chain(parameters.keys()) {
                assert!(
                    !content.contains(key),
                    "{} still contains {}",
                    entry.path().display(),
                    key
                );
            }
        }
    }

    #[test]
    fn substitution_order_is_table_order() {
        // The second fragment targets text the first one does not introduce.
        let fragments: SubstitutionTable = [
            ("# <BLOCK_A>", "alpha"),
            ("# <BLOCK_B>", "beta"),
        ]
        .into_iter()
        .collect();
        let out = substitute("# <BLOCK_A>\n# <BLOCK_B>\n", &fragments, &SubstitutionTable::new());
        assert_eq!(out, "alpha\nbeta\n");
    }
}
