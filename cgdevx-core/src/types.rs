//! Domain types for the CG DevX synchronization engine.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Substitution tables
// ---------------------------------------------------------------------------

/// An ordered key → value substitution table.
///
/// Application order is insertion order, which for profiles loaded from YAML
/// is the order keys appear in the document. Fragment substitutions depend on
/// this: later entries may only touch text that earlier entries did not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubstitutionTable(Vec<(String, String)>);

impl SubstitutionTable {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

// Serialized as a plain YAML/JSON mapping; deserialization preserves document
// order, which HashMap-backed maps would lose.
impl Serialize for SubstitutionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubstitutionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = SubstitutionTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of placeholder keys to replacement strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    entries.push((key, value));
                }
                Ok(SubstitutionTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Remote template repository pinned to a branch. Fixed for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// How the template scratch tree is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireMode {
    /// Clone the pinned branch of the template remote.
    Clone,
    /// Copy a local source tree instead — development mode.
    CopyLocal(PathBuf),
}

/// The repository the rendered tree is published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTarget {
    /// Push URL (SSH form, e.g. `git@github.com:org/repo.git`).
    pub url: String,
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

/// Commit author/committer identity plus SSH key for push transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    pub author_name: String,
    pub author_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_path: Option<PathBuf>,
}

/// Provider REST API access for the pull-request fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_base")]
    pub base_url: String,
    pub token: String,
}

/// Root of the run configuration loaded from `profile.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub template: TemplateSource,
    /// Development-mode switch: copy this tree instead of cloning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_source: Option<PathBuf>,
    pub remote: RemoteTarget,
    pub identity: GitIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiSettings>,
    #[serde(default)]
    pub fragments: SubstitutionTable,
    #[serde(default)]
    pub parameters: SubstitutionTable,
}

impl Profile {
    /// Acquisition mode implied by the profile.
    pub fn acquire_mode(&self) -> AcquireMode {
        match &self.local_source {
            Some(path) => AcquireMode::CopyLocal(path.clone()),
            None => AcquireMode::Clone,
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
