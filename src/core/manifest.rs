//! Kit manifest (`kit.json`) model and kit directory layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::asset::ContentKind;
use crate::error::{Result, VbError};
use crate::utils::{title_case, write_json_pretty};

pub const MANIFEST_FILE: &str = "kit.json";
pub const PREPEND_FILE: &str = "CLAUDE.md.prepend";
pub const USE_CASES_FILE: &str = "USE-CASES.md";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_CATEGORY: &str = "general";

/// Raw manifest document. Missing file yields an empty map.
pub type ManifestDoc = Map<String, Value>;

/// Parse `kit.json` without any schema checks.
pub fn load_document(path: &Path) -> Result<ManifestDoc> {
    if !path.exists() {
        return Ok(ManifestDoc::new());
    }
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(VbError::InvalidManifest {
            path: path.to_path_buf(),
            message: "top-level value is not an object".to_string(),
        }),
        Err(err) => Err(VbError::InvalidManifest {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

/// Sum of the lengths of every list under `contents`.
#[must_use]
pub fn declared_item_count(doc: &ManifestDoc) -> usize {
    doc.get("contents")
        .and_then(Value::as_object)
        .map_or(0, |contents| {
            contents
                .values()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .sum()
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitContents {
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub hooks: Vec<String>,
    #[serde(default)]
    pub mcps: Vec<String>,
    /// Slots outside the five standard kinds, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KitContents {
    #[must_use]
    pub fn get(&self, kind: ContentKind) -> &Vec<String> {
        match kind {
            ContentKind::Agents => &self.agents,
            ContentKind::Commands => &self.commands,
            ContentKind::Skills => &self.skills,
            ContentKind::Hooks => &self.hooks,
            ContentKind::Mcps => &self.mcps,
        }
    }

    pub fn get_mut(&mut self, kind: ContentKind) -> &mut Vec<String> {
        match kind {
            ContentKind::Agents => &mut self.agents,
            ContentKind::Commands => &mut self.commands,
            ContentKind::Skills => &mut self.skills,
            ContentKind::Hooks => &mut self.hooks,
            ContentKind::Mcps => &mut self.mcps,
        }
    }

    /// Append unless an identical reference is already listed.
    pub fn insert(&mut self, kind: ContentKind, reference: &str) -> bool {
        let list = self.get_mut(kind);
        if list.iter().any(|existing| existing == reference) {
            false
        } else {
            list.push(reference.to_string());
            true
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        ContentKind::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Typed view of `kit.json`. Unknown keys survive a load/save cycle via `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitManifest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub composable: Vec<String>,
    #[serde(default)]
    pub contents: KitContents,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl KitManifest {
    /// Fresh manifest for `kit create`: empty contents, tags and composable.
    #[must_use]
    pub fn scaffold(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: title_case(id),
            version: default_version(),
            description: String::new(),
            category: default_category(),
            composable: Vec::new(),
            contents: KitContents::default(),
            tags: Vec::new(),
            extra: Map::new(),
        }
    }

    /// `None` when no manifest exists at `path`. Known fields holding the
    /// wrong JSON type (e.g. `"description": null`) read as their defaults.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let mut doc = load_document(path)?;
        if doc.is_empty() {
            return Ok(None);
        }
        drop_mistyped_fields(&mut doc);
        serde_json::from_value(Value::Object(doc))
            .map(Some)
            .map_err(|err| VbError::InvalidManifest {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }

    /// Pretty JSON, 2-space indent, trailing newline; parents created.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_pretty(path, self)
    }
}

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

/// Remove typed fields whose value would not deserialize, so serde defaults apply.
fn drop_mistyped_fields(doc: &mut ManifestDoc) {
    doc.retain(|key, value| match key.as_str() {
        "id" | "name" | "version" | "description" | "category" => value.is_string(),
        "composable" | "tags" => is_string_list(value),
        "contents" => value.is_object(),
        _ => true,
    });
    if let Some(Value::Object(contents)) = doc.get_mut("contents") {
        contents.retain(|key, value| {
            ContentKind::from_key(key).is_none() || is_string_list(value)
        });
    }
}

/// Opening and closing markers around a kit's injected context block.
#[must_use]
pub fn prepend_markers(id: &str, version: &str) -> (String, String) {
    (
        format!("<!-- VIBERY-KIT:{id}:v{version} -->"),
        format!("<!-- /VIBERY-KIT:{id} -->"),
    )
}

/// Scaffold `CLAUDE.md.prepend` for a newly created kit.
#[must_use]
pub fn prepend_scaffold(manifest: &KitManifest) -> String {
    let (open, close) = prepend_markers(&manifest.id, &manifest.version);
    format!(
        "{open}\n## {}\n\n### Stack Context\n- **Purpose**: [Description]\n\n\
         ### Key Patterns\n[Add patterns and guidelines here]\n\n### Rules\n[Add rules here]\n{close}\n",
        manifest.name
    )
}

/// `CLAUDE.md.prepend` listing what a batch-created kit includes.
#[must_use]
pub fn prepend_summary(
    manifest: &KitManifest,
    agents: &[String],
    skills: &[String],
    commands: &[String],
) -> String {
    let (open, close) = prepend_markers(&manifest.id, &manifest.version);
    let list = |items: &[String]| {
        if items.is_empty() {
            "None".to_string()
        } else {
            items.join(", ")
        }
    };
    format!(
        "{open}\n## {}\n\n{}\n\n### Included\n- Agents: {}\n- Skills: {}\n- Commands: {}\n{close}\n",
        manifest.name,
        manifest.description,
        list(agents),
        list(skills),
        list(commands),
    )
}

/// Paths inside one kit directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitDir {
    pub root: PathBuf,
}

impl KitDir {
    pub fn new(stacks_dir: &Path, id: &str) -> Self {
        Self {
            root: stacks_dir.join(id),
        }
    }

    #[must_use]
    pub fn id(&self) -> String {
        super::asset::file_name(&self.root)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    #[must_use]
    pub fn prepend_path(&self) -> PathBuf {
        self.root.join(PREPEND_FILE)
    }

    #[must_use]
    pub fn use_cases_path(&self) -> PathBuf {
        self.root.join(USE_CASES_FILE)
    }

    #[must_use]
    pub fn content_dir(&self, kind: ContentKind) -> PathBuf {
        self.root.join(kind.key())
    }

    #[must_use]
    pub fn has_manifest(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Every kit directory under `stacks_dir` holding a manifest, sorted by id.
    pub fn discover(stacks_dir: &Path) -> Result<Vec<Self>> {
        Ok(crate::utils::sorted_subdirs(stacks_dir)?
            .into_iter()
            .map(|root| Self { root })
            .filter(Self::has_manifest)
            .collect())
    }
}
