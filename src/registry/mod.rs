//! Registry generation (`sync`).
//!
//! Four passes, run in order, each a full regeneration of its output:
//!
//! 1. `cli/registry.json`: flat index of templates and skills with content hashes
//! 2. `cli/kits.json`: every kit manifest plus its path and item count
//! 3. `<zips_dir>/<id>.zip`: one download archive per kit
//! 4. website kit data: kits only; the website's `templates.json` belongs to a
//!    separate sync process and is never written here
//!
//! In dry-run mode nothing is written but every count is reported as if it had been.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::bundler::write_kit_zip;
use crate::core::asset::{SKILL_FILE, file_name, file_stem, kind_label};
use crate::core::manifest::{DEFAULT_CATEGORY, DEFAULT_VERSION, ManifestDoc, declared_item_count, load_document};
use crate::core::{AssetStore, CatalogPaths, KitDir};
use crate::error::Result;
use crate::utils::{read_optional, sorted_files, sorted_subdirs, title_case, write_json_pretty};

/// Clock reading shared by every pass of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// `YYYYMMDD`, used as the registry `version`.
    pub date: String,
    /// RFC 3339, used as the website `lastUpdated`.
    pub timestamp: String,
}

impl Stamp {
    #[must_use]
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    #[must_use]
    pub fn at(time: DateTime<Local>) -> Self {
        Self {
            date: time.format("%Y%m%d").to_string(),
            timestamp: time.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub path: String,
    pub hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateRegistry {
    pub version: String,
    pub templates: Vec<TemplateEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KitIndex {
    pub version: String,
    pub kits: Vec<ManifestDoc>,
}

impl KitIndex {
    /// Sum of every kit's `item_count`.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.kits
            .iter()
            .filter_map(|kit| kit.get("item_count").and_then(Value::as_u64))
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteKit {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub category: String,
    pub tags: Value,
    pub composable: Value,
    pub download_url: String,
    pub contents: Value,
    pub item_count: usize,
    pub use_cases: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteData {
    pub last_updated: String,
    pub kits: Vec<WebsiteKit>,
}

/// What one `sync` run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub templates: Vec<String>,
    pub kits: Vec<String>,
    pub kit_items: usize,
    pub zips: Vec<String>,
    pub website_kits: usize,
    /// Output files relative to the catalog root.
    pub generated: Vec<String>,
}

impl SyncReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.templates.len() + self.kits.len() + self.zips.len()
    }
}

pub struct RegistryGenerator<'a> {
    paths: &'a CatalogPaths,
    download_base: String,
    stamp: Stamp,
    dry_run: bool,
}

impl<'a> RegistryGenerator<'a> {
    pub fn new(paths: &'a CatalogPaths, download_base: impl Into<String>) -> Self {
        Self {
            paths,
            download_base: download_base.into(),
            stamp: Stamp::now(),
            dry_run: false,
        }
    }

    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_stamp(mut self, stamp: Stamp) -> Self {
        self.stamp = stamp;
        self
    }

    fn registry_path(&self) -> std::path::PathBuf {
        self.paths.cli.join("registry.json")
    }

    fn kits_path(&self) -> std::path::PathBuf {
        self.paths.cli.join("kits.json")
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if self.dry_run {
            debug!(path = %path.display(), "dry run, not writing");
            return Ok(());
        }
        write_json_pretty(path, value)
    }

    /// Run all four passes.
    pub fn sync(&self) -> Result<SyncReport> {
        let templates = self.template_registry()?;
        let kits = self.kit_index()?;
        let zips = self.generate_zips()?;
        let website = self.website_data()?;

        let report = SyncReport {
            dry_run: self.dry_run,
            templates: templates.templates.iter().map(|t| t.id.clone()).collect(),
            kit_items: kits.total_items(),
            kits: kits
                .kits
                .iter()
                .filter_map(|kit| kit.get("id").and_then(Value::as_str).map(str::to_string))
                .collect(),
            zips,
            website_kits: website.kits.len(),
            generated: vec![
                self.paths.relative(&self.registry_path()),
                self.paths.relative(&self.kits_path()),
                format!("{}/*.zip", self.paths.relative(&self.paths.zips_dir)),
                self.paths.relative(&self.paths.website_data),
            ],
        };
        info!(
            templates = report.templates.len(),
            kits = report.kits.len(),
            zips = report.zips.len(),
            dry_run = self.dry_run,
            "sync complete"
        );
        Ok(report)
    }

    /// Pass 1: templates tree plus skills.
    pub fn template_registry(&self) -> Result<TemplateRegistry> {
        let mut templates = Vec::new();
        for dir in sorted_subdirs(&self.paths.templates)? {
            let kind = kind_label(&file_name(&dir));
            for file in sorted_files(&dir)? {
                let id = file_stem(&file);
                templates.push(TemplateEntry {
                    name: title_case(&id),
                    kind: kind.clone(),
                    file: Some(file_name(&file)),
                    path: self.paths.relative(&file),
                    hash: content_hash(&file)?,
                    id,
                });
            }
        }

        let store = AssetStore::new(&self.paths.templates, &self.paths.skills);
        for skill in store.skills()? {
            let id = file_name(&skill);
            templates.push(TemplateEntry {
                name: title_case(&id),
                kind: "skill".to_string(),
                file: None,
                path: self.paths.relative(&skill),
                hash: content_hash(&skill.join(SKILL_FILE))?,
                id,
            });
        }

        let registry = TemplateRegistry {
            version: self.stamp.date.clone(),
            templates,
        };
        self.write(&self.registry_path(), &registry)?;
        debug!(count = registry.templates.len(), "template registry");
        Ok(registry)
    }

    /// Pass 2: kit manifests with `path` and `item_count` added.
    pub fn kit_index(&self) -> Result<KitIndex> {
        let mut kits = Vec::new();
        for kit in KitDir::discover(&self.paths.stacks)? {
            let mut doc = load_document(&kit.manifest_path())?;
            let item_count = declared_item_count(&doc);
            if !doc.contains_key("id") {
                doc.insert("id".to_string(), Value::String(kit.id()));
            }
            doc.insert("path".to_string(), Value::String(self.paths.relative(&kit.root)));
            doc.insert("item_count".to_string(), Value::from(item_count));
            kits.push(doc);
        }

        let index = KitIndex {
            version: self.stamp.date.clone(),
            kits,
        };
        self.write(&self.kits_path(), &index)?;
        debug!(count = index.kits.len(), "kit index");
        Ok(index)
    }

    /// Pass 3: one zip per kit. Returns the kit ids archived.
    pub fn generate_zips(&self) -> Result<Vec<String>> {
        let mut generated = Vec::new();
        for kit in KitDir::discover(&self.paths.stacks)? {
            if !self.dry_run {
                write_kit_zip(&kit.root, &self.paths.zips_dir)?;
            }
            generated.push(kit.id());
        }
        debug!(count = generated.len(), "kit zips");
        Ok(generated)
    }

    /// Pass 4: website kit projection.
    pub fn website_data(&self) -> Result<WebsiteData> {
        let mut kits = Vec::new();
        for kit in KitDir::discover(&self.paths.stacks)? {
            let doc = load_document(&kit.manifest_path())?;
            let dir_id = kit.id();
            let text = |key: &str, default: &str| {
                doc.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or(default)
                    .to_string()
            };
            let list = |key: &str| doc.get(key).cloned().unwrap_or_else(|| Value::Array(Vec::new()));

            kits.push(WebsiteKit {
                id: text("id", &dir_id),
                name: text("name", ""),
                version: text("version", DEFAULT_VERSION),
                description: text("description", ""),
                category: text("category", DEFAULT_CATEGORY),
                tags: list("tags"),
                composable: list("composable"),
                download_url: format!("{}/{dir_id}.zip", self.download_base.trim_end_matches('/')),
                contents: doc
                    .get("contents")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
                item_count: declared_item_count(&doc),
                use_cases: read_optional(kit.use_cases_path())?.unwrap_or_default(),
            });
        }

        let data = WebsiteData {
            last_updated: self.stamp.timestamp.clone(),
            kits,
        };
        self.write(&self.paths.website_data, &data)?;
        Ok(data)
    }
}

/// First 8 hex characters of the SHA-256 of `path`; empty for non-files.
pub fn content_hash(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Ok(String::new());
    }
    let digest = Sha256::digest(std::fs::read(path)?);
    Ok(hex::encode(digest)[..8].to_string())
}
