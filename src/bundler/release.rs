//! Release assets: one `.tar.gz` per template or skill plus `registry.json`.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::asset::{SKILL_FILE, TEMPLATE_EXTENSIONS, file_name, file_stem, kind_label};
use crate::error::Result;
use crate::utils::{ensure_dir, sorted_files, sorted_subdirs, write_json_pretty};

const DESCRIPTION_LIMIT: usize = 150;

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,
    pub archive: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseRegistry {
    pub version: String,
    pub updated: String,
    pub base_url: String,
    pub templates: Vec<ReleaseEntry>,
}

/// Inputs for one release build.
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    pub templates_dir: PathBuf,
    pub skills_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub template_types: Vec<String>,
    pub version: String,
    pub base_url: String,
}

impl ReleaseBuilder {
    /// Empty `dist/`, archive every asset, write `dist/registry.json`.
    pub fn build(&self, dry_run: bool) -> Result<ReleaseRegistry> {
        if !dry_run {
            if self.dist_dir.exists() {
                std::fs::remove_dir_all(&self.dist_dir)?;
            }
            ensure_dir(&self.dist_dir)?;
        }

        let mut templates = Vec::new();
        for kind_dir in &self.template_types {
            let singular = kind_label(kind_dir);
            if kind_dir == "skills" {
                for skill in sorted_subdirs(&self.skills_dir)? {
                    templates.push(self.archive_skill(&skill, &singular, dry_run)?);
                }
            } else {
                for file in sorted_files(&self.templates_dir.join(kind_dir))? {
                    let is_template = file
                        .extension()
                        .is_some_and(|ext| TEMPLATE_EXTENSIONS.iter().any(|t| ext == *t));
                    if is_template {
                        templates.push(self.archive_file(&file, &singular, dry_run)?);
                    }
                }
            }
        }

        let registry = ReleaseRegistry {
            version: self.version.clone(),
            updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            base_url: self.base_url.clone(),
            templates,
        };
        if !dry_run {
            write_json_pretty(self.dist_dir.join("registry.json"), &registry)?;
        }
        info!(count = registry.templates.len(), dry_run, "release assets generated");
        Ok(registry)
    }

    fn archive_file(&self, file: &Path, kind: &str, dry_run: bool) -> Result<ReleaseEntry> {
        let name = file_stem(file);
        let archive = format!("{kind}--{name}.tar.gz");
        if !dry_run {
            let mut tar = self.tar_at(&archive)?;
            tar.append_path_with_name(file, file_name(file))?;
            tar.into_inner()?.finish()?;
        }
        debug!(%archive, "archived template");
        Ok(ReleaseEntry {
            description: extract_description(file),
            size: std::fs::metadata(file)?.len(),
            files: None,
            kind: kind.to_string(),
            name,
            archive,
        })
    }

    fn archive_skill(&self, dir: &Path, kind: &str, dry_run: bool) -> Result<ReleaseEntry> {
        let name = file_name(dir);
        let archive = format!("{kind}--{name}.tar.gz");
        if !dry_run {
            let mut tar = self.tar_at(&archive)?;
            tar.append_dir_all(&name, dir)?;
            tar.into_inner()?.finish()?;
        }

        let mut size = 0;
        let mut files = 0;
        for entry in WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() {
                size += entry.metadata()?.len();
                files += 1;
            }
        }

        let descriptor = dir.join(SKILL_FILE);
        let description = if descriptor.is_file() {
            extract_description(&descriptor)
        } else {
            sorted_files(dir)?
                .into_iter()
                .find(|f| f.extension().is_some_and(|ext| ext == "md"))
                .map(|f| extract_description(&f))
                .unwrap_or_default()
        };
        debug!(%archive, files, "archived skill");

        Ok(ReleaseEntry {
            name,
            kind: kind.to_string(),
            description,
            size,
            files: Some(files),
            archive,
        })
    }

    fn tar_at(&self, archive: &str) -> Result<tar::Builder<GzEncoder<File>>> {
        let file = File::create(self.dist_dir.join(archive))?;
        Ok(tar::Builder::new(GzEncoder::new(file, Compression::default())))
    }
}

/// First non-empty, non-heading line, emphasis markers stripped.
#[must_use]
pub fn extract_description(path: &Path) -> String {
    let Ok(content) = std::fs::read_to_string(path) else {
        return String::new();
    };
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.chars()
                .take(DESCRIPTION_LIMIT)
                .filter(|c| !matches!(c, '*' | '_' | '`'))
                .collect()
        })
        .unwrap_or_default()
}
