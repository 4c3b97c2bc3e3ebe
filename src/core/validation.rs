//! Kit validation.
//!
//! Read-only pass that cross-checks each manifest against the kit directory.
//! Errors invalidate a kit; warnings never do. A broken manifest is recorded
//! against its kit and the run moves on.

use std::path::Path;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::asset::{ContentKind, SKILL_FILE};
use super::manifest::{KitDir, ManifestDoc, PREPEND_FILE, load_document};
use crate::error::Result;
use crate::utils::sorted_files;

const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "version", "description", "contents"];

/// Outcome for one kit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KitValidation {
    pub id: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Items physically present in the kit's content directories.
    pub items: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationSummary {
    pub kits: Vec<KitValidation>,
}

impl ValidationSummary {
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.kits.iter().all(|kit| kit.valid)
    }

    #[must_use]
    pub fn total_valid(&self) -> usize {
        self.kits.iter().filter(|kit| kit.valid).count()
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.kits.iter().map(|kit| kit.items).sum()
    }
}

/// Validate every kit under `stacks_dir`.
pub fn validate_all(stacks_dir: &Path) -> Result<ValidationSummary> {
    let kits = KitDir::discover(stacks_dir)?
        .iter()
        .map(validate_kit)
        .collect();
    Ok(ValidationSummary { kits })
}

/// Validate one kit directory. Read failures are recorded against the kit.
#[must_use]
pub fn validate_kit(kit: &KitDir) -> KitValidation {
    let mut report = KitValidation {
        id: kit.id(),
        ..KitValidation::default()
    };

    if !kit.has_manifest() {
        report.errors.push("missing kit.json".to_string());
        return report;
    }

    match load_document(&kit.manifest_path()) {
        Ok(doc) => {
            check_required(&doc, &mut report);
            check_references(kit, &doc, &mut report);
            check_metadata(&doc, &mut report);
            if let Err(err) = check_prepend(kit, &doc, &mut report) {
                report.errors.push(format!("{PREPEND_FILE}: {err}"));
            }
        }
        Err(err) => report.errors.push(err.to_string()),
    }

    match count_items(kit) {
        Ok(items) => report.items = items,
        Err(err) => report.errors.push(format!("counting items: {err}")),
    }
    report.valid = report.errors.is_empty();
    report
}

fn check_required(doc: &ManifestDoc, report: &mut KitValidation) {
    for field in REQUIRED_FIELDS {
        if !doc.contains_key(field) {
            report.errors.push(format!("missing required field: {field}"));
        }
    }
}

fn check_references(kit: &KitDir, doc: &ManifestDoc, report: &mut KitValidation) {
    let Some(contents) = doc.get("contents").and_then(Value::as_object) else {
        return;
    };

    for kind in ContentKind::ALL {
        let Some(references) = contents.get(kind.key()).and_then(Value::as_array) else {
            continue;
        };
        let dir = kit.content_dir(kind);
        for reference in references {
            let Some(reference) = reference.as_str() else {
                report
                    .errors
                    .push(format!("non-string entry in contents.{}", kind.key()));
                continue;
            };
            if let Some(problem) = missing_reference(&dir, kind, reference) {
                report.errors.push(problem);
            }
        }
    }
}

fn missing_reference(dir: &Path, kind: ContentKind, reference: &str) -> Option<String> {
    if kind == ContentKind::Skills {
        let skill = dir.join(reference);
        if !skill.is_dir() {
            return Some(format!("skill not found: {reference}"));
        }
        if !skill.join(SKILL_FILE).is_file() {
            return Some(format!("skill {reference} has no {SKILL_FILE}"));
        }
        return None;
    }

    let direct = dir.join(reference);
    let with_default = kind
        .default_extension()
        .filter(|_| Path::new(reference).extension().is_none())
        .map(|ext| dir.join(format!("{reference}.{ext}")));
    let found = direct.is_file() || with_default.is_some_and(|path| path.is_file());
    (!found).then(|| format!("{} not found: {reference}", kind.singular()))
}

fn check_metadata(doc: &ManifestDoc, report: &mut KitValidation) {
    let text = |key: &str| doc.get(key).and_then(Value::as_str).unwrap_or_default();

    if doc.contains_key("description") && text("description").trim().is_empty() {
        report.warnings.push("description is empty".to_string());
    }

    let has_tags = doc
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| !tags.is_empty());
    if !has_tags {
        report.warnings.push("no tags".to_string());
    }

    let version = text("version");
    if doc.contains_key("version") && semver::Version::parse(version).is_err() {
        report
            .warnings
            .push(format!("version {version:?} is not a semantic version"));
    }
}

fn check_prepend(kit: &KitDir, doc: &ManifestDoc, report: &mut KitValidation) -> Result<()> {
    let path = kit.prepend_path();
    if !path.is_file() {
        report.warnings.push("missing CLAUDE.md.prepend".to_string());
        return Ok(());
    }

    let id = doc
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(|| kit.id(), str::to_string);
    let marker = Regex::new(&format!(r"<!-- VIBERY-KIT:{}:v\S+ -->", regex::escape(&id)))
        .map_err(|err| crate::error::VbError::Config(err.to_string()))?;
    let bytes = std::fs::read(&path)?;
    if !marker.is_match(&String::from_utf8_lossy(&bytes)) {
        report
            .warnings
            .push("CLAUDE.md.prepend lacks the VIBERY-KIT opening marker".to_string());
    }
    Ok(())
}

fn count_items(kit: &KitDir) -> Result<usize> {
    let mut count = 0;
    for kind in ContentKind::ALL {
        let dir = kit.content_dir(kind);
        count += if kind == ContentKind::Skills {
            crate::utils::sorted_subdirs(&dir)?.len()
        } else {
            sorted_files(&dir)?.len()
        };
    }
    Ok(count)
}
