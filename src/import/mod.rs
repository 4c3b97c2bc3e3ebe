//! Template import (`template pull`).
//!
//! A source is either a remote git repository or a local directory. Remote
//! sources are shallow-cloned into a temporary directory that is removed when
//! the pull returns, whatever the outcome. Two layouts are scanned:
//!
//! * `.claude/skills/<name>/SKILL.md`, `.claude/agents/*.md`, `.claude/commands/*.md`
//! * `templates/<kind>/**`
//!
//! Everything found overwrites same-named assets in the store.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::core::asset::{SKILL_FILE, file_name, file_stem, kind_label};
use crate::core::AssetStore;
use crate::error::{Result, VbError};
use crate::utils::process::CommandRunner;
use crate::utils::{copy_file, is_hidden, replace_dir, sorted_subdirs};

/// Where `template pull` reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    /// `http…` and `git@…` are remote; anything else must be an existing path.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with("http") || raw.starts_with("git@") {
            return Ok(Self::Remote(raw.to_string()));
        }
        let path = PathBuf::from(raw);
        if path.exists() {
            Ok(Self::Local(path))
        } else {
            Err(VbError::SourceNotFound(raw.to_string()))
        }
    }
}

/// One imported asset. `kind` is `skill`, `agent`, `command`, or the
/// `templates/` subdirectory it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedAsset {
    pub kind: String,
    pub name: String,
}

pub struct Importer<'a, R: CommandRunner> {
    store: &'a AssetStore,
    runner: &'a R,
    dry_run: bool,
}

impl<'a, R: CommandRunner> Importer<'a, R> {
    pub const fn new(store: &'a AssetStore, runner: &'a R) -> Self {
        Self {
            store,
            runner,
            dry_run: false,
        }
    }

    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn pull(&self, source: &Source) -> Result<Vec<ImportedAsset>> {
        match source {
            Source::Local(path) => self.scan_and_copy(path),
            Source::Remote(url) => {
                let checkout = tempfile::Builder::new().prefix("vibery-pull-").tempdir()?;
                self.clone_into(url, checkout.path())?;
                self.scan_and_copy(checkout.path())
            }
        }
    }

    fn clone_into(&self, url: &str, target: &Path) -> Result<()> {
        let target_arg = target.to_string_lossy();
        info!(url, "cloning source repository");
        let output = self.runner.run(
            "git",
            &["clone", "--depth", "1", url, target_arg.as_ref()],
            None,
        )?;
        if output.success() {
            Ok(())
        } else {
            Err(VbError::CloneFailed(output.stderr_excerpt()))
        }
    }

    fn scan_and_copy(&self, source_dir: &Path) -> Result<Vec<ImportedAsset>> {
        let mut imported = Vec::new();
        let hidden_config = source_dir.join(".claude");
        if hidden_config.is_dir() {
            self.import_skills(&hidden_config.join("skills"), &mut imported)?;
            for dir_name in ["agents", "commands"] {
                self.import_markdown(&hidden_config, dir_name, &mut imported)?;
            }
        }
        self.import_template_tree(&source_dir.join("templates"), &mut imported)?;

        info!(count = imported.len(), dry_run = self.dry_run, "pull complete");
        Ok(imported)
    }

    fn import_skills(&self, skills_src: &Path, imported: &mut Vec<ImportedAsset>) -> Result<()> {
        for skill in sorted_subdirs(skills_src)? {
            if !skill.join(SKILL_FILE).is_file() {
                debug!(path = %skill.display(), "skipping directory without descriptor");
                continue;
            }
            let name = file_name(&skill);
            if !self.dry_run {
                replace_dir(&skill, &self.store.skills_dir().join(&name))?;
            }
            imported.push(ImportedAsset {
                kind: "skill".to_string(),
                name,
            });
        }
        Ok(())
    }

    fn import_markdown(
        &self,
        hidden_config: &Path,
        dir_name: &str,
        imported: &mut Vec<ImportedAsset>,
    ) -> Result<()> {
        let pattern = hidden_config.join(dir_name).join("*.md");
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map_err(|err| VbError::Config(err.to_string()))?
            .filter_map(std::result::Result::ok)
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let kind = kind_label(dir_name);
        for file in files {
            if !self.dry_run {
                let dest = self.store.templates_dir().join(dir_name).join(file_name(&file));
                copy_file(&file, &dest)?;
            }
            imported.push(ImportedAsset {
                kind: kind.clone(),
                name: file_stem(&file),
            });
        }
        Ok(())
    }

    fn import_template_tree(
        &self,
        templates_src: &Path,
        imported: &mut Vec<ImportedAsset>,
    ) -> Result<()> {
        for kind_dir in sorted_subdirs(templates_src)? {
            let kind = file_name(&kind_dir);
            for entry in walkdir::WalkDir::new(&kind_dir).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() || is_hidden(entry.path()) {
                    continue;
                }
                if !self.dry_run {
                    let relative = entry
                        .path()
                        .strip_prefix(templates_src)
                        .unwrap_or(entry.path());
                    copy_file(entry.path(), &self.store.templates_dir().join(relative))?;
                }
                imported.push(ImportedAsset {
                    kind: kind.clone(),
                    name: file_stem(entry.path()),
                });
            }
        }
        Ok(())
    }
}
