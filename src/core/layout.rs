//! Resolved on-disk locations of every catalog area.

use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub root: PathBuf,
    pub templates: PathBuf,
    pub skills: PathBuf,
    pub stacks: PathBuf,
    pub cli: PathBuf,
    pub website: PathBuf,
    pub templates_repo: PathBuf,
    pub dist: PathBuf,
    pub zips_dir: PathBuf,
    pub website_data: PathBuf,
}

impl CatalogPaths {
    #[must_use]
    pub fn resolve(root: &Path, config: &Config) -> Self {
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };
        Self {
            root: root.to_path_buf(),
            templates: join(&config.paths.templates),
            skills: join(&config.paths.skills),
            stacks: join(&config.paths.stacks),
            cli: join(&config.paths.cli),
            website: join(&config.paths.website),
            templates_repo: join(&config.paths.templates_repo),
            dist: join(&config.paths.dist),
            zips_dir: join(&config.sync.zips_dir),
            website_data: join(&config.sync.website_data),
        }
    }

    /// `path` relative to the catalog root with `/` separators, for registry output.
    #[must_use]
    pub fn relative(&self, path: &Path) -> String {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return path.display().to_string();
        };
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
