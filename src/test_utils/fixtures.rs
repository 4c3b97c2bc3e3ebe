use std::path::PathBuf;

use tempfile::TempDir;

use crate::config::Config;
use crate::core::{AssetStore, Catalog, CatalogPaths, KitDir};

/// Throwaway catalog root laid out with the default paths.
pub struct CatalogFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write `content` at `relative_path` under the root, creating parents.
    pub fn file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// `templates/<dir>/<file_name>`.
    pub fn template(&self, dir: &str, file_name: &str, content: &str) -> PathBuf {
        self.file(&format!("templates/{dir}/{file_name}"), content)
    }

    /// `.claude/skills/<name>/SKILL.md` with minimal front-matter. Returns the skill directory.
    pub fn skill(&self, name: &str) -> PathBuf {
        let descriptor = self.file(
            &format!(".claude/skills/{name}/SKILL.md"),
            &format!("---\nname: {name}\ndescription: {name} skill\n---\n\n# {name}\n"),
        );
        descriptor
            .parent()
            .map(PathBuf::from)
            .expect("skill descriptor has a parent")
    }

    #[must_use]
    pub fn paths(&self) -> CatalogPaths {
        CatalogPaths::resolve(&self.root, &Config::default())
    }

    #[must_use]
    pub fn store(&self) -> AssetStore {
        let paths = self.paths();
        AssetStore::new(paths.templates, paths.skills)
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.store(), self.paths().stacks)
    }

    #[must_use]
    pub fn kit_dir(&self, id: &str) -> KitDir {
        KitDir::new(&self.paths().stacks, id)
    }

    /// Every file under the root with its bytes, for before/after comparisons.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let bytes = std::fs::read(entry.path()).expect("Failed to read file");
                (entry.path().to_path_buf(), bytes)
            })
            .collect();
        files.sort();
        files
    }
}
