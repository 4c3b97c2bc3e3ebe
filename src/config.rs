use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VbError};

pub const CONFIG_FILE: &str = "vibery.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("VIBERY_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?
                .ok_or_else(|| VbError::MissingConfig(path.display().to_string()))?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&root.join(CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("vibery/config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| VbError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| VbError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.paths {
            self.paths.merge(patch);
        }
        if let Some(patch) = patch.sync {
            self.sync.merge(patch);
        }
        if let Some(patch) = patch.publish {
            self.publish.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_path("VIBERY_PATHS_TEMPLATES") {
            self.paths.templates = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_SKILLS") {
            self.paths.skills = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_STACKS") {
            self.paths.stacks = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_CLI") {
            self.paths.cli = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_WEBSITE") {
            self.paths.website = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_TEMPLATES_REPO") {
            self.paths.templates_repo = value;
        }
        if let Some(value) = env_path("VIBERY_PATHS_DIST") {
            self.paths.dist = value;
        }

        if let Some(value) = env_string("VIBERY_SYNC_DOWNLOAD_BASE") {
            self.sync.download_base = value;
        }
        if let Some(value) = env_path("VIBERY_SYNC_ZIPS_DIR") {
            self.sync.zips_dir = value;
        }
        if let Some(value) = env_path("VIBERY_SYNC_WEBSITE_DATA") {
            self.sync.website_data = value;
        }
        if let Some(value) = env_string("VIBERY_SYNC_RELEASE_BASE_URL") {
            self.sync.release_base_url = value;
        }

        if let Some(value) = env_string("VIBERY_PUBLISH_BRANCH") {
            self.publish.branch = value;
        }
        if let Some(value) = env_string("VIBERY_PUBLISH_COMMIT_MESSAGE") {
            self.publish.commit_message = value;
        }
        if let Some(value) = env_string("VIBERY_PUBLISH_PAGES_PROJECT") {
            self.publish.pages_project = value;
        }
        if let Some(value) = env_string("VIBERY_PUBLISH_BUILD_DIR") {
            self.publish.build_dir = value;
        }
        if let Some(values) = env_list("VIBERY_PUBLISH_TEMPLATE_TYPES") {
            if values.is_empty() {
                return Err(VbError::Config(
                    "VIBERY_PUBLISH_TEMPLATE_TYPES must name at least one type".to_string(),
                ));
            }
            self.publish.template_types = values;
        }

        Ok(())
    }
}

/// Catalog layout, relative to the catalog root unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub templates: PathBuf,
    pub skills: PathBuf,
    pub stacks: PathBuf,
    pub cli: PathBuf,
    pub website: PathBuf,
    pub templates_repo: PathBuf,
    pub dist: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("templates"),
            skills: PathBuf::from(".claude/skills"),
            stacks: PathBuf::from("stacks"),
            cli: PathBuf::from("cli"),
            website: PathBuf::from("website"),
            templates_repo: PathBuf::from("templates-repo"),
            dist: PathBuf::from("dist"),
        }
    }
}

impl PathsConfig {
    fn merge(&mut self, patch: PathsPatch) {
        if let Some(value) = patch.templates {
            self.templates = value;
        }
        if let Some(value) = patch.skills {
            self.skills = value;
        }
        if let Some(value) = patch.stacks {
            self.stacks = value;
        }
        if let Some(value) = patch.cli {
            self.cli = value;
        }
        if let Some(value) = patch.website {
            self.website = value;
        }
        if let Some(value) = patch.templates_repo {
            self.templates_repo = value;
        }
        if let Some(value) = patch.dist {
            self.dist = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// URL prefix for kit downloads in the website data file.
    pub download_base: String,
    pub zips_dir: PathBuf,
    pub website_data: PathBuf,
    pub release_base_url: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_base: "/kits".to_string(),
            zips_dir: PathBuf::from("website/public/kits"),
            website_data: PathBuf::from("website/src/data/kits.json"),
            release_base_url:
                "https://github.com/vibery-studio/templates/releases/latest/download".to_string(),
        }
    }
}

impl SyncConfig {
    fn merge(&mut self, patch: SyncPatch) {
        if let Some(value) = patch.download_base {
            self.download_base = value;
        }
        if let Some(value) = patch.zips_dir {
            self.zips_dir = value;
        }
        if let Some(value) = patch.website_data {
            self.website_data = value;
        }
        if let Some(value) = patch.release_base_url {
            self.release_base_url = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub branch: String,
    pub commit_message: String,
    pub pages_project: String,
    pub build_dir: String,
    pub template_types: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            commit_message: "chore: sync templates".to_string(),
            pages_project: "vibery".to_string(),
            build_dir: "dist".to_string(),
            template_types: ["agents", "commands", "mcps", "hooks", "settings", "skills"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl PublishConfig {
    fn merge(&mut self, patch: PublishPatch) {
        if let Some(value) = patch.branch {
            self.branch = value;
        }
        if let Some(value) = patch.commit_message {
            self.commit_message = value;
        }
        if let Some(value) = patch.pages_project {
            self.pages_project = value;
        }
        if let Some(value) = patch.build_dir {
            self.build_dir = value;
        }
        if let Some(values) = patch.template_types {
            self.template_types = values;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub paths: Option<PathsPatch>,
    pub sync: Option<SyncPatch>,
    pub publish: Option<PublishPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PathsPatch {
    pub templates: Option<PathBuf>,
    pub skills: Option<PathBuf>,
    pub stacks: Option<PathBuf>,
    pub cli: Option<PathBuf>,
    pub website: Option<PathBuf>,
    pub templates_repo: Option<PathBuf>,
    pub dist: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SyncPatch {
    pub download_base: Option<String>,
    pub zips_dir: Option<PathBuf>,
    pub website_data: Option<PathBuf>,
    pub release_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PublishPatch {
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    pub pages_project: Option<String>,
    pub build_dir: Option<String>,
    pub template_types: Option<Vec<String>>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_layout() {
        let config = Config::default();
        assert_eq!(config.paths.skills, PathBuf::from(".claude/skills"));
        assert_eq!(config.paths.stacks, PathBuf::from("stacks"));
        assert_eq!(config.sync.download_base, "/kits");
        assert_eq!(config.publish.branch, "main");
        assert_eq!(config.publish.template_types.len(), 6);
    }

    #[test]
    fn project_patch_overrides_selected_keys() {
        let mut config = Config::default();
        let patch: ConfigPatch = toml::from_str(
            r#"
[paths]
stacks = "kits"

[publish]
pages_project = "kits-site"
"#,
        )
        .unwrap();
        config.merge_patch(patch);

        assert_eq!(config.paths.stacks, PathBuf::from("kits"));
        assert_eq!(config.paths.templates, PathBuf::from("templates"));
        assert_eq!(config.publish.pages_project, "kits-site");
        assert_eq!(config.publish.commit_message, "chore: sync templates");
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[sync]\ndownload_base = \"/downloads\"\n").unwrap();

        let config = Config::load(Some(&path), dir.path()).unwrap();
        assert_eq!(config.sync.download_base, "/downloads");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[paths\nstacks = 1").unwrap();

        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(matches!(err, VbError::Config(_)));
    }

    #[test]
    fn load_requires_explicit_file_to_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, VbError::MissingConfig(_)));
    }
}
