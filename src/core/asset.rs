//! Asset store: template files and skill directories on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, VbError};
use crate::utils::{ensure_dir, sorted_files, sorted_subdirs};

/// Descriptor file every skill directory must contain.
pub const SKILL_FILE: &str = "SKILL.md";

/// Extensions tried, in order, when resolving a template by name.
pub const TEMPLATE_EXTENSIONS: [&str; 2] = ["md", "json"];

/// Single-file template kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Agent,
    Command,
    Hook,
    Mcp,
    Setting,
}

impl TemplateKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Command => "command",
            Self::Hook => "hook",
            Self::Mcp => "mcp",
            Self::Setting => "setting",
        }
    }

    /// Directory under the templates root.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Agent => "agents",
            Self::Command => "commands",
            Self::Hook => "hooks",
            Self::Mcp => "mcps",
            Self::Setting => "settings",
        }
    }

    /// Kit contents slot; settings have none.
    #[must_use]
    pub const fn content_kind(self) -> Option<ContentKind> {
        match self {
            Self::Agent => Some(ContentKind::Agents),
            Self::Command => Some(ContentKind::Commands),
            Self::Hook => Some(ContentKind::Hooks),
            Self::Mcp => Some(ContentKind::Mcps),
            Self::Setting => None,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keys of a kit's `contents` map, in manifest order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Agents,
    Commands,
    Skills,
    Hooks,
    Mcps,
}

impl ContentKind {
    pub const ALL: [Self; 5] = [
        Self::Agents,
        Self::Commands,
        Self::Skills,
        Self::Hooks,
        Self::Mcps,
    ];

    /// Manifest key, which is also the kit subdirectory name.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::Commands => "commands",
            Self::Skills => "skills",
            Self::Hooks => "hooks",
            Self::Mcps => "mcps",
        }
    }

    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Agents => "agent",
            Self::Commands => "command",
            Self::Skills => "skill",
            Self::Hooks => "hook",
            Self::Mcps => "mcp",
        }
    }

    /// Extension implied for references stored without one.
    #[must_use]
    pub const fn default_extension(self) -> Option<&'static str> {
        match self {
            Self::Agents | Self::Commands => Some("md"),
            Self::Hooks | Self::Mcps => Some("json"),
            Self::Skills => None,
        }
    }

    #[must_use]
    pub const fn template_kind(self) -> Option<TemplateKind> {
        match self {
            Self::Agents => Some(TemplateKind::Agent),
            Self::Commands => Some(TemplateKind::Command),
            Self::Hooks => Some(TemplateKind::Hook),
            Self::Mcps => Some(TemplateKind::Mcp),
            Self::Skills => None,
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One directory of the templates tree, e.g. `templates/agents`.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateGroup {
    pub dir_name: String,
    /// Singular type label derived from the directory name (`agents` -> `agent`).
    pub kind_label: String,
    pub files: Vec<PathBuf>,
}

/// Read-only view of the template and skill trees, plus scaffold writers.
#[derive(Debug, Clone)]
pub struct AssetStore {
    templates_dir: PathBuf,
    skills_dir: PathBuf,
}

impl AssetStore {
    pub fn new(templates_dir: impl Into<PathBuf>, skills_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            skills_dir: skills_dir.into(),
        }
    }

    #[must_use]
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    #[must_use]
    pub fn skills_dir(&self) -> &Path {
        &self.skills_dir
    }

    #[must_use]
    pub fn kind_dir(&self, kind: TemplateKind) -> PathBuf {
        self.templates_dir.join(kind.dir_name())
    }

    /// Find `<kind dir>/<name>.md`, then `<name>.json`.
    #[must_use]
    pub fn resolve_template(&self, kind: TemplateKind, name: &str) -> Option<PathBuf> {
        let dir = self.kind_dir(kind);
        let found = TEMPLATE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|candidate| candidate.is_file());
        debug!(%kind, name, found = found.is_some(), "template lookup");
        found
    }

    /// A skill resolves only when its directory holds `SKILL.md`.
    #[must_use]
    pub fn resolve_skill(&self, name: &str) -> Option<PathBuf> {
        let dir = self.skills_dir.join(name);
        let found = dir.join(SKILL_FILE).is_file();
        debug!(name, found, "skill lookup");
        found.then_some(dir)
    }

    /// Every subdirectory of the templates tree with its visible files, sorted.
    pub fn template_groups(&self) -> Result<Vec<TemplateGroup>> {
        let mut groups = Vec::new();
        for dir in sorted_subdirs(&self.templates_dir)? {
            let dir_name = file_name(&dir);
            groups.push(TemplateGroup {
                files: sorted_files(&dir)?,
                kind_label: kind_label(&dir_name),
                dir_name,
            });
        }
        Ok(groups)
    }

    /// Skill directories that contain `SKILL.md`, sorted by name.
    pub fn skills(&self) -> Result<Vec<PathBuf>> {
        Ok(sorted_subdirs(&self.skills_dir)?
            .into_iter()
            .filter(|dir| dir.join(SKILL_FILE).is_file())
            .collect())
    }

    /// Write a new template or skill scaffold. Returns the created path.
    pub fn create_scaffold(&self, kind_label: &str, name: &str, dry_run: bool) -> Result<PathBuf> {
        if kind_label == "skill" {
            let dir = self.skills_dir.join(name);
            if dir.exists() {
                return Err(VbError::AlreadyExists(dir.display().to_string()));
            }
            if !dry_run {
                ensure_dir(dir.join("scripts"))?;
                ensure_dir(dir.join("references"))?;
                std::fs::write(dir.join(SKILL_FILE), scaffold::skill(name))?;
            }
            return Ok(dir);
        }

        let (kind, ext, body) = match kind_label {
            "agent" => (TemplateKind::Agent, "md", scaffold::agent(name)),
            "command" => (TemplateKind::Command, "md", scaffold::command(name)),
            "hook" => (TemplateKind::Hook, "json", scaffold::hook()?),
            "mcp" => (TemplateKind::Mcp, "json", scaffold::mcp(name)?),
            other => {
                return Err(VbError::UnknownTemplateType {
                    kind: other.to_string(),
                    valid: scaffold::KINDS.join(", "),
                });
            }
        };

        let path = self.kind_dir(kind).join(format!("{name}.{ext}"));
        if path.exists() {
            return Err(VbError::AlreadyExists(path.display().to_string()));
        }
        if !dry_run {
            ensure_dir(self.kind_dir(kind))?;
            std::fs::write(&path, body)?;
        }
        Ok(path)
    }
}

/// Singular kind label of a plural category directory (`agents` -> `agent`).
pub(crate) fn kind_label(dir_name: &str) -> String {
    dir_name.strip_suffix('s').unwrap_or(dir_name).to_string()
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

mod scaffold {
    use crate::error::Result;
    use crate::utils::title_case;

    pub const KINDS: [&str; 5] = ["agent", "command", "skill", "hook", "mcp"];

    pub fn agent(name: &str) -> String {
        format!(
            "# {} Agent\n\nExpert in [domain].\n\n## Capabilities\n\n- Capability 1\n- Capability 2\n\n\
             ## When to Use\n\nActivate when user needs help with [specific tasks].\n\n\
             ## Workflow\n\n1. Step 1\n2. Step 2\n",
            title_case(name)
        )
    }

    pub fn command(name: &str) -> String {
        format!(
            "# {name}\n\n[Description]\n\n## Usage\n```\n/{name} [args]\n```\n\n\
             ## Process\n\n1. Step 1\n2. Step 2\n\n## Output\n\n[What it produces]\n"
        )
    }

    pub fn skill(name: &str) -> String {
        format!(
            "---\nname: {name}\ndescription: [Description]\nversion: 1.0.0\n---\n\n# {}\n\n\
             ## Usage\n\n[How to use this skill]\n\n## References\n\n- `references/` - Reference docs\n",
            title_case(name)
        )
    }

    pub fn hook() -> Result<String> {
        let value = serde_json::json!({
            "hooks": {
                "PostToolUse": [
                    {
                        "matcher": "Edit|Write",
                        "hooks": [
                            {"type": "command", "command": "echo 'Hook triggered'"}
                        ]
                    }
                ]
            }
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn mcp(name: &str) -> Result<String> {
        let mut servers = serde_json::Map::new();
        servers.insert(
            name.to_string(),
            serde_json::json!({
                "command": "npx",
                "args": ["-y", format!("@example/{name}-mcp")],
                "env": {}
            }),
        );
        let value = serde_json::json!({ "mcpServers": servers });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CatalogFixture;

    #[test]
    fn resolve_template_prefers_markdown() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "reviewer.json", "{}");
        fixture.template("agents", "reviewer.md", "# Reviewer");

        let store = fixture.store();
        let found = store.resolve_template(TemplateKind::Agent, "reviewer").unwrap();
        assert_eq!(found.extension().unwrap(), "md");
    }

    #[test]
    fn resolve_template_falls_back_to_json() {
        let fixture = CatalogFixture::new();
        fixture.template("mcps", "stripe.json", "{}");

        let store = fixture.store();
        assert!(store.resolve_template(TemplateKind::Mcp, "stripe").is_some());
        assert!(store.resolve_template(TemplateKind::Hook, "stripe").is_none());
    }

    #[test]
    fn skill_requires_descriptor() {
        let fixture = CatalogFixture::new();
        fixture.skill("better-auth");
        fixture.file(".claude/skills/half-done/notes.md", "wip");

        let store = fixture.store();
        assert!(store.resolve_skill("better-auth").is_some());
        assert!(store.resolve_skill("half-done").is_none());
        assert!(store.resolve_skill("missing").is_none());
        assert_eq!(store.skills().unwrap().len(), 1);
    }

    #[test]
    fn template_groups_derive_kind_labels() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "a.md", "");
        fixture.template("settings", "s.json", "");

        let groups = fixture.store().template_groups().unwrap();
        let labels: Vec<_> = groups.iter().map(|g| g.kind_label.as_str()).collect();
        assert_eq!(labels, vec!["agent", "setting"]);
    }

    #[test]
    fn kind_label_drops_one_plural_s() {
        assert_eq!(kind_label("agents"), "agent");
        assert_eq!(kind_label("mcps"), "mcp");
        assert_eq!(kind_label("settings"), "setting");
        assert_eq!(kind_label("misc"), "misc");
        assert_eq!(kind_label("hookss"), "hooks");
    }

    #[test]
    fn scaffold_writes_each_kind() {
        let fixture = CatalogFixture::new();
        let store = fixture.store();

        let agent = store.create_scaffold("agent", "code-reviewer", false).unwrap();
        assert!(std::fs::read_to_string(&agent).unwrap().starts_with("# Code Reviewer Agent"));

        let mcp = store.create_scaffold("mcp", "stripe", false).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&mcp).unwrap()).unwrap();
        assert_eq!(value["mcpServers"]["stripe"]["args"][1], "@example/stripe-mcp");

        let skill = store.create_scaffold("skill", "pdf-tools", false).unwrap();
        assert!(skill.join(SKILL_FILE).is_file());
        assert!(skill.join("scripts").is_dir());
        assert!(skill.join("references").is_dir());
    }

    #[test]
    fn scaffold_rejects_unknown_kind_and_duplicates() {
        let fixture = CatalogFixture::new();
        let store = fixture.store();

        let err = store.create_scaffold("setting", "x", false).unwrap_err();
        assert!(matches!(err, VbError::UnknownTemplateType { .. }));

        store.create_scaffold("command", "ship", false).unwrap();
        let err = store.create_scaffold("command", "ship", false).unwrap_err();
        assert!(matches!(err, VbError::AlreadyExists(_)));
    }

    #[test]
    fn scaffold_dry_run_writes_nothing() {
        let fixture = CatalogFixture::new();
        let path = fixture.store().create_scaffold("hook", "lint", true).unwrap();
        assert!(!path.exists());
    }
}
