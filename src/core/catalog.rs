//! Kit catalog mutations: create, add, remove, list, batch.
//!
//! Every mutation touches the physical copy first and the manifest second
//! (copy before manifest write, delete before manifest removal). An
//! interrupted run therefore leaves either an orphaned file or a dangling
//! reference, both of which `validate` reports, never a half-written
//! manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::asset::{AssetStore, ContentKind, file_stem};
use super::manifest::{KitDir, KitManifest, prepend_scaffold, prepend_summary};
use super::resolve::{DEFAULT_ORDER, ResolvedItem, Strategy, resolve_item};
use crate::error::{Result, VbError};
use crate::utils::{copy_file, ensure_dir, remove_path, replace_dir};

const SLUG_PATTERN: &str = r"^[a-z0-9][a-z0-9-]*$";

/// How `remove` matches stored references against the requested name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Any reference containing the name. `auth` also hits
    /// `add-authentication-system.md`.
    #[default]
    Substring,
    /// The full reference or its stem.
    Exact,
}

impl MatchMode {
    #[must_use]
    pub fn matches(self, reference: &str, needle: &str) -> bool {
        match self {
            Self::Substring => reference.contains(needle),
            Self::Exact => reference == needle || file_stem(Path::new(reference)) == needle,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateReport {
    pub id: String,
    pub path: PathBuf,
    pub manifest: KitManifest,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddReport {
    pub kit: String,
    pub kind: ContentKind,
    pub reference: String,
    pub destination: PathBuf,
    /// False when the manifest already listed this reference.
    pub newly_listed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedItem {
    pub kind: ContentKind,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveReport {
    pub kit: String,
    pub removed: Vec<RemovedItem>,
}

impl RemoveReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KitSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub items: usize,
}

/// One entry of a `kit batch` definitions file. Item names carry no extension.
#[derive(Debug, Clone, Deserialize)]
pub struct KitDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
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
}

fn default_category() -> String {
    super::manifest::DEFAULT_CATEGORY.to_string()
}

impl KitDefinition {
    fn requested(&self, kind: ContentKind) -> &[String] {
        match kind {
            ContentKind::Agents => &self.agents,
            ContentKind::Commands => &self.commands,
            ContentKind::Skills => &self.skills,
            ContentKind::Hooks => &self.hooks,
            ContentKind::Mcps => &self.mcps,
        }
    }
}

/// Kit id -> definition. Accepts YAML or JSON.
pub type BatchDefinitions = BTreeMap<String, KitDefinition>;

pub fn parse_batch_definitions(raw: &str) -> Result<BatchDefinitions> {
    serde_yaml::from_str(raw)
        .map_err(|err| VbError::ValidationFailed(format!("kit definitions: {err}")))
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub id: String,
    /// False when the kit directory already existed and was skipped.
    pub created: bool,
    pub items: usize,
    /// `kind:name` for every requested item that did not resolve.
    pub missing: Vec<String>,
}

/// Catalog operations over the stacks root.
#[derive(Debug, Clone)]
pub struct Catalog {
    store: AssetStore,
    stacks_dir: PathBuf,
    dry_run: bool,
    order: Vec<Strategy>,
}

impl Catalog {
    pub fn new(store: AssetStore, stacks_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            stacks_dir: stacks_dir.into(),
            dry_run: false,
            order: DEFAULT_ORDER.to_vec(),
        }
    }

    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn with_resolution_order(mut self, order: Vec<Strategy>) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn stacks_dir(&self) -> &Path {
        &self.stacks_dir
    }

    #[must_use]
    pub fn kit_dir(&self, id: &str) -> KitDir {
        KitDir::new(&self.stacks_dir, id)
    }

    fn load_kit(&self, id: &str) -> Result<(KitDir, KitManifest)> {
        let kit = self.kit_dir(id);
        let manifest = KitManifest::load(&kit.manifest_path())?
            .ok_or_else(|| VbError::KitNotFound(id.to_string()))?;
        Ok((kit, manifest))
    }

    /// Scaffold a kit. Never merges into an existing directory.
    pub fn create(&self, id: &str) -> Result<CreateReport> {
        validate_slug(id)?;
        let kit = self.kit_dir(id);
        if kit.root.exists() {
            return Err(VbError::AlreadyExists(format!("kit {id}")));
        }

        let manifest = KitManifest::scaffold(id);
        if !self.dry_run {
            for kind in ContentKind::ALL {
                ensure_dir(kit.content_dir(kind))?;
            }
            manifest.save(&kit.manifest_path())?;
            std::fs::write(kit.prepend_path(), prepend_scaffold(&manifest))?;
        }
        info!(kit = id, dry_run = self.dry_run, "created kit");

        Ok(CreateReport {
            id: id.to_string(),
            path: kit.root,
            manifest,
        })
    }

    /// Copy a skill or template into the kit and list it in the manifest.
    pub fn add(&self, kit_id: &str, item: &str) -> Result<AddReport> {
        let (kit, mut manifest) = self.load_kit(kit_id)?;
        let resolved = resolve_item(&self.store, item, &self.order)
            .ok_or_else(|| VbError::ItemNotFound(item.to_string()))?;
        debug!(kit = kit_id, item, kind = %resolved.kind, source = %resolved.source.display(), "resolved item");

        let reference = resolved.reference();
        let destination = kit.content_dir(resolved.kind).join(&reference);
        if !self.dry_run {
            copy_resolved(&resolved, &destination)?;
        }

        let newly_listed = manifest.contents.insert(resolved.kind, &reference);
        if !self.dry_run {
            manifest.save(&kit.manifest_path())?;
        }
        info!(kit = kit_id, %reference, newly_listed, "added item to kit");

        Ok(AddReport {
            kit: kit_id.to_string(),
            kind: resolved.kind,
            reference,
            destination,
            newly_listed,
        })
    }

    /// Drop every matching reference across all kinds, deleting its copy.
    pub fn remove(&self, kit_id: &str, item: &str, mode: MatchMode) -> Result<RemoveReport> {
        let (kit, mut manifest) = self.load_kit(kit_id)?;
        let mut removed = Vec::new();

        for kind in ContentKind::ALL {
            let matching: Vec<String> = manifest
                .contents
                .get(kind)
                .iter()
                .filter(|reference| mode.matches(reference, item))
                .cloned()
                .collect();

            for reference in matching {
                if !self.dry_run {
                    remove_path(&kit.content_dir(kind).join(&reference))?;
                }
                manifest
                    .contents
                    .get_mut(kind)
                    .retain(|existing| existing != &reference);
                removed.push(RemovedItem { kind, reference });
            }
        }

        if removed.is_empty() {
            debug!(kit = kit_id, item, "nothing matched");
        } else if !self.dry_run {
            manifest.save(&kit.manifest_path())?;
        }
        info!(kit = kit_id, item, removed = removed.len(), "removed from kit");

        Ok(RemoveReport {
            kit: kit_id.to_string(),
            removed,
        })
    }

    /// Summaries of every kit with a manifest, sorted by id.
    pub fn list(&self) -> Result<Vec<KitSummary>> {
        let mut kits = Vec::new();
        for kit in KitDir::discover(&self.stacks_dir)? {
            let id = kit.id();
            let Some(manifest) = KitManifest::load(&kit.manifest_path())? else {
                continue;
            };
            kits.push(KitSummary {
                name: if manifest.name.is_empty() {
                    id.clone()
                } else {
                    manifest.name.clone()
                },
                version: manifest.version.clone(),
                description: manifest.description.clone(),
                items: manifest.contents.total(),
                id,
            });
        }
        Ok(kits)
    }

    /// Full manifest of one kit.
    pub fn show(&self, id: &str) -> Result<KitManifest> {
        self.load_kit(id).map(|(_, manifest)| manifest)
    }

    /// Create every kit in `definitions` that does not exist yet.
    pub fn batch(&self, definitions: &BatchDefinitions) -> Result<Vec<BatchOutcome>> {
        let mut outcomes = Vec::new();
        for (id, definition) in definitions {
            let kit = self.kit_dir(id);
            if kit.root.exists() {
                warn!(kit = %id, "kit exists, skipping");
                outcomes.push(BatchOutcome {
                    id: id.clone(),
                    created: false,
                    items: 0,
                    missing: Vec::new(),
                });
                continue;
            }
            outcomes.push(self.create_from_definition(id, definition)?);
        }
        Ok(outcomes)
    }

    fn create_from_definition(&self, id: &str, definition: &KitDefinition) -> Result<BatchOutcome> {
        validate_slug(id)?;
        let kit = self.kit_dir(id);
        let mut manifest = KitManifest::scaffold(id);
        manifest.name.clone_from(&definition.name);
        manifest.description.clone_from(&definition.description);
        manifest.category.clone_from(&definition.category);
        manifest.tags.clone_from(&definition.tags);

        if !self.dry_run {
            for kind in ContentKind::ALL {
                ensure_dir(kit.content_dir(kind))?;
            }
        }

        let mut missing = Vec::new();
        for kind in ContentKind::ALL {
            let strategy = match kind.template_kind() {
                Some(template) => Strategy::Template(template),
                None => Strategy::Skill,
            };
            for name in definition.requested(kind) {
                let Some(resolved) = strategy.attempt(&self.store, name) else {
                    missing.push(format!("{}:{name}", kind.singular()));
                    continue;
                };
                let reference = resolved.reference();
                if !self.dry_run {
                    copy_resolved(&resolved, &kit.content_dir(kind).join(&reference))?;
                }
                manifest.contents.insert(kind, &reference);
            }
        }

        if !self.dry_run {
            manifest.save(&kit.manifest_path())?;
            std::fs::write(
                kit.prepend_path(),
                prepend_summary(
                    &manifest,
                    &definition.agents,
                    &definition.skills,
                    &definition.commands,
                ),
            )?;
        }

        let items = manifest.contents.total();
        info!(kit = id, items, missing = missing.len(), "batch-created kit");
        Ok(BatchOutcome {
            id: id.to_string(),
            created: true,
            items,
            missing,
        })
    }
}

fn copy_resolved(resolved: &ResolvedItem, destination: &Path) -> Result<()> {
    match resolved.kind {
        ContentKind::Skills => replace_dir(&resolved.source, destination),
        _ => copy_file(&resolved.source, destination),
    }
}

fn validate_slug(id: &str) -> Result<()> {
    let slug = Regex::new(SLUG_PATTERN).map_err(|err| VbError::Config(err.to_string()))?;
    if slug.is_match(id) {
        Ok(())
    } else {
        Err(VbError::ValidationFailed(format!(
            "kit id {id:?} must be lowercase letters, digits and dashes"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CatalogFixture;

    #[test]
    fn create_scaffolds_layout() {
        let fixture = CatalogFixture::new();
        let report = fixture.catalog().create("backend-stack").unwrap();

        let kit = fixture.kit_dir("backend-stack");
        assert_eq!(report.path, kit.root);
        for kind in ContentKind::ALL {
            assert!(kit.content_dir(kind).is_dir(), "{kind} dir missing");
        }
        assert!(kit.prepend_path().is_file());
        let manifest = KitManifest::load(&kit.manifest_path()).unwrap().unwrap();
        assert_eq!(manifest, KitManifest::scaffold("backend-stack"));
    }

    #[test]
    fn create_twice_is_already_exists_and_untouched() {
        let fixture = CatalogFixture::new();
        let catalog = fixture.catalog();
        catalog.create("api").unwrap();
        let path = fixture.kit_dir("api").manifest_path();
        let before = std::fs::read(&path).unwrap();

        let err = catalog.create("api").unwrap_err();
        assert!(matches!(err, VbError::AlreadyExists(_)));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn create_rejects_non_slug_ids() {
        let fixture = CatalogFixture::new();
        let err = fixture.catalog().create("Bad Name").unwrap_err();
        assert!(matches!(err, VbError::ValidationFailed(_)));
        assert!(!fixture.kit_dir("Bad Name").root.exists());
    }

    #[test]
    fn add_skill_copies_directory_once() {
        let fixture = CatalogFixture::new();
        fixture.skill("better-auth");
        fixture.file(".claude/skills/better-auth/scripts/setup.sh", "echo hi");
        let catalog = fixture.catalog();
        catalog.create("auth-kit").unwrap();

        let report = catalog.add("auth-kit", "better-auth").unwrap();
        assert_eq!(report.kind, ContentKind::Skills);
        assert!(report.newly_listed);

        let again = catalog.add("auth-kit", "better-auth").unwrap();
        assert!(!again.newly_listed);

        let kit = fixture.kit_dir("auth-kit");
        assert!(kit.root.join("skills/better-auth/SKILL.md").is_file());
        assert!(kit.root.join("skills/better-auth/scripts/setup.sh").is_file());
        let manifest = catalog.show("auth-kit").unwrap();
        assert_eq!(manifest.contents.skills, vec!["better-auth"]);
    }

    #[test]
    fn add_template_records_full_filename() {
        let fixture = CatalogFixture::new();
        fixture.template("mcps", "stripe.json", "{\"mcpServers\":{}}");
        let catalog = fixture.catalog();
        catalog.create("payments").unwrap();

        let report = catalog.add("payments", "stripe").unwrap();
        assert_eq!(report.reference, "stripe.json");
        assert!(fixture.kit_dir("payments").root.join("mcps/stripe.json").is_file());
        assert_eq!(catalog.show("payments").unwrap().contents.mcps, vec!["stripe.json"]);
    }

    #[test]
    fn add_overwrites_existing_copy() {
        let fixture = CatalogFixture::new();
        let source = fixture.template("agents", "reviewer.md", "v1");
        let catalog = fixture.catalog();
        catalog.create("k").unwrap();
        catalog.add("k", "reviewer").unwrap();

        std::fs::write(&source, "v2").unwrap();
        catalog.add("k", "reviewer").unwrap();

        let copy = fixture.kit_dir("k").root.join("agents/reviewer.md");
        assert_eq!(std::fs::read_to_string(copy).unwrap(), "v2");
    }

    #[test]
    fn add_reports_missing_kit_and_item() {
        let fixture = CatalogFixture::new();
        let catalog = fixture.catalog();
        assert!(matches!(
            catalog.add("ghost", "x"),
            Err(VbError::KitNotFound(_))
        ));

        catalog.create("k").unwrap();
        assert!(matches!(
            catalog.add("k", "nothing-here"),
            Err(VbError::ItemNotFound(_))
        ));
    }

    #[test]
    fn remove_uses_substring_match_by_default() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "foo-agent.md", "# foo");
        let catalog = fixture.catalog();
        catalog.create("k").unwrap();
        catalog.add("k", "foo-agent").unwrap();

        let report = catalog.remove("k", "foo", MatchMode::Substring).unwrap();
        assert_eq!(
            report.removed,
            vec![RemovedItem {
                kind: ContentKind::Agents,
                reference: "foo-agent.md".to_string(),
            }]
        );
        assert!(!fixture.kit_dir("k").root.join("agents/foo-agent.md").exists());
        assert!(catalog.show("k").unwrap().contents.agents.is_empty());
    }

    #[test]
    fn remove_substring_hits_every_kind() {
        let fixture = CatalogFixture::new();
        fixture.template("commands", "add-authentication-system.md", "");
        fixture.skill("better-auth");
        let catalog = fixture.catalog();
        catalog.create("k").unwrap();
        catalog.add("k", "add-authentication-system").unwrap();
        catalog.add("k", "better-auth").unwrap();

        let report = catalog.remove("k", "auth", MatchMode::Substring).unwrap();
        assert_eq!(report.removed.len(), 2);
        assert!(!fixture.kit_dir("k").root.join("skills/better-auth").exists());
        assert!(catalog.show("k").unwrap().contents.is_empty());
    }

    #[test]
    fn remove_exact_leaves_overlapping_names() {
        let fixture = CatalogFixture::new();
        fixture.template("commands", "add-authentication-system.md", "");
        fixture.template("commands", "auth.md", "");
        let catalog = fixture.catalog();
        catalog.create("k").unwrap();
        catalog.add("k", "add-authentication-system").unwrap();
        catalog.add("k", "auth").unwrap();

        let report = catalog.remove("k", "auth", MatchMode::Exact).unwrap();
        assert_eq!(report.removed.len(), 1);
        assert_eq!(
            catalog.show("k").unwrap().contents.commands,
            vec!["add-authentication-system.md"]
        );
    }

    #[test]
    fn remove_without_match_is_empty_report() {
        let fixture = CatalogFixture::new();
        let catalog = fixture.catalog();
        catalog.create("k").unwrap();
        let before = std::fs::read(fixture.kit_dir("k").manifest_path()).unwrap();

        let report = catalog.remove("k", "zzz", MatchMode::Substring).unwrap();
        assert!(report.is_empty());
        assert_eq!(std::fs::read(fixture.kit_dir("k").manifest_path()).unwrap(), before);
    }

    #[test]
    fn dry_run_mutations_touch_nothing() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "a.md", "");
        fixture.catalog().create("k").unwrap();
        let manifest_path = fixture.kit_dir("k").manifest_path();
        let before = std::fs::read(&manifest_path).unwrap();

        let dry = fixture.catalog().with_dry_run(true);
        let added = dry.add("k", "a").unwrap();
        assert!(added.newly_listed);
        assert!(!added.destination.exists());
        assert_eq!(std::fs::read(&manifest_path).unwrap(), before);

        dry.create("other").unwrap();
        assert!(!fixture.kit_dir("other").root.exists());
    }

    #[test]
    fn list_summarises_sorted_kits() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "a.md", "");
        let catalog = fixture.catalog();
        catalog.create("zeta").unwrap();
        catalog.create("alpha").unwrap();
        catalog.add("alpha", "a").unwrap();
        std::fs::create_dir_all(fixture.paths().stacks.join("no-manifest")).unwrap();

        let kits = catalog.list().unwrap();
        let ids: Vec<_> = kits.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
        assert_eq!(kits[0].items, 1);
        assert_eq!(kits[1].name, "Zeta");
    }

    #[test]
    fn batch_creates_and_reports_missing() {
        let fixture = CatalogFixture::new();
        fixture.template("agents", "tailwind-pro.md", "");
        fixture.template("mcps", "stripe.json", "{}");
        fixture.skill("ui-styling");
        let catalog = fixture.catalog();
        catalog.create("existing").unwrap();

        let definitions = parse_batch_definitions(
            r"
brand-design:
  name: Brand & Design
  description: Consistent brand identity
  category: design
  tags: [design, branding]
  agents: [tailwind-pro, ghost-agent]
  skills: [ui-styling]
  mcps: [stripe]
existing:
  name: Existing
",
        )
        .unwrap();

        let outcomes = catalog.batch(&definitions).unwrap();
        assert_eq!(outcomes.len(), 2);
        let brand = outcomes.iter().find(|o| o.id == "brand-design").unwrap();
        assert!(brand.created);
        assert_eq!(brand.items, 3);
        assert_eq!(brand.missing, vec!["agent:ghost-agent"]);
        let existing = outcomes.iter().find(|o| o.id == "existing").unwrap();
        assert!(!existing.created);

        let manifest = catalog.show("brand-design").unwrap();
        assert_eq!(manifest.name, "Brand & Design");
        assert_eq!(manifest.category, "design");
        assert_eq!(manifest.contents.agents, vec!["tailwind-pro.md"]);
        let prepend =
            std::fs::read_to_string(fixture.kit_dir("brand-design").prepend_path()).unwrap();
        assert!(prepend.contains("- Skills: ui-styling"));
        assert!(prepend.contains("- Commands: None"));
    }

    #[test]
    fn resolution_order_decides_name_clashes() {
        let fixture = CatalogFixture::new();
        fixture.skill("review");
        fixture.template("agents", "review.md", "# review");
        fixture.catalog().create("k").unwrap();

        let report = fixture.catalog().add("k", "review").unwrap();
        assert_eq!(report.kind, ContentKind::Skills);

        let agents_first = fixture.catalog().with_resolution_order(vec![
            Strategy::Template(crate::core::TemplateKind::Agent),
            Strategy::Skill,
        ]);
        let report = agents_first.add("k", "review").unwrap();
        assert_eq!(report.kind, ContentKind::Agents);
        assert_eq!(report.reference, "review.md");
    }

    #[test]
    fn exact_mode_matches_stem() {
        assert!(MatchMode::Exact.matches("foo-agent.md", "foo-agent"));
        assert!(MatchMode::Exact.matches("better-auth", "better-auth"));
        assert!(!MatchMode::Exact.matches("foo-agent.md", "foo"));
        assert!(MatchMode::Substring.matches("foo-agent.md", "foo"));
    }

    #[test]
    fn list_tolerates_null_description() {
        let fixture = CatalogFixture::new();
        fixture.catalog().create("good").unwrap();
        fixture.file(
            "stacks/odd/kit.json",
            r#"{"id":"odd","name":"Odd","description":null,"contents":{}}"#,
        );

        let kits = fixture.catalog().list().unwrap();
        assert_eq!(kits.len(), 2);
        let odd = kits.iter().find(|kit| kit.id == "odd").unwrap();
        assert_eq!(odd.name, "Odd");
        assert_eq!(odd.description, "");
        assert!(kits.iter().any(|kit| kit.id == "good"));
        assert!(fixture.catalog().show("odd").is_ok());
    }
}
