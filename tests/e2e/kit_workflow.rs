//! E2E Scenario: curate a kit from templates and skills, then validate it.

use vibery::core::catalog::parse_batch_definitions;
use vibery::core::{ContentKind, MatchMode, validate_all};
use vibery::error::Result;
use vibery::test_utils::CatalogFixture;

fn seeded_fixture() -> CatalogFixture {
    let fixture = CatalogFixture::new();
    fixture.template("agents", "api-designer.md", "# API designer\n");
    fixture.template("commands", "deploy.md", "# Deploy\n");
    fixture.template("mcps", "postgres.json", "{\"mcpServers\": {}}\n");
    fixture.template("settings", "strict.json", "{}\n");
    fixture.skill("code-review");
    fixture
}

#[test]
fn test_kit_curation_round() -> Result<()> {
    let fixture = seeded_fixture();
    let catalog = fixture.catalog();

    catalog.create("backend")?;
    for item in ["api-designer", "deploy", "postgres", "code-review"] {
        catalog.add("backend", item)?;
    }

    let manifest = catalog.show("backend")?;
    assert_eq!(manifest.contents.get(ContentKind::Agents), &vec!["api-designer.md".to_string()]);
    assert_eq!(manifest.contents.get(ContentKind::Commands), &vec!["deploy.md".to_string()]);
    assert_eq!(manifest.contents.get(ContentKind::Mcps), &vec!["postgres.json".to_string()]);
    assert_eq!(manifest.contents.get(ContentKind::Skills), &vec!["code-review".to_string()]);

    let kit = fixture.kit_dir("backend");
    assert!(kit.root.join("skills/code-review/SKILL.md").is_file());
    assert!(kit.root.join("mcps/postgres.json").is_file());

    // Settings never land in a kit.
    assert!(catalog.add("backend", "strict").is_err());

    let removed = catalog.remove("backend", "deploy", MatchMode::Exact)?;
    assert_eq!(removed.removed.len(), 1);
    assert!(!kit.root.join("commands/deploy.md").exists());

    let listed = catalog.list()?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].items, 3);
    Ok(())
}

#[test]
fn test_scaffolded_kit_validates_with_warnings() -> Result<()> {
    let fixture = seeded_fixture();
    let catalog = fixture.catalog();
    catalog.create("frontend")?;
    catalog.add("frontend", "code-review")?;

    let summary = validate_all(catalog.stacks_dir())?;
    assert!(summary.all_valid());
    let kit = &summary.kits[0];
    assert_eq!(kit.items, 1);
    assert!(kit.warnings.contains(&"description is empty".to_string()));
    assert!(kit.warnings.contains(&"no tags".to_string()));
    Ok(())
}

#[test]
fn test_deleted_copy_fails_validation() -> Result<()> {
    let fixture = seeded_fixture();
    let catalog = fixture.catalog();
    catalog.create("backend")?;
    catalog.add("backend", "api-designer")?;
    std::fs::remove_file(fixture.kit_dir("backend").root.join("agents/api-designer.md"))?;

    let summary = validate_all(catalog.stacks_dir())?;
    assert!(!summary.all_valid());
    assert!(
        summary.kits[0]
            .errors
            .iter()
            .any(|error| error.contains("api-designer.md"))
    );
    Ok(())
}

#[test]
fn test_batch_creates_and_skips() -> Result<()> {
    let fixture = seeded_fixture();
    let catalog = fixture.catalog();
    catalog.create("existing")?;

    let definitions = parse_batch_definitions(
        r"
existing:
  name: Existing
api-stack:
  name: API Stack
  description: Build APIs
  tags: [api]
  agents: [api-designer]
  skills: [code-review, ghost-skill]
",
    )?;
    let outcomes = catalog.batch(&definitions)?;

    assert_eq!(outcomes.len(), 2);
    let api = outcomes.iter().find(|o| o.id == "api-stack").unwrap();
    assert!(api.created);
    assert_eq!(api.items, 2);
    assert_eq!(api.missing, vec!["skill:ghost-skill".to_string()]);
    let existing = outcomes.iter().find(|o| o.id == "existing").unwrap();
    assert!(!existing.created);

    let manifest = catalog.show("api-stack")?;
    assert_eq!(manifest.name, "API Stack");
    assert_eq!(manifest.tags, vec!["api".to_string()]);
    Ok(())
}
