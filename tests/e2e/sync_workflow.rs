//! E2E Scenario: regenerate registries, zips and website data from a catalog.

use std::fs::File;

use chrono::{Local, TimeZone};
use serde_json::Value;
use vibery::error::Result;
use vibery::registry::{RegistryGenerator, Stamp};
use vibery::test_utils::CatalogFixture;

fn fixed_stamp() -> Stamp {
    Stamp::at(Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap())
}

fn read_json(fixture: &CatalogFixture, relative: &str) -> Value {
    serde_json::from_str(&std::fs::read_to_string(fixture.root.join(relative)).unwrap()).unwrap()
}

fn curated_fixture() -> Result<CatalogFixture> {
    let fixture = CatalogFixture::new();
    fixture.template("agents", "api-designer.md", "# API designer\n");
    fixture.skill("code-review");
    let catalog = fixture.catalog();
    catalog.create("backend")?;
    catalog.add("backend", "api-designer")?;
    catalog.add("backend", "code-review")?;
    fixture.file("stacks/backend/USE-CASES.md", "Ship REST services\n");
    fixture.file("stacks/backend/.scratch/notes.md", "private\n");
    Ok(fixture)
}

#[test]
fn test_full_sync() -> Result<()> {
    let fixture = curated_fixture()?;
    let paths = fixture.paths();
    let report = RegistryGenerator::new(&paths, "/kits")
        .with_stamp(fixed_stamp())
        .sync()?;

    assert_eq!(report.templates, vec!["api-designer", "code-review"]);
    assert_eq!(report.kits, vec!["backend"]);
    assert_eq!(report.kit_items, 2);
    assert_eq!(report.total(), 4);

    let registry = read_json(&fixture, "cli/registry.json");
    assert_eq!(registry["version"], "20260314");
    assert_eq!(registry["templates"][0]["type"], "agent");
    assert_eq!(registry["templates"][0]["hash"].as_str().unwrap().len(), 8);
    assert_eq!(registry["templates"][1]["type"], "skill");

    let kits = read_json(&fixture, "cli/kits.json");
    assert_eq!(kits["kits"][0]["path"], "stacks/backend");
    assert_eq!(kits["kits"][0]["item_count"], 2);

    let website = read_json(&fixture, "website/src/data/kits.json");
    let kit = &website["kits"][0];
    assert_eq!(kit["downloadUrl"], "/kits/backend.zip");
    assert_eq!(kit["itemCount"], 2);
    assert_eq!(kit["useCases"], "Ship REST services\n");
    assert!(website["lastUpdated"].as_str().unwrap().starts_with("2026-03-14T09:30:00"));

    let archive = zip::ZipArchive::new(File::open(fixture.root.join("website/public/kits/backend.zip"))?)?;
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&"backend/kit.json"));
    assert!(names.contains(&"backend/skills/code-review/SKILL.md"));
    assert!(names.iter().all(|name| !name.contains(".scratch")));
    Ok(())
}

#[test]
fn test_dry_run_sync_reports_without_writing() -> Result<()> {
    let fixture = curated_fixture()?;
    let before = fixture.snapshot();
    let paths = fixture.paths();

    let report = RegistryGenerator::new(&paths, "/kits")
        .with_dry_run(true)
        .with_stamp(fixed_stamp())
        .sync()?;

    assert!(report.dry_run);
    assert_eq!(report.zips, vec!["backend"]);
    assert_eq!(fixture.snapshot(), before);
    Ok(())
}

#[test]
fn test_sync_is_repeatable() -> Result<()> {
    let fixture = curated_fixture()?;
    let paths = fixture.paths();
    let generator = RegistryGenerator::new(&paths, "/kits").with_stamp(fixed_stamp());

    generator.sync()?;
    let first = read_json(&fixture, "cli/registry.json");
    generator.sync()?;
    assert_eq!(read_json(&fixture, "cli/registry.json"), first);
    Ok(())
}
