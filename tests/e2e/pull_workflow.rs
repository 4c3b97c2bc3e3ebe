//! E2E Scenario: pull templates from a local directory and a cloned remote.

use std::path::Path;

use vibery::error::{Result, VbError};
use vibery::import::{Importer, Source};
use vibery::test_utils::{CatalogFixture, FakeRunner};

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn populate_source(root: &Path) {
    write(&root.join(".claude/skills/tdd/SKILL.md"), "# tdd\n");
    write(&root.join(".claude/skills/notes/README.md"), "no descriptor\n");
    write(&root.join(".claude/agents/reviewer.md"), "# reviewer\n");
    write(&root.join("templates/hooks/format.json"), "{}\n");
}

#[test]
fn test_local_pull_then_add_to_kit() -> Result<()> {
    let fixture = CatalogFixture::new();
    let source = tempfile::tempdir()?;
    populate_source(source.path());

    let store = fixture.store();
    let runner = FakeRunner::new();
    let imported = Importer::new(&store, &runner).pull(&Source::Local(source.path().to_path_buf()))?;

    let names: Vec<&str> = imported.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["tdd", "reviewer", "format"]);
    assert!(runner.calls().is_empty());

    let catalog = fixture.catalog();
    catalog.create("quality")?;
    catalog.add("quality", "tdd")?;
    catalog.add("quality", "reviewer")?;
    catalog.add("quality", "format")?;
    assert_eq!(catalog.list()?[0].items, 3);
    Ok(())
}

#[test]
fn test_remote_pull_clones_shallow() -> Result<()> {
    let fixture = CatalogFixture::new();
    let store = fixture.store();
    let runner = FakeRunner::new().on("git clone", |args, _| {
        populate_source(Path::new(args[4]));
    });

    let source = Source::parse("https://example.com/templates.git")?;
    let imported = Importer::new(&store, &runner).pull(&source)?;

    assert_eq!(imported.len(), 3);
    let lines = runner.lines();
    assert!(lines[0].starts_with("git clone --depth 1 https://example.com/templates.git"));
    assert!(fixture.root.join(".claude/skills/tdd/SKILL.md").is_file());
    assert!(fixture.root.join("templates/agents/reviewer.md").is_file());
    Ok(())
}

#[test]
fn test_failed_clone_is_reported() {
    let fixture = CatalogFixture::new();
    let store = fixture.store();
    let runner = FakeRunner::new().respond("git clone", 128, "", "fatal: repository not found");

    let err = Importer::new(&store, &runner)
        .pull(&Source::Remote("git@example.com:missing.git".to_string()))
        .unwrap_err();
    assert!(matches!(err, VbError::CloneFailed(_)));
}
