//! E2E Scenario: publish templates and the website through scripted tools.

use vibery::config::Config;
use vibery::publish::Publisher;
use vibery::test_utils::{CatalogFixture, FakeRunner};

fn publishable_fixture() -> CatalogFixture {
    let fixture = CatalogFixture::new();
    fixture.template("agents", "api-designer.md", "# API designer\n");
    fixture.file("templates-repo/.git/HEAD", "ref: refs/heads/main\n");
    fixture.file("website/package.json", "{\"name\": \"site\"}\n");
    fixture.file("website/node_modules/.keep", "");
    fixture.file("cli/package.json", "{\"name\": \"vibery\", \"version\": \"0.3.0\"}\n");
    fixture
}

#[test]
fn test_publish_runs_every_step() {
    let fixture = publishable_fixture();
    let paths = fixture.paths();
    let config = Config::default();
    let runner = FakeRunner::new().respond("git status", 0, " M agents/api-designer.md\n", "");

    let report = Publisher::new(&paths, &config.publish, &runner).publish(true);

    assert!(report.all_ok(), "{report:?}");
    assert_eq!(report.steps.len(), 3);
    assert!(fixture.root.join("templates-repo/agents/api-designer.md").is_file());
    assert!(runner.ran("git push origin main"));
    assert!(runner.ran("npm run build"));
    assert!(runner.ran("npx wrangler pages deploy dist --project-name=vibery"));
    assert!(runner.ran("npm publish"));
}

#[test]
fn test_wrangler_auth_failure_is_partial() {
    let fixture = publishable_fixture();
    let paths = fixture.paths();
    let config = Config::default();
    let runner = FakeRunner::new()
        .respond("git status", 0, "", "")
        .respond("npx wrangler", 1, "", "Authentication error: not logged in");

    let report = Publisher::new(&paths, &config.publish, &runner).publish(false);

    assert_eq!(report.failed(), vec!["website"]);
    let website = &report.steps[1];
    assert_eq!(website.hint.as_deref(), Some("npx wrangler login"));
    assert_eq!(report.steps[0].detail, "no changes to push");
}

#[test]
fn test_dry_run_publish_runs_nothing() {
    let fixture = publishable_fixture();
    let before = fixture.snapshot();
    let paths = fixture.paths();
    let config = Config::default();
    let runner = FakeRunner::new();

    let report = Publisher::new(&paths, &config.publish, &runner)
        .with_dry_run(true)
        .publish(true);

    assert!(report.all_ok(), "{report:?}");
    assert!(runner.calls().is_empty());
    assert_eq!(fixture.snapshot(), before);
}
