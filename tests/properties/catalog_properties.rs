use proptest::prelude::*;

use vibery::core::manifest::DEFAULT_VERSION;
use vibery::core::{MatchMode, validate_all};
use vibery::test_utils::CatalogFixture;

fn kit_id() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9-]{0,15}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_created_kit_lists_empty(id in kit_id()) {
        let fixture = CatalogFixture::new();
        let catalog = fixture.catalog();
        catalog.create(&id).unwrap();

        let listed = catalog.list().unwrap();
        prop_assert_eq!(listed.len(), 1);
        prop_assert_eq!(&listed[0].id, &id);
        prop_assert_eq!(listed[0].items, 0);
        prop_assert_eq!(listed[0].version.as_str(), DEFAULT_VERSION);
    }

    #[test]
    fn test_dry_run_never_touches_disk(id in kit_id(), item in "[a-z]{1,8}") {
        let fixture = CatalogFixture::new();
        fixture.template("agents", &format!("{item}.md"), "# agent\n");
        fixture.catalog().create(&id).unwrap();
        let before = fixture.snapshot();

        let catalog = fixture.catalog().with_dry_run(true);
        catalog.add(&id, &item).unwrap();
        catalog.remove(&id, &item, MatchMode::Substring).unwrap();
        let copy_id = format!("{id}-copy");
        prop_assert!(catalog.create(&copy_id).is_ok());

        prop_assert_eq!(fixture.snapshot(), before);
    }

    #[test]
    fn test_add_keeps_kit_valid(names in prop::collection::btree_set("[a-z]{1,8}", 1..5)) {
        let fixture = CatalogFixture::new();
        for name in &names {
            fixture.template("commands", &format!("{name}.md"), "# command\n");
        }
        let catalog = fixture.catalog();
        catalog.create("kit").unwrap();
        for name in &names {
            catalog.add("kit", name).unwrap();
            // Re-adding never duplicates.
            catalog.add("kit", name).unwrap();
        }

        let summary = validate_all(catalog.stacks_dir()).unwrap();
        prop_assert!(summary.all_valid());
        prop_assert_eq!(summary.total_items(), names.len());
        prop_assert_eq!(catalog.list().unwrap()[0].items, names.len());
    }

    #[test]
    fn test_invalid_ids_rejected(id in "[A-Z_ ./][A-Za-z0-9_ ./-]{0,8}") {
        let fixture = CatalogFixture::new();
        prop_assert!(fixture.catalog().create(&id).is_err());
        prop_assert!(!fixture.root.join("stacks").exists());
    }
}
