use std::fs::File;

use proptest::prelude::*;

use vibery::bundler::{kit_entries, write_kit_zip};
use vibery::registry::content_hash;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_content_hash_is_stable(content in ".*") {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, &content).unwrap();
        std::fs::write(&b, &content).unwrap();

        let hash = content_hash(&a).unwrap();
        prop_assert_eq!(hash.len(), 8);
        prop_assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        prop_assert_eq!(hash, content_hash(&b).unwrap());
    }

    #[test]
    fn test_zip_holds_every_visible_file(files in prop::collection::btree_map("[a-z]{1,6}", ".{0,40}", 1..6)) {
        let stacks = tempfile::tempdir().unwrap();
        let kit = stacks.path().join("demo");
        for (name, body) in &files {
            let path = kit.join("agents").join(format!("{name}.md"));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        std::fs::create_dir_all(kit.join(".git")).unwrap();
        std::fs::write(kit.join(".git/HEAD"), "x").unwrap();

        let out = tempfile::tempdir().unwrap();
        let (zip_path, count) = write_kit_zip(&kit, out.path()).unwrap();
        prop_assert_eq!(count, files.len());
        prop_assert_eq!(kit_entries(&kit).unwrap().len(), files.len());

        let mut archive = zip::ZipArchive::new(File::open(zip_path).unwrap()).unwrap();
        prop_assert_eq!(archive.len(), files.len());
        for (name, body) in &files {
            let mut entry = archive.by_name(&format!("demo/agents/{name}.md")).unwrap();
            let mut read = String::new();
            std::io::Read::read_to_string(&mut entry, &mut read).unwrap();
            prop_assert_eq!(&read, body);
        }
    }
}
