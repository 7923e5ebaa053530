use assert_fs::prelude::*;
use pgen_fs::{ConfigStore, NormalizedPath, io};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde::Deserialize;

#[test]
fn test_write_text_creates_parents() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("out/gcc_arm/Makefile"));

    io::write_text(&path, "all:\n").unwrap();

    temp.child("out/gcc_arm/Makefile").assert("all:\n");
}

#[test]
fn test_copy_if_absent_first_writer_wins() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a/config.h").write_str("first").unwrap();
    temp.child("b/config.h").write_str("second").unwrap();
    let dest = NormalizedPath::new(temp.path().join("portable/board/config.h"));

    let first = io::copy_if_absent(&NormalizedPath::new(temp.path().join("a/config.h")), &dest).unwrap();
    let second = io::copy_if_absent(&NormalizedPath::new(temp.path().join("b/config.h")), &dest).unwrap();

    assert!(first);
    assert!(!second);
    temp.child("portable/board/config.h").assert("first");
}

#[test]
fn test_list_files_is_flat_and_sorted() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("src/b.c").touch().unwrap();
    temp.child("src/a.c").touch().unwrap();
    temp.child("src/nested/c.c").touch().unwrap();

    let files = io::list_files(&NormalizedPath::new(temp.path().join("src")));

    assert_eq!(files, vec!["a.c".to_string(), "b.c".to_string()]);
}

#[test]
fn test_walk_files_is_recursive() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("inc/top.h").touch().unwrap();
    temp.child("inc/sub/deep.h").touch().unwrap();

    let files = io::walk_files(&NormalizedPath::new(temp.path().join("inc")));

    assert_eq!(files, vec!["sub/deep.h".to_string(), "top.h".to_string()]);
}

#[test]
fn test_remove_dir_if_exists() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("generated/Makefile").touch().unwrap();
    let dir = NormalizedPath::new(temp.path().join("generated"));

    assert!(io::remove_dir_if_exists(&dir).unwrap());
    temp.child("generated").assert(predicate::path::missing());
}

#[derive(Debug, Deserialize, PartialEq)]
struct Doc {
    name: String,
    items: Vec<u32>,
}

#[test]
fn test_config_store_formats() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("doc.yaml").write_str("name: a\nitems: [1, 2]\n").unwrap();
    temp.child("doc.json").write_str(r#"{"name": "a", "items": [1, 2]}"#).unwrap();
    temp.child("doc.toml").write_str("name = \"a\"\nitems = [1, 2]\n").unwrap();
    let expected = Doc { name: "a".into(), items: vec![1, 2] };
    let store = ConfigStore::new();

    for file in ["doc.yaml", "doc.json", "doc.toml"] {
        let doc: Doc = store.load(&NormalizedPath::new(temp.path().join(file))).unwrap();
        assert_eq!(doc, expected);
    }
}

#[test]
fn test_config_store_rejects_unknown_extension() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("doc.ini").write_str("x=1").unwrap();
    let result = ConfigStore::new().load_value(&NormalizedPath::new(temp.path().join("doc.ini")));
    assert!(matches!(result, Err(pgen_fs::Error::UnsupportedFormat { .. })));
}
