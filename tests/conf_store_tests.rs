//! Integration tests for the flat-file config store.

use std::fs;

use bootconsole::conf::{ConfigStore, BANNER_FOOTER, BANNER_HEADER};
use bootconsole::{ConsolePaths, Lookup};
use tempfile::TempDir;

#[test]
fn test_load_by_name_resolves_search_dirs() {
    let tmp = TempDir::new().unwrap();
    let paths = ConsolePaths::rooted(tmp.path());
    fs::create_dir_all(tmp.path().join("etc/bootconsole")).unwrap();
    fs::write(
        tmp.path().join("etc/bootconsole/bootconsole.conf"),
        "default_nic eth0\nalias ofm11g\n",
    )
    .unwrap();

    let store = ConfigStore::load("bootconsole.conf", &paths).unwrap();
    assert_eq!(store.get("default_nic"), Lookup::One("eth0".to_string()));
}

#[test]
fn test_load_missing_name_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let paths = ConsolePaths::rooted(tmp.path());
    let err = ConfigStore::load("absent.conf", &paths).unwrap_err();
    assert!(matches!(err, bootconsole::ConsoleError::NotFound(_)));
}

#[test]
fn test_positional_replace_preserves_line_order() {
    // The replace idiom: find position, delete all, re-insert at position.
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dads.conf");
    fs::write(
        &path,
        "PlsqlDatabaseUsername suas\nPlsqlDatabasePassword oldpw\nPlsqlDatabaseConnectString sups\n",
    )
    .unwrap();

    let mut store = ConfigStore::load_path(&path).unwrap();
    let pos = store.position("PlsqlDatabasePassword").unwrap();
    store.delete("PlsqlDatabasePassword");
    store.set("PlsqlDatabasePassword", "newpw", Some(pos));
    store.write().unwrap();

    let reloaded = ConfigStore::load_path(&path).unwrap();
    assert_eq!(
        reloaded.lines(),
        &[
            "PlsqlDatabaseUsername suas",
            "PlsqlDatabasePassword newpw",
            "PlsqlDatabaseConnectString sups",
        ]
    );
}

#[test]
fn test_written_file_carries_banner_block() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("app.conf");
    fs::write(&path, "key value\n").unwrap();

    let store = ConfigStore::load_path(&path).unwrap();
    store.write().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with(BANNER_HEADER));
    assert!(content.trim_end().ends_with(BANNER_FOOTER));
    assert!(content.contains("key value"));
}

#[test]
fn test_multi_value_keys_survive_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("app.conf");
    fs::write(&path, "peer one\n").unwrap();

    let mut store = ConfigStore::load_path(&path).unwrap();
    store.set("peer", "two", None);
    store.set("peer", "three", None);
    store.write().unwrap();

    let reloaded = ConfigStore::load_path(&path).unwrap();
    assert_eq!(reloaded.get("peer").values(), vec!["one", "two", "three"]);
}
