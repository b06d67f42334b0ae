//! Property-based tests for store round-trips and the naming convention.

use std::fs;

use bootconsole::conf::ConfigStore;
use bootconsole::hosts::{self, HostEntry};
use bootconsole::derive_password;
use proptest::prelude::*;
use tempfile::TempDir;

/// Keys: lowercase identifier, never comment-like.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Values: printable, no whitespace (whitespace is the default separator).
fn value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9./:-]{1,16}"
}

proptest! {
    /// ConfigStore: write then reload preserves the ordered line list.
    #[test]
    fn config_store_write_reload_roundtrip(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..12)
    ) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prop.conf");
        fs::write(&path, "").unwrap();

        let mut store = ConfigStore::load_path(&path).unwrap();
        for (key, value) in &entries {
            store.set(key, value, None);
        }
        store.write().unwrap();

        let reloaded = ConfigStore::load_path(&path).unwrap();
        prop_assert_eq!(reloaded.lines(), store.lines());
    }

    /// ConfigStore: after n sets of one key, get returns n values in order
    /// and delete removes exactly n lines.
    #[test]
    fn config_store_multivalue_set_get_delete(
        key in key_strategy(),
        values in prop::collection::vec(value_strategy(), 1..8)
    ) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prop.conf");
        fs::write(&path, "").unwrap();

        let mut store = ConfigStore::load_path(&path).unwrap();
        for value in &values {
            store.set(&key, value, None);
        }

        let got = store.get(&key);
        prop_assert_eq!(got.values(), values.iter().map(String::as_str).collect::<Vec<_>>());

        let removed = store.delete(&key);
        prop_assert_eq!(removed, values.len());
        prop_assert!(store.get(&key).is_missing());
    }

    /// Hosts block: rewrite then read returns the same entries, regardless
    /// of surrounding file content.
    #[test]
    fn hosts_block_roundtrip(
        entries in prop::collection::vec(
            (
                "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
                "[a-z][a-z0-9]{2,8}\\.[a-z]{2,6}",
                prop::collection::vec("[a-z][a-z0-9]{1,8}", 0..3),
            ),
            0..5
        )
    ) {
        let tmp = TempDir::new().unwrap();
        let hosts_path = tmp.path().join("hosts");
        fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").unwrap();

        let entries: Vec<HostEntry> = entries
            .into_iter()
            .map(|(ip, fqdn, aliases)| HostEntry::new(ip, fqdn, aliases))
            .collect();

        hosts::rewrite_block(&hosts_path, &entries).unwrap();
        let read_back = hosts::read_block(&hosts_path).unwrap();
        prop_assert_eq!(read_back, entries);

        // Unmanaged content survives the rewrite
        let content = fs::read_to_string(&hosts_path).unwrap();
        prop_assert!(content.contains("127.0.0.1\tlocalhost"));
    }

    /// Naming convention: for any conventional hostname the derived
    /// password swaps the tier tag and nothing else.
    ///
    /// The prefix alphabet avoids the tier-tag letters so the generated
    /// name contains exactly one `(db|as)su` segment.
    #[test]
    fn derived_password_swaps_only_tier_tag(
        prefix in "[bcefghijklmnopqrtuvwxyz0-9]{3,6}",
        tier in prop_oneof![Just("db"), Just("as")],
        role in prop_oneof![Just("p"), Just("t"), Just("d"), Just("q")],
    ) {
        let hostname = format!("{prefix}{tier}su{role}");
        let password = derive_password(&hostname, &[]).unwrap();
        prop_assert_eq!(password, format!("{prefix}pwsu{role}"));
    }

    /// Hostnames that stray from the convention never derive a password.
    #[test]
    fn unconventional_hostnames_fail(name in "[bcefghijklmnopqrtuvwxyz0-9]{1,12}") {
        prop_assert!(derive_password(&name, &[]).is_err());
    }
}
