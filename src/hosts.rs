//! Sentinel-delimited appliance block in the hosts file.
//!
//! The console owns exactly one region of `/etc/hosts`, bounded by fixed
//! start/end comment lines. On rewrite that region is deleted and
//! regenerated; every line outside it is preserved verbatim.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// Start sentinel of the appliance-owned block.
pub const BLOCK_START: &str = "# bootconsole hosts";
/// Warning emitted just after the start sentinel.
pub const BLOCK_WARNING: &str = "# Don't modify this part !";
/// End sentinel of the appliance-owned block.
pub const BLOCK_END: &str = "# end bootconsole hosts";

/// One record inside the appliance block: address, canonical name, short
/// name derived from it, and any aliases, tab-delimited on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub ip: String,
    pub fqdn: String,
    pub aliases: Vec<String>,
}

impl HostEntry {
    pub fn new(ip: impl Into<String>, fqdn: impl Into<String>, aliases: Vec<String>) -> Self {
        Self {
            ip: ip.into(),
            fqdn: fqdn.into(),
            aliases,
        }
    }

    /// Portion of the fully qualified name before the first domain separator.
    pub fn short_name(&self) -> &str {
        self.fqdn.split('.').next().unwrap_or(&self.fqdn)
    }

    /// Tab-delimited on-disk form: address, fqdn, short name, aliases.
    pub fn render(&self) -> String {
        let mut line = format!("{}\t{}\t{}", self.ip, self.fqdn, self.short_name());
        for alias in &self.aliases {
            line.push('\t');
            line.push_str(alias);
        }
        line
    }
}

/// Rewrite the sentinel-delimited block of `hosts_path` to hold exactly
/// `entries`, preserving all content outside the block.
pub fn rewrite_block(hosts_path: &Path, entries: &[HostEntry]) -> Result<()> {
    let existing = if hosts_path.exists() {
        fs::read_to_string(hosts_path)?
    } else {
        String::new()
    };

    let mut kept: Vec<&str> = Vec::new();
    let mut inside = false;
    for line in existing.lines() {
        if line.starts_with(BLOCK_START) {
            inside = true;
            continue;
        }
        if line.starts_with(BLOCK_END) {
            inside = false;
            continue;
        }
        if !inside {
            kept.push(line);
        }
    }

    let mut out = kept.join("\n");
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(BLOCK_START);
    out.push('\n');
    out.push_str(BLOCK_WARNING);
    out.push('\n');
    for entry in entries {
        out.push_str(&entry.render());
        out.push('\n');
    }
    out.push_str(BLOCK_END);
    out.push('\n');

    fs::write(hosts_path, out)?;
    info!(
        "rewrote appliance hosts block ({} entries) in {}",
        entries.len(),
        hosts_path.display()
    );
    Ok(())
}

/// Parse the entries currently inside the appliance block, if any.
pub fn read_block(hosts_path: &Path) -> Result<Vec<HostEntry>> {
    let content = if hosts_path.exists() {
        fs::read_to_string(hosts_path)?
    } else {
        String::new()
    };

    let mut entries = Vec::new();
    let mut inside = false;
    for line in content.lines() {
        if line.starts_with(BLOCK_START) {
            inside = true;
            continue;
        }
        if line.starts_with(BLOCK_END) {
            break;
        }
        if !inside || line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (Some(ip), Some(fqdn)) = (fields.next(), fields.next()) else {
            continue;
        };
        // Third field is the derived short name; the rest are aliases.
        let aliases: Vec<String> = fields.skip(1).map(str::to_string).collect();
        entries.push(HostEntry::new(ip, fqdn, aliases));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_short_name_is_portion_before_first_dot() {
        let entry = HostEntry::new("10.0.0.5", "abcdbsup.example.com", vec![]);
        assert_eq!(entry.short_name(), "abcdbsup");

        let bare = HostEntry::new("10.0.0.5", "plainhost", vec![]);
        assert_eq!(bare.short_name(), "plainhost");
    }

    #[test]
    fn test_rewrite_preserves_content_outside_block() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hosts");
        fs::write(
            &path,
            "127.0.0.1\tlocalhost\n# admin note\n192.168.1.9\tprinter\n",
        )
        .unwrap();

        let entries = vec![HostEntry::new(
            "10.0.0.5",
            "abcdbsup.example.com",
            vec!["oradb11g".to_string()],
        )];
        rewrite_block(&path, &entries).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("127.0.0.1\tlocalhost\n# admin note\n192.168.1.9\tprinter\n"));
        assert!(content.contains("10.0.0.5\tabcdbsup.example.com\tabcdbsup\toradb11g"));
        assert!(content.contains(BLOCK_START));
        assert!(content.contains(BLOCK_END));
    }

    #[test]
    fn test_rewrite_is_idempotent_over_old_block() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hosts");
        fs::write(&path, "127.0.0.1\tlocalhost\n").unwrap();

        let first = vec![HostEntry::new("10.0.0.5", "old.example.com", vec![])];
        rewrite_block(&path, &first).unwrap();
        let second = vec![HostEntry::new("10.0.0.6", "new.example.com", vec![])];
        rewrite_block(&path, &second).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("old.example.com"));
        assert!(content.contains("10.0.0.6\tnew.example.com\tnew"));
        assert_eq!(content.matches(BLOCK_START).count(), 1);
    }

    #[test]
    fn test_read_block_round_trips_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hosts");
        let entries = vec![
            HostEntry::new("10.0.0.5", "abcdbsup.example.com", vec!["oradb11g".to_string()]),
            HostEntry::new("10.0.0.6", "abcassup.example.com", vec!["ofm11g".to_string()]),
            HostEntry::new("10.0.0.7", "sups.example.com", vec!["sups".to_string()]),
        ];
        rewrite_block(&path, &entries).unwrap();
        assert_eq!(read_block(&path).unwrap(), entries);
    }

    #[test]
    fn test_read_block_on_unmanaged_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hosts");
        fs::write(&path, "127.0.0.1\tlocalhost\n").unwrap();
        assert!(read_block(&path).unwrap().is_empty());
    }
}
