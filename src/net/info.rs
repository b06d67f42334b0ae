//! Read-only network facts: interface names and resolver state.

use std::fs;

use crate::error::Result;
use crate::paths::ConsolePaths;

/// Interface name prefixes that are never offered for configuration.
const EXCLUDED_PREFIXES: &[&str] = &["lo", "tap", "tun", "vmnet", "wmaster"];

/// Parse interface names out of `/proc/net/dev` content.
pub fn parse_interface_names(proc_net_dev: &str) -> Vec<String> {
    proc_net_dev
        .lines()
        .filter_map(|line| {
            let (name, _stats) = line.trim().split_once(':')?;
            Some(name.trim().to_string())
        })
        .collect()
}

/// Configurable interface names, sorted, loopback and virtual devices
/// filtered out.
pub fn filtered_interface_names(paths: &ConsolePaths) -> Result<Vec<String>> {
    let content = fs::read_to_string(&paths.proc_net_dev)?;
    let mut names: Vec<String> = parse_interface_names(&content)
        .into_iter()
        .filter(|name| !EXCLUDED_PREFIXES.iter().any(|p| name.starts_with(p)))
        .collect();
    names.sort();
    Ok(names)
}

/// Nameserver addresses from the resolver file, in file order.
pub fn nameservers(paths: &ConsolePaths) -> Result<Vec<String>> {
    if !paths.resolv_file.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&paths.resolv_file)?;
    Ok(content
        .lines()
        .filter(|line| line.starts_with("nameserver"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROC_NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  455432    1342    0    0    0     0          0         0   455432    1342    0    0    0     0       0          0
  eth0: 8872634   12630    0    0    0     0          0         0   923412    8211    0    0    0     0       0          0
  eth1:       0       0    0    0    0     0          0         0        0       0    0    0    0     0       0          0
  tun0:    1024       8    0    0    0     0          0         0     2048      16    0    0    0     0       0          0
";

    #[test]
    fn test_parse_interface_names() {
        let names = parse_interface_names(PROC_NET_DEV);
        assert_eq!(names, vec!["lo", "eth0", "eth1", "tun0"]);
    }

    #[test]
    fn test_filtered_names_exclude_virtual_devices() {
        let tmp = TempDir::new().unwrap();
        let paths = {
            let mut p = crate::paths::ConsolePaths::rooted(tmp.path());
            p.proc_net_dev = tmp.path().join("net_dev");
            p
        };
        std::fs::write(&paths.proc_net_dev, PROC_NET_DEV).unwrap();

        let names = filtered_interface_names(&paths).unwrap();
        assert_eq!(names, vec!["eth0", "eth1"]);
    }

    #[test]
    fn test_nameservers_parse_resolv_conf() {
        let tmp = TempDir::new().unwrap();
        let mut paths = crate::paths::ConsolePaths::rooted(tmp.path());
        paths.resolv_file = tmp.path().join("resolv.conf");
        std::fs::write(
            &paths.resolv_file,
            "search example.com\nnameserver 10.0.0.1\nnameserver 10.0.0.2\n",
        )
        .unwrap();

        assert_eq!(nameservers(&paths).unwrap(), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_nameservers_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mut paths = crate::paths::ConsolePaths::rooted(tmp.path());
        paths.resolv_file = tmp.path().join("absent");
        assert!(nameservers(&paths).unwrap().is_empty());
    }
}
