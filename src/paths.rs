//! Filesystem locations used by the console.
//!
//! All locations live in one explicit struct passed by reference to each
//! helper, with a lifecycle scoped to a single invocation. Tests redirect
//! every path into a temporary directory.

use std::path::{Path, PathBuf};

use crate::error::{ConsoleError, Result};

/// All on-disk locations the console reads or rewrites.
#[derive(Debug, Clone)]
pub struct ConsolePaths {
    /// Ordered search directories for `ConfigStore::load` lookups.
    pub search_dirs: Vec<PathBuf>,
    /// Directory holding `ifcfg-*` interface files.
    pub ifcfg_dir: PathBuf,
    /// Global network file (`NETWORKING=`, `GATEWAY=`, `HOSTNAME=`).
    pub network_file: PathBuf,
    /// Resolver file (`nameserver`/`search` lines).
    pub resolv_file: PathBuf,
    /// Hosts file carrying the sentinel-delimited appliance block.
    pub hosts_file: PathBuf,
    /// Recorded SHA-256 checksums of tracked configuration files.
    pub csum_file: PathBuf,
    /// `/proc/partitions` (redirected in tests).
    pub proc_partitions: PathBuf,
    /// `/proc/net/dev` (redirected in tests).
    pub proc_net_dev: PathBuf,
    /// `/sys/block` root, for device rescan triggers.
    pub sys_block_dir: PathBuf,
}

impl Default for ConsolePaths {
    fn default() -> Self {
        Self {
            search_dirs: vec![
                PathBuf::from("/etc"),
                PathBuf::from("conf"),
                PathBuf::from("/etc/bootconsole"),
            ],
            ifcfg_dir: PathBuf::from("/etc/sysconfig/network-scripts"),
            network_file: PathBuf::from("/etc/sysconfig/network"),
            resolv_file: PathBuf::from("/etc/resolv.conf"),
            hosts_file: PathBuf::from("/etc/hosts"),
            csum_file: PathBuf::from("/etc/bootconsole/csums"),
            proc_partitions: PathBuf::from("/proc/partitions"),
            proc_net_dev: PathBuf::from("/proc/net/dev"),
            sys_block_dir: PathBuf::from("/sys/block"),
        }
    }
}

impl ConsolePaths {
    /// Paths rooted under one directory, for tests and chroot-style use.
    pub fn rooted(root: &Path) -> Self {
        Self {
            search_dirs: vec![root.join("etc"), root.join("etc/bootconsole")],
            ifcfg_dir: root.join("etc/sysconfig/network-scripts"),
            network_file: root.join("etc/sysconfig/network"),
            resolv_file: root.join("etc/resolv.conf"),
            hosts_file: root.join("etc/hosts"),
            csum_file: root.join("etc/bootconsole/csums"),
            proc_partitions: root.join("proc/partitions"),
            proc_net_dev: root.join("proc/net/dev"),
            sys_block_dir: root.join("sys/block"),
        }
    }

    /// Resolve a configuration file name against the search directories.
    ///
    /// Returns the first existing candidate, in search order. Fails with
    /// `NotFound` when no directory contains the file.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        for dir in &self.search_dirs {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(ConsoleError::not_found(name))
    }
}
