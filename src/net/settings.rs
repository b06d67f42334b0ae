//! Rewriting of `ifcfg-*`, the global network file and the resolver file.
//!
//! The console only ever overwrites files that carry its managed-file
//! marker. A file without the marker belongs to the administrator and the
//! write is refused outright, leaving the file untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::error::{ConsoleError, Result};
use crate::paths::ConsolePaths;
use crate::runner::CommandRunner;

/// Managed-file marker proving a config file is owned by this tool.
pub const MANAGED_HEADER: &str = "# BOOTCONSOLE INTERFACES";
/// Warning line written right after the marker.
pub const MANAGED_WARNING: &str = "# Don't modify this part !";

/// Boot protocol of one interface; Display/FromStr use ifcfg spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BootProto {
    Dhcp,
    /// Static addressing (`BOOTPROTO=none` in ifcfg terms).
    #[strum(to_string = "none", serialize = "static")]
    Static,
    Manual,
}

/// Fixed schema for one interface block.
///
/// Known ifcfg keys map to typed fields; anything else survives in the
/// overflow map so a rewrite never silently drops an administrator's key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceConfig {
    pub device: String,
    pub bootproto: Option<BootProto>,
    pub ipaddr: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub hwaddr: Option<String>,
    pub onboot: bool,
    /// Unknown keys, preserved verbatim.
    pub extra: BTreeMap<String, String>,
}

impl InterfaceConfig {
    /// Fold one `KEY=VALUE` line into the schema.
    fn absorb(&mut self, key: &str, value: &str) {
        match key {
            "DEVICE" => self.device = value.to_string(),
            "BOOTPROTO" => self.bootproto = value.parse().ok(),
            "IPADDR" => self.ipaddr = Some(value.to_string()),
            "NETMASK" => self.netmask = Some(value.to_string()),
            "GATEWAY" => self.gateway = Some(value.to_string()),
            "HWADDR" => self.hwaddr = Some(value.to_string()),
            "ONBOOT" => self.onboot = value.eq_ignore_ascii_case("yes"),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Render back to ifcfg lines, fixed fields first, overflow keys last.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("DEVICE={}", self.device)];
        if let Some(proto) = self.bootproto {
            lines.push(format!("BOOTPROTO={proto}"));
        }
        if let Some(ref v) = self.ipaddr {
            lines.push(format!("IPADDR={v}"));
        }
        if let Some(ref v) = self.netmask {
            lines.push(format!("NETMASK={v}"));
        }
        if let Some(ref v) = self.gateway {
            lines.push(format!("GATEWAY={v}"));
        }
        if let Some(ref v) = self.hwaddr {
            lines.push(format!("HWADDR={v}"));
        }
        lines.push(format!("ONBOOT={}", if self.onboot { "yes" } else { "no" }));
        for (key, value) in &self.extra {
            lines.push(format!("{key}={value}"));
        }
        lines
    }
}

/// Parameters for a static interface configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    pub address: String,
    pub netmask: String,
    pub gateway: Option<String>,
    pub nameservers: Vec<String>,
    pub search_domain: Option<String>,
    pub hostname: Option<String>,
}

/// Interface configuration state, rebuilt from disk on every read.
#[derive(Debug)]
pub struct NetworkSettings {
    paths: ConsolePaths,
    interfaces: BTreeMap<String, InterfaceConfig>,
    managed: bool,
}

impl NetworkSettings {
    /// Scan the ifcfg directory and parse every `ifcfg-*` file except the
    /// loopback one. The managed flag is set when the marker banner appears
    /// anywhere in the scanned files.
    pub fn read_all(paths: &ConsolePaths) -> Result<Self> {
        let mut interfaces = BTreeMap::new();
        let mut managed = false;

        if paths.ifcfg_dir.exists() {
            let mut files: Vec<PathBuf> = fs::read_dir(&paths.ifcfg_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    name.starts_with("ifcfg-") && name != "ifcfg-lo"
                })
                .collect();
            files.sort();

            for file in files {
                let content = fs::read_to_string(&file)?;
                Self::parse_file(&content, &mut interfaces, &mut managed);
            }
        }

        debug!(
            "read {} interface block(s), managed={}",
            interfaces.len(),
            managed
        );
        Ok(Self {
            paths: paths.clone(),
            interfaces,
            managed,
        })
    }

    fn parse_file(
        content: &str,
        interfaces: &mut BTreeMap<String, InterfaceConfig>,
        managed: &mut bool,
    ) {
        let mut current: Option<String> = None;
        for line in content.lines() {
            let line = line.trim_end();
            if line == MANAGED_HEADER {
                *managed = true;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key == "DEVICE" {
                let mut config = InterfaceConfig::default();
                config.absorb(key, value);
                current = Some(value.to_string());
                interfaces.insert(value.to_string(), config);
            } else if let Some(ref device) = current {
                if let Some(config) = interfaces.get_mut(device) {
                    config.absorb(key, value);
                }
            }
        }
    }

    /// Whether the managed marker was observed on the most recent read.
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Parsed block for one interface.
    pub fn interface(&self, ifname: &str) -> Option<&InterfaceConfig> {
        self.interfaces.get(ifname)
    }

    /// All parsed interfaces, keyed by device name.
    pub fn interfaces(&self) -> &BTreeMap<String, InterfaceConfig> {
        &self.interfaces
    }

    /// Path of the ifcfg file for one interface.
    pub fn ifcfg_path(&self, ifname: &str) -> PathBuf {
        self.paths.ifcfg_dir.join(format!("ifcfg-{ifname}"))
    }

    /// Overwrite a managed file with the marker banner plus `lines`.
    ///
    /// Refused when the marker was not observed on the most recent read:
    /// the tool must never clobber an administrator-maintained file.
    pub fn write_block(&self, target: &Path, lines: &[String]) -> Result<()> {
        if !self.managed {
            return Err(ConsoleError::WriteRefused {
                path: target.to_path_buf(),
                marker: MANAGED_HEADER.to_string(),
            });
        }
        let mut out = String::new();
        out.push_str(MANAGED_HEADER);
        out.push('\n');
        out.push_str(MANAGED_WARNING);
        out.push('\n');
        out.push('\n');
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, out)?;
        info!("rewrote managed file {}", target.display());
        Ok(())
    }

    /// Configure one interface for DHCP.
    pub fn set_dhcp(&mut self, ifname: &str) -> Result<()> {
        let config = InterfaceConfig {
            device: ifname.to_string(),
            bootproto: Some(BootProto::Dhcp),
            onboot: true,
            ..Default::default()
        };
        self.write_block(&self.ifcfg_path(ifname), &config.render())?;
        self.interfaces.insert(ifname.to_string(), config);
        Ok(())
    }

    /// Configure one interface statically, regenerating the global network
    /// file and the resolver file as well.
    pub fn set_static(&mut self, ifname: &str, static_conf: &StaticConfig) -> Result<()> {
        let config = InterfaceConfig {
            device: ifname.to_string(),
            bootproto: Some(BootProto::Static),
            ipaddr: Some(static_conf.address.clone()),
            netmask: Some(static_conf.netmask.clone()),
            onboot: true,
            ..Default::default()
        };
        self.write_block(&self.ifcfg_path(ifname), &config.render())?;

        let mut network_lines = vec!["NETWORKING=yes".to_string()];
        if let Some(ref gateway) = static_conf.gateway {
            network_lines.push(format!("GATEWAY={gateway}"));
        }
        if let Some(ref hostname) = static_conf.hostname {
            network_lines.push(format!("HOSTNAME={hostname}"));
        }
        self.write_block(&self.paths.network_file, &network_lines)?;

        let mut resolv_lines = Vec::new();
        if let Some(ref domain) = static_conf.search_domain {
            resolv_lines.push(format!("search {domain}"));
        }
        for ns in &static_conf.nameservers {
            resolv_lines.push(format!("nameserver {ns}"));
        }
        self.write_block(&self.paths.resolv_file, &resolv_lines)?;

        self.interfaces.insert(ifname.to_string(), config);
        Ok(())
    }

    /// Rewrite the HOSTNAME line of the global network file, preserving the
    /// rest of the file, and set the kernel hostname.
    pub fn set_hostname(&self, runner: &dyn CommandRunner, hostname: &str) -> Result<()> {
        let existing = if self.paths.network_file.exists() {
            fs::read_to_string(&self.paths.network_file)?
        } else {
            String::new()
        };

        let mut lines: Vec<String> = existing
            .lines()
            .filter(|line| !line.starts_with("HOSTNAME="))
            .map(str::to_string)
            .collect();
        lines.push(format!("HOSTNAME={hostname}"));

        let mut out = lines.join("\n");
        out.push('\n');
        if let Some(parent) = self.paths.network_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.paths.network_file, out)?;

        runner
            .run("hostname", &[hostname])?
            .ensure_success("hostname")?;
        info!("hostname set to {}", hostname);
        Ok(())
    }
}

/// Reconfigure an interface for DHCP and bounce it.
pub fn apply_dhcp(
    runner: &dyn CommandRunner,
    paths: &ConsolePaths,
    ifname: &str,
) -> Result<String> {
    runner.run("ifdown", &[ifname])?;
    let mut settings = NetworkSettings::read_all(paths)?;
    settings.set_dhcp(ifname)?;
    let output = runner.run("ifup", &[ifname])?.ensure_success("ifup")?;
    Ok(output.stdout)
}

/// Reconfigure an interface statically and bounce it.
pub fn apply_static(
    runner: &dyn CommandRunner,
    paths: &ConsolePaths,
    ifname: &str,
    static_conf: &StaticConfig,
) -> Result<String> {
    runner.run("ifdown", &[ifname])?;
    let mut settings = NetworkSettings::read_all(paths)?;
    settings.set_static(ifname, static_conf)?;
    let output = runner.run("ifup", &[ifname])?.ensure_success("ifup")?;
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn managed_ifcfg() -> String {
        format!(
            "{MANAGED_HEADER}\n{MANAGED_WARNING}\n\nDEVICE=eth0\nBOOTPROTO=dhcp\nONBOOT=yes\n"
        )
    }

    fn setup(content: &str) -> (TempDir, ConsolePaths) {
        let tmp = TempDir::new().unwrap();
        let paths = ConsolePaths::rooted(tmp.path());
        fs::create_dir_all(&paths.ifcfg_dir).unwrap();
        fs::write(paths.ifcfg_dir.join("ifcfg-eth0"), content).unwrap();
        (tmp, paths)
    }

    #[test]
    fn test_bootproto_ifcfg_spellings() {
        assert_eq!(BootProto::Static.to_string(), "none");
        assert_eq!("none".parse::<BootProto>().unwrap(), BootProto::Static);
        assert_eq!("static".parse::<BootProto>().unwrap(), BootProto::Static);
        assert_eq!("dhcp".parse::<BootProto>().unwrap(), BootProto::Dhcp);
        assert!("bootp".parse::<BootProto>().is_err());
    }

    #[test]
    fn test_read_all_parses_device_blocks() {
        let (_tmp, paths) = setup(&managed_ifcfg());
        let settings = NetworkSettings::read_all(&paths).unwrap();
        assert!(settings.is_managed());

        let eth0 = settings.interface("eth0").unwrap();
        assert_eq!(eth0.device, "eth0");
        assert_eq!(eth0.bootproto, Some(BootProto::Dhcp));
        assert!(eth0.onboot);
    }

    #[test]
    fn test_read_all_skips_loopback() {
        let (_tmp, paths) = setup(&managed_ifcfg());
        fs::write(
            paths.ifcfg_dir.join("ifcfg-lo"),
            "DEVICE=lo\nBOOTPROTO=none\n",
        )
        .unwrap();
        let settings = NetworkSettings::read_all(&paths).unwrap();
        assert!(settings.interface("lo").is_none());
    }

    #[test]
    fn test_unknown_keys_land_in_overflow_map() {
        let (_tmp, paths) = setup(&format!(
            "{MANAGED_HEADER}\nDEVICE=eth0\nBOOTPROTO=dhcp\nMTU=9000\nONBOOT=yes\n"
        ));
        let settings = NetworkSettings::read_all(&paths).unwrap();
        let eth0 = settings.interface("eth0").unwrap();
        assert_eq!(eth0.extra.get("MTU").map(String::as_str), Some("9000"));
        assert!(eth0.render().contains(&"MTU=9000".to_string()));
    }

    #[test]
    fn test_write_block_refused_without_marker() {
        let (_tmp, paths) = setup("DEVICE=eth0\nBOOTPROTO=dhcp\nONBOOT=yes\n");
        let mut settings = NetworkSettings::read_all(&paths).unwrap();
        assert!(!settings.is_managed());

        let before = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
        let err = settings.set_dhcp("eth0").unwrap_err();
        assert!(matches!(err, ConsoleError::WriteRefused { .. }));

        // Refusal must leave the file byte-identical
        let after = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_dhcp_writes_marked_block() {
        let (_tmp, paths) = setup(&managed_ifcfg());
        let mut settings = NetworkSettings::read_all(&paths).unwrap();
        settings.set_dhcp("eth0").unwrap();

        let content = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
        assert!(content.starts_with(MANAGED_HEADER));
        assert!(content.contains("DEVICE=eth0"));
        assert!(content.contains("BOOTPROTO=dhcp"));
        assert!(content.contains("ONBOOT=yes"));
    }

    #[test]
    fn test_set_static_regenerates_network_and_resolv() {
        let (_tmp, paths) = setup(&managed_ifcfg());
        let mut settings = NetworkSettings::read_all(&paths).unwrap();
        let static_conf = StaticConfig {
            address: "10.0.0.5".to_string(),
            netmask: "255.255.255.0".to_string(),
            gateway: Some("10.0.0.1".to_string()),
            nameservers: vec!["10.0.0.1".to_string(), "8.8.8.8".to_string()],
            search_domain: Some("example.com".to_string()),
            hostname: Some("abcdbsup.example.com".to_string()),
        };
        settings.set_static("eth0", &static_conf).unwrap();

        let ifcfg = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
        assert!(ifcfg.contains("BOOTPROTO=none"));
        assert!(ifcfg.contains("IPADDR=10.0.0.5"));
        assert!(ifcfg.contains("NETMASK=255.255.255.0"));

        let network = fs::read_to_string(&paths.network_file).unwrap();
        assert!(network.contains("NETWORKING=yes"));
        assert!(network.contains("GATEWAY=10.0.0.1"));
        assert!(network.contains("HOSTNAME=abcdbsup.example.com"));

        let resolv = fs::read_to_string(&paths.resolv_file).unwrap();
        assert!(resolv.contains("search example.com"));
        assert!(resolv.contains("nameserver 10.0.0.1"));
        assert!(resolv.contains("nameserver 8.8.8.8"));
    }
}
