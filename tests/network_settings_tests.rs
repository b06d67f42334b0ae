//! Integration tests for network reconfiguration end to end.

mod common;

use std::fs;

use bootconsole::net::{self, StaticConfig, MANAGED_HEADER, MANAGED_WARNING};
use bootconsole::{ConsoleError, ConsolePaths};
use common::{failed_output, FakeRunner};
use tempfile::TempDir;

fn setup_managed() -> (TempDir, ConsolePaths) {
    let tmp = TempDir::new().unwrap();
    let paths = ConsolePaths::rooted(tmp.path());
    fs::create_dir_all(&paths.ifcfg_dir).unwrap();
    fs::write(
        paths.ifcfg_dir.join("ifcfg-eth0"),
        format!("{MANAGED_HEADER}\n{MANAGED_WARNING}\n\nDEVICE=eth0\nBOOTPROTO=dhcp\nONBOOT=yes\n"),
    )
    .unwrap();
    (tmp, paths)
}

#[test]
fn test_apply_dhcp_bounces_interface_around_rewrite() {
    let (_tmp, paths) = setup_managed();
    let runner = FakeRunner::new();

    net::apply_dhcp(&runner, &paths, "eth0").unwrap();

    let programs: Vec<String> = runner.calls().iter().map(|c| c.program.clone()).collect();
    assert_eq!(programs, vec!["ifdown", "ifup"]);
    assert_eq!(runner.calls_to("ifup")[0].args, vec!["eth0"]);

    let ifcfg = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
    assert!(ifcfg.starts_with(MANAGED_HEADER));
    assert!(ifcfg.contains("BOOTPROTO=dhcp"));
}

#[test]
fn test_apply_static_writes_all_three_files() {
    let (_tmp, paths) = setup_managed();
    let runner = FakeRunner::new();
    let conf = StaticConfig {
        address: "192.168.1.10".to_string(),
        netmask: "255.255.255.0".to_string(),
        gateway: Some("192.168.1.1".to_string()),
        nameservers: vec!["192.168.1.1".to_string()],
        search_domain: Some("lan".to_string()),
        hostname: Some("abcdbsup.lan".to_string()),
    };

    net::apply_static(&runner, &paths, "eth0", &conf).unwrap();

    let ifcfg = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
    assert!(ifcfg.contains("BOOTPROTO=none"));
    assert!(ifcfg.contains("IPADDR=192.168.1.10"));

    let network = fs::read_to_string(&paths.network_file).unwrap();
    assert!(network.starts_with(MANAGED_HEADER));
    assert!(network.contains("GATEWAY=192.168.1.1"));
    assert!(network.contains("HOSTNAME=abcdbsup.lan"));

    let resolv = fs::read_to_string(&paths.resolv_file).unwrap();
    assert!(resolv.contains("search lan"));
    assert!(resolv.contains("nameserver 192.168.1.1"));
}

#[test]
fn test_apply_dhcp_refused_on_unmanaged_files() {
    let tmp = TempDir::new().unwrap();
    let paths = ConsolePaths::rooted(tmp.path());
    fs::create_dir_all(&paths.ifcfg_dir).unwrap();
    let original = "DEVICE=eth0\nBOOTPROTO=none\nIPADDR=10.1.1.1\nONBOOT=yes\n";
    fs::write(paths.ifcfg_dir.join("ifcfg-eth0"), original).unwrap();
    let runner = FakeRunner::new();

    let err = net::apply_dhcp(&runner, &paths, "eth0").unwrap_err();
    assert!(matches!(err, ConsoleError::WriteRefused { .. }));

    // The administrator's file stays untouched and ifup never runs
    let after = fs::read_to_string(paths.ifcfg_dir.join("ifcfg-eth0")).unwrap();
    assert_eq!(after, original);
    assert!(runner.calls_to("ifup").is_empty());
}

#[test]
fn test_failed_ifup_surfaces_as_external_tool_error() {
    let (_tmp, paths) = setup_managed();
    let runner = FakeRunner::new();
    runner.respond("ifdown", common::ok_output("", ""));
    runner.respond("ifup", failed_output("Device eth0 does not seem to be present", 1));

    let err = net::apply_dhcp(&runner, &paths, "eth0").unwrap_err();
    match err {
        ConsoleError::ExternalTool { command, code, .. } => {
            assert_eq!(command, "ifup");
            assert_eq!(code, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_set_hostname_preserves_other_network_lines() {
    let (_tmp, paths) = setup_managed();
    fs::create_dir_all(paths.network_file.parent().unwrap()).unwrap();
    fs::write(
        &paths.network_file,
        "NETWORKING=yes\nGATEWAY=10.0.0.1\nHOSTNAME=oldname\n",
    )
    .unwrap();
    let runner = FakeRunner::new();

    let settings = net::NetworkSettings::read_all(&paths).unwrap();
    settings.set_hostname(&runner, "abcassup.lan").unwrap();

    let network = fs::read_to_string(&paths.network_file).unwrap();
    assert!(network.contains("NETWORKING=yes"));
    assert!(network.contains("GATEWAY=10.0.0.1"));
    assert!(network.contains("HOSTNAME=abcassup.lan"));
    assert!(!network.contains("HOSTNAME=oldname"));

    assert_eq!(runner.calls_to("hostname")[0].args, vec!["abcassup.lan"]);
}
