//! bootconsole - main entry point
//!
//! Dispatches between the interactive ratatui console and the headless
//! clap subcommands. Both paths share the library's ConsolePaths and
//! CommandRunner seams.

use std::io::stdout;

use anyhow::Context;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bootconsole::app::App;
use bootconsole::cli::{
    ChecksumCommands, Cli, Commands, ConfCommands, DiskCommands, HostsCommands, NetworkCommands,
    PasswordCommands,
};
use bootconsole::{
    conf, disk, hosts, identity, net, ConsoleError, ConsolePaths, HostEntry, RolloutTargets,
    SystemRunner,
};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("bootconsole starting up");

    let cli = Cli::parse_args();
    let paths = match cli.root {
        Some(ref root) => ConsolePaths::rooted(root),
        None => ConsolePaths::default(),
    };
    debug!("CLI arguments parsed");

    match cli.command {
        None => run_console(paths),
        Some(Commands::Network { action }) => run_network(&paths, action, cli.json),
        Some(Commands::Disk { action }) => run_disk(&paths, action, cli.json),
        Some(Commands::Conf { action }) => run_conf(&paths, action),
        Some(Commands::Hosts { action }) => run_hosts(&paths, action, cli.json),
        Some(Commands::Password { action }) => run_password(&paths, action),
        Some(Commands::Checksum { action }) => run_checksum(&paths, action, cli.json),
    }
}

/// Run the interactive console, always restoring the terminal afterwards.
fn run_console(paths: ConsolePaths) -> anyhow::Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let mut app = App::new(paths);
    let result = app.run(&mut terminal);

    // Always attempt cleanup, even if the app failed
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    result.context("console session failed")
}

fn run_network(paths: &ConsolePaths, action: NetworkCommands, json: bool) -> anyhow::Result<()> {
    let runner = SystemRunner;
    match action {
        NetworkCommands::Show => {
            let settings = net::NetworkSettings::read_all(paths)?;
            let nameservers = net::nameservers(paths)?;
            if json {
                let value = serde_json::json!({
                    "managed": settings.is_managed(),
                    "interfaces": settings.interfaces(),
                    "nameservers": nameservers,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "managed: {}",
                    if settings.is_managed() { "yes" } else { "no" }
                );
                for (name, conf) in settings.interfaces() {
                    let proto = conf
                        .bootproto
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "unset".to_string());
                    println!("{name}: {proto}");
                    if let Some(ref ip) = conf.ipaddr {
                        println!("  address {ip}");
                    }
                    if let Some(ref mask) = conf.netmask {
                        println!("  netmask {mask}");
                    }
                    if let Some(ref gw) = conf.gateway {
                        println!("  gateway {gw}");
                    }
                }
                if !nameservers.is_empty() {
                    println!("nameservers: {}", nameservers.join(" "));
                }
            }
        }
        NetworkCommands::Dhcp { interface } => {
            net::apply_dhcp(&runner, paths, &interface)
                .with_context(|| format!("failed to switch {interface} to DHCP"))?;
            println!("{interface} reconfigured for DHCP");
        }
        NetworkCommands::Static {
            interface,
            address,
            netmask,
            gateway,
            nameservers,
            search,
            hostname,
        } => {
            let conf = net::StaticConfig {
                address,
                netmask,
                gateway,
                nameservers,
                search_domain: search,
                hostname,
            };
            net::apply_static(&runner, paths, &interface, &conf)
                .with_context(|| format!("failed to configure {interface}"))?;
            println!("{interface} set to {} / {}", conf.address, conf.netmask);
        }
        NetworkCommands::Hostname { name } => {
            let settings = net::NetworkSettings::read_all(paths)?;
            settings
                .set_hostname(&runner, &name)
                .context("failed to set hostname")?;
            println!("hostname set to {name}");
        }
    }
    Ok(())
}

fn run_disk(paths: &ConsolePaths, action: DiskCommands, json: bool) -> anyhow::Result<()> {
    let runner = SystemRunner;
    match action {
        DiskCommands::List => {
            let disks = disk::list_disks(paths)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&disks)?);
            } else {
                for d in &disks {
                    println!("{:<12} {:>10} MB", d.name, d.size_mb);
                }
            }
        }
        DiskCommands::Expand { disk: name, confirm } => {
            if !confirm {
                anyhow::bail!("partition expansion requires --confirm");
            }
            let plan = disk::last_partition(&runner, paths, &name)
                .with_context(|| format!("failed to plan expansion of {name}"))?;
            info!(
                "expanding {} (type {}) to {} sectors",
                plan.partition_path(),
                plan.partition_type.code(),
                plan.max_size_sectors
            );
            disk::expand(&runner, &plan)
                .with_context(|| format!("failed to expand {name}"))?;
            println!("last partition of {name} grown to maximum size");
        }
        DiskCommands::Rescan => {
            let results = disk::rescan_disks(paths)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for r in &results {
                    println!("{} rescanned", r.disk.name);
                }
            }
        }
    }
    Ok(())
}

fn run_conf(paths: &ConsolePaths, action: ConfCommands) -> anyhow::Result<()> {
    match action {
        ConfCommands::Get { file, key } => {
            let store = conf::ConfigStore::load(&file, paths)?;
            match store.get(&key) {
                conf::Lookup::Missing => {
                    return Err(ConsoleError::not_found(format!("{key} in {file}")).into());
                }
                lookup => {
                    for value in lookup.values() {
                        println!("{value}");
                    }
                }
            }
        }
        ConfCommands::Set {
            file,
            key,
            value,
            at,
        } => {
            let mut store = conf::ConfigStore::load(&file, paths)?;
            store.set(&key, &value, at);
            store.write()?;
        }
        ConfCommands::Del { file, key } => {
            let mut store = conf::ConfigStore::load(&file, paths)?;
            let removed = store.delete(&key);
            store.write()?;
            println!("removed {removed} line(s)");
        }
    }
    Ok(())
}

fn run_hosts(paths: &ConsolePaths, action: HostsCommands, json: bool) -> anyhow::Result<()> {
    match action {
        HostsCommands::Show => {
            let entries = hosts::read_block(&paths.hosts_file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!("{}", entry.render());
                }
            }
        }
        HostsCommands::Set { entries } => {
            let parsed: Vec<HostEntry> = entries
                .iter()
                .map(|raw| parse_host_entry(raw))
                .collect::<anyhow::Result<_>>()?;
            hosts::rewrite_block(&paths.hosts_file, &parsed)?;
            println!("managed hosts block updated ({} entries)", parsed.len());
        }
    }
    Ok(())
}

fn parse_host_entry(raw: &str) -> anyhow::Result<HostEntry> {
    let mut parts = raw.split(',').map(str::trim);
    let ip = parts
        .next()
        .filter(|s| !s.is_empty())
        .context("entry needs an IP address")?;
    let fqdn = parts
        .next()
        .filter(|s| !s.is_empty())
        .context("entry needs a hostname")?;
    let aliases = parts.map(str::to_string).collect();
    Ok(HostEntry::new(ip, fqdn, aliases))
}

fn run_password(paths: &ConsolePaths, action: PasswordCommands) -> anyhow::Result<()> {
    let runner = SystemRunner;
    match action {
        PasswordCommands::Derive { hostname } => {
            let password = derive(paths, &runner, hostname)?;
            println!("{password}");
        }
        PasswordCommands::Apply {
            hostname,
            ini_file,
            store_file,
            confirm,
        } => {
            if !confirm {
                anyhow::bail!("password rollout requires --confirm");
            }
            let password = derive(paths, &runner, hostname)?;
            let targets = RolloutTargets {
                ini_file,
                store_file,
                ..RolloutTargets::default()
            };
            let report = identity::apply_password(&runner, &targets, &password);
            print!("{report}");
            if !report.all_ok() {
                anyhow::bail!("password rollout had failures");
            }
        }
    }
    Ok(())
}

fn derive(
    paths: &ConsolePaths,
    runner: &SystemRunner,
    hostname: Option<String>,
) -> anyhow::Result<String> {
    use bootconsole::CommandRunner;

    let hostname = match hostname {
        Some(name) => name,
        None => runner
            .run("hostname", &[])?
            .ensure_success("hostname")?
            .stdout
            .trim()
            .to_string(),
    };
    let aliases: Vec<String> = hosts::read_block(&paths.hosts_file)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|e| e.aliases)
        .collect();
    Ok(identity::derive_password(&hostname, &aliases)?)
}

fn run_checksum(paths: &ConsolePaths, action: ChecksumCommands, json: bool) -> anyhow::Result<()> {
    match action {
        ChecksumCommands::Record { files } => {
            let count = identity::record_checksums(paths, &files)?;
            println!("recorded {count} checksum(s)");
        }
        ChecksumCommands::Verify => {
            let drifts = identity::verify_checksums(paths)?;
            if json {
                let value: Vec<_> = drifts
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "path": d.path,
                            "recorded": d.recorded,
                            "current": d.current,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if drifts.is_empty() {
                println!("all tracked files match");
            } else {
                for d in &drifts {
                    match &d.current {
                        Some(_) => println!("modified: {}", d.path.display()),
                        None => println!("missing:  {}", d.path.display()),
                    }
                }
            }
            if !drifts.is_empty() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
