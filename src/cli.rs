use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bootconsole - appliance administration console
#[derive(Parser)]
#[command(name = "bootconsole")]
#[command(about = "Text-mode administration console for the appliance image")]
#[command(version)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human-readable text
    /// (read-only commands only).
    #[arg(long, global = true)]
    pub json: bool,

    /// Treat this directory as the filesystem root (testing/chroot).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Network interface and resolver configuration
    Network {
        #[command(subcommand)]
        action: NetworkCommands,
    },
    /// Disk inventory and partition expansion
    Disk {
        #[command(subcommand)]
        action: DiskCommands,
    },
    /// Flat-file configuration store
    Conf {
        #[command(subcommand)]
        action: ConfCommands,
    },
    /// Hosts file sentinel block
    Hosts {
        #[command(subcommand)]
        action: HostsCommands,
    },
    /// Service-account password derivation and rollout
    Password {
        #[command(subcommand)]
        action: PasswordCommands,
    },
    /// Configuration file integrity checksums
    Checksum {
        #[command(subcommand)]
        action: ChecksumCommands,
    },
}

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Show interfaces, addresses and nameservers
    Show,
    /// Switch an interface to DHCP and bounce it
    Dhcp {
        /// Interface name (e.g. eth0)
        interface: String,
    },
    /// Assign a static address and regenerate network/resolver files
    Static {
        /// Interface name (e.g. eth0)
        interface: String,
        /// IPv4 address
        #[arg(long)]
        address: String,
        /// Netmask (e.g. 255.255.255.0)
        #[arg(long)]
        netmask: String,
        /// Default gateway
        #[arg(long)]
        gateway: Option<String>,
        /// Nameserver, repeatable
        #[arg(long = "nameserver")]
        nameservers: Vec<String>,
        /// DNS search domain
        #[arg(long)]
        search: Option<String>,
        /// Fully qualified hostname to record alongside the address
        #[arg(long)]
        hostname: Option<String>,
    },
    /// Set the system hostname
    Hostname {
        /// New fully qualified hostname
        name: String,
    },
}

#[derive(Subcommand)]
pub enum DiskCommands {
    /// List whole disks with sizes
    List,
    /// Grow the last partition of a disk to the maximum size
    Expand {
        /// Disk name (e.g. sda)
        disk: String,
        /// Confirm destructive operation
        #[arg(long)]
        confirm: bool,
    },
    /// Ask the kernel to rescan disk capacities
    Rescan,
}

#[derive(Subcommand)]
pub enum ConfCommands {
    /// Print the value(s) of a key
    Get {
        /// Config file name, resolved against the search directories
        file: String,
        /// Key (prefix match)
        key: String,
    },
    /// Set a key, appending or inserting at a position
    Set {
        /// Config file name, resolved against the search directories
        file: String,
        key: String,
        value: String,
        /// Insert at this line index instead of appending
        #[arg(long)]
        at: Option<usize>,
    },
    /// Delete all lines matching a key prefix
    Del {
        /// Config file name, resolved against the search directories
        file: String,
        key: String,
    },
}

#[derive(Subcommand)]
pub enum HostsCommands {
    /// Print the managed hosts entries
    Show,
    /// Replace the managed hosts block
    Set {
        /// Entry in IP,FQDN[,alias...] form, repeatable
        #[arg(long = "entry", required = true)]
        entries: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Derive the service password from the hostname
    Derive {
        /// Override the hostname (defaults to the system hostname)
        #[arg(long)]
        hostname: Option<String>,
    },
    /// Derive and roll out the service password
    Apply {
        /// Override the hostname (defaults to the system hostname)
        #[arg(long)]
        hostname: Option<String>,
        /// Ini-like file carrying the userid credential
        #[arg(long)]
        ini_file: Option<PathBuf>,
        /// Config-store file carrying the database password
        #[arg(long)]
        store_file: Option<PathBuf>,
        /// Confirm the rollout
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
pub enum ChecksumCommands {
    /// Record digests of the tracked files
    Record {
        /// Files to track
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Report files whose digest no longer matches
    Verify,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
