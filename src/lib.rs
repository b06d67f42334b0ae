//! Appliance Administration Console Library
//!
//! Core functionality for the bootconsole appliance console: network
//! interface configuration, disk partition expansion, the flat-file config
//! store, hosts-file sentinel blocks and service password rotation.

pub mod app;
pub mod cli;
pub mod conf;
pub mod disk;
pub mod error;
pub mod hosts;
pub mod identity;
pub mod net;
pub mod paths;
pub mod runner;
pub mod theme;
pub mod ui;

// Re-export main types for convenience
pub use conf::{ConfigStore, Lookup};
pub use disk::{DiskInfo, PartitionPlan, PartitionType, ResizeCommand};
pub use error::{ConsoleError, Result};
pub use hosts::HostEntry;
pub use identity::{derive_password, ApplyReport, RolloutTargets};
pub use net::{BootProto, InterfaceConfig, NetworkSettings, StaticConfig};
pub use paths::ConsolePaths;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
