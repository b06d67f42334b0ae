//! Network configuration: interface enumeration, ifcfg rewriting, global
//! network and resolver files.

mod info;
mod settings;

pub use info::{filtered_interface_names, nameservers, parse_interface_names};
pub use settings::{
    apply_dhcp, apply_static, BootProto, InterfaceConfig, NetworkSettings, StaticConfig,
    MANAGED_HEADER, MANAGED_WARNING,
};
