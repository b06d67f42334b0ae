//! Disk enumeration and partition resize helpers.
//!
//! Disks come from `/proc/partitions`; partition classification shells out
//! to `file -s`; the maximum size of a partition is obtained by asking
//! `sfdisk` for an impossible size and parsing the limit out of its warning
//! message. That last trick depends on the exact wording of the tool's
//! diagnostics and is a known-fragile external contract.

use std::fs;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ConsoleError, Result};
use crate::paths::ConsolePaths;
use crate::runner::CommandRunner;

/// Oversized sector count fed to sfdisk to provoke the maximum-size warning.
const PROVOKE_SIZE: &str = "999999999999";

/// A whole disk as listed in `/proc/partitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskInfo {
    /// Kernel device name, e.g. `sda`.
    pub name: String,
    /// Size in megabytes.
    pub size_mb: u64,
}

impl DiskInfo {
    pub fn device_path(&self) -> String {
        format!("/dev/{}", self.name)
    }
}

/// Partition classification, keyed by the filesystem signature `file -s`
/// reports. Only signatures the appliance knows how to grow are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartitionType {
    /// LVM2 physical volume (type code 8e), grown with pvresize.
    Lvm2,
    /// ext3/ext4 filesystem (type code 83), grown with resize2fs.
    Ext,
    /// Swap area (type code 82); nothing to grow.
    Swap,
    /// Extended partition (type code 5); resize unsupported.
    Extended,
}

impl PartitionType {
    /// Two-character partition type code, per the fixed appliance table.
    pub fn code(&self) -> &'static str {
        match self {
            PartitionType::Lvm2 => "8e",
            PartitionType::Ext => "83",
            PartitionType::Swap => "82",
            PartitionType::Extended => "5",
        }
    }

    /// Map a recognized `file -s` signature token to a type.
    ///
    /// ext2 and XFS signatures are recognized by the probe but have no entry
    /// in the resize table, so they are incompatible here.
    fn from_signature(device: &str, signature: &str) -> Result<Self> {
        match signature {
            "LVM2" => Ok(PartitionType::Lvm2),
            "ext3" | "ext4" => Ok(PartitionType::Ext),
            "swap" => Ok(PartitionType::Swap),
            "extended" => Ok(PartitionType::Extended),
            other => Err(ConsoleError::IncompatibleFilesystem {
                device: device.to_string(),
                signature: other.to_string(),
            }),
        }
    }
}

/// The follow-up command that makes a grown partition usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResizeCommand {
    /// Run this program with these arguments after growing the partition.
    Run { program: String, args: Vec<String> },
    /// Nothing to do (swap).
    Nothing,
    /// Resize of this partition type is not supported.
    Unsupported,
}

/// Everything needed to grow the last partition of one disk.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionPlan {
    /// Disk device path, e.g. `/dev/sda`.
    pub device: String,
    /// Primary partition index (1-4).
    pub index: u32,
    /// Classified partition type.
    pub partition_type: PartitionType,
    /// Command to run after the partition table is rewritten.
    pub resize: ResizeCommand,
    /// Maximum addressable sector count reported by sfdisk.
    pub max_size_sectors: u64,
}

impl PartitionPlan {
    pub fn partition_path(&self) -> String {
        format!("{}{}", self.device, self.index)
    }
}

/// Parse `/proc/partitions` content into whole-disk entries.
///
/// Lines whose device name ends in a digit are partitions and lines whose
/// name starts with `dm` are device-mapper targets; both are excluded.
pub fn parse_disks(proc_partitions: &str) -> Vec<DiskInfo> {
    let mut disks = Vec::new();
    for line in proc_partitions.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("major") {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let Ok(blocks) = fields[2].parse::<u64>() else {
            continue;
        };
        let name = fields[3];
        if name.ends_with(|c: char| c.is_ascii_digit()) || name.starts_with("dm") {
            continue;
        }
        disks.push(DiskInfo {
            name: name.to_string(),
            // 1K blocks to MB
            size_mb: blocks / 1024,
        });
    }
    disks
}

/// Enumerate whole disks from the running system.
pub fn list_disks(paths: &ConsolePaths) -> Result<Vec<DiskInfo>> {
    let content = fs::read_to_string(&paths.proc_partitions)?;
    Ok(parse_disks(&content))
}

/// Classify a partition by probing its filesystem signature with `file -s`.
pub fn detect_partition_type(runner: &dyn CommandRunner, device: &str) -> Result<PartitionType> {
    let output = runner.run("file", &["-s", device])?.ensure_success("file")?;
    let probe = output.stdout;
    debug!("file -s {}: {}", device, probe.trim());

    // Token order matters: ext4 before ext3 before ext2 so the most
    // specific signature wins.
    for token in ["LVM2", "ext4", "ext3", "ext2", "XFS", "swap", "extended"] {
        if probe.contains(token) {
            return PartitionType::from_signature(device, token);
        }
    }
    Err(ConsoleError::IncompatibleFilesystem {
        device: device.to_string(),
        signature: probe.trim().to_string(),
    })
}

/// Extract the maximum sector count out of sfdisk's warning message.
///
/// sfdisk, asked for an impossibly large partition, prints a warning line
/// ending with the real limit in parentheses. No warning line means the
/// output format changed under us.
pub fn parse_max_size(output: &str) -> Result<u64> {
    let limit_re = Regex::new(r"\((\d+)\)\s*$").expect("static regex");
    for line in output.lines() {
        if !line.contains("Warning") {
            continue;
        }
        if let Some(caps) = limit_re.captures(line.trim_end()) {
            let sectors = caps[1]
                .parse::<u64>()
                .map_err(|e| ConsoleError::unparsable("sfdisk", e.to_string()))?;
            return Ok(sectors);
        }
    }
    Err(ConsoleError::unparsable(
        "sfdisk",
        format!("no warning line with a sector limit found in: {output}"),
    ))
}

/// Ask sfdisk for the maximum size of primary partition `index` on `device`.
///
/// Sector units are mandatory: cylinder granularity cannot address the
/// partition end precisely enough.
pub fn max_size(runner: &dyn CommandRunner, device: &str, index: u32) -> Result<u64> {
    let part_arg = format!("-N{index}");
    let stdin = format!(",{PROVOKE_SIZE},\n");
    // --no-reread keeps this probe non-destructive; exit status is ignored
    // because sfdisk fails by design when refusing the oversized request.
    let output = runner.run_with_stdin(
        "sfdisk",
        &["--no-reread", "-uS", "-L", &part_arg, device],
        &stdin,
    )?;
    parse_max_size(&output.combined())
}

/// Locate the last primary partition of `disk` and plan its expansion.
pub fn last_partition(
    runner: &dyn CommandRunner,
    paths: &ConsolePaths,
    disk: &str,
) -> Result<PartitionPlan> {
    let content = fs::read_to_string(&paths.proc_partitions)?;
    let part_re = Regex::new(&format!(r"{}(\d+)$", regex::escape(disk))).expect("static regex");

    let mut last: Option<u32> = None;
    for line in content.lines() {
        let Some(name) = line.split_whitespace().nth(3) else {
            continue;
        };
        if let Some(caps) = part_re.captures(name) {
            let index: u32 = caps[1]
                .parse()
                .map_err(|e: std::num::ParseIntError| ConsoleError::unparsable("/proc/partitions", e.to_string()))?;
            if index > 4 {
                return Err(ConsoleError::validation(
                    "logical partitions are not managed by bootconsole",
                ));
            }
            last = Some(last.map_or(index, |prev: u32| prev.max(index)));
        }
    }

    let index = last.ok_or_else(|| {
        ConsoleError::validation(format!("no partitions found on disk {disk}"))
    })?;

    let device = format!("/dev/{disk}");
    let partition = format!("{device}{index}");
    let partition_type = detect_partition_type(runner, &partition)?;
    let resize = match partition_type {
        PartitionType::Lvm2 => ResizeCommand::Run {
            program: "pvresize".to_string(),
            args: vec![partition.clone()],
        },
        PartitionType::Ext => ResizeCommand::Run {
            program: "resize2fs".to_string(),
            args: vec![partition.clone()],
        },
        PartitionType::Swap => ResizeCommand::Nothing,
        PartitionType::Extended => ResizeCommand::Unsupported,
    };
    let max_size_sectors = max_size(runner, &device, index)?;

    Ok(PartitionPlan {
        device,
        index,
        partition_type,
        resize,
        max_size_sectors,
    })
}

/// Grow the planned partition to its maximum size, then run the filesystem
/// resize command.
pub fn expand(runner: &dyn CommandRunner, plan: &PartitionPlan) -> Result<()> {
    match &plan.resize {
        ResizeCommand::Unsupported => {
            return Err(ConsoleError::validation(
                "extended partition resize is not supported; contact your appliance support",
            ));
        }
        ResizeCommand::Nothing => {
            info!("{} is swap; partition table grown, nothing to resize", plan.partition_path());
        }
        ResizeCommand::Run { .. } => {}
    }

    let part_arg = format!("-N{}", plan.index);
    let stdin = format!(",{},\n", plan.max_size_sectors);
    runner
        .run_with_stdin("sfdisk", &["--no-reread", "-uS", "-L", &part_arg, &plan.device], &stdin)?
        .ensure_success("sfdisk")?;
    info!(
        "grew {} to {} sectors",
        plan.partition_path(),
        plan.max_size_sectors
    );

    if let ResizeCommand::Run { program, args } = &plan.resize {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        runner.run(program, &arg_refs)?.ensure_success(program)?;
        info!("{} completed on {}", program, plan.partition_path());
    }
    Ok(())
}

/// A disk whose reported size changed after a rescan.
#[derive(Debug, Clone, Serialize)]
pub struct RescanResult {
    pub disk: DiskInfo,
    /// Previous size in MB when it differs from the current one.
    pub previous_size_mb: Option<u64>,
}

/// Trigger a SCSI rescan of every disk and report size changes.
///
/// Writes `1` to `/sys/block/<disk>/device/rescan`; a missing rescan node
/// (virtio, loop devices) is logged and skipped rather than fatal.
pub fn rescan_disks(paths: &ConsolePaths) -> Result<Vec<RescanResult>> {
    let before = list_disks(paths)?;
    for disk in &before {
        let node = paths.sys_block_dir.join(&disk.name).join("device/rescan");
        if let Err(e) = fs::write(&node, "1") {
            warn!("rescan of {} skipped: {}", disk.name, e);
        }
    }

    let after = list_disks(paths)?;
    let results = after
        .into_iter()
        .map(|disk| {
            let previous = before
                .iter()
                .find(|d| d.name == disk.name)
                .map(|d| d.size_mb)
                .filter(|&old| old != disk.size_mb);
            RescanResult {
                disk,
                previous_size_mb: previous,
            }
        })
        .collect();
    Ok(results)
}
