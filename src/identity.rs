//! Service-account password derivation and rollout.
//!
//! Appliance hostnames follow a fixed convention: a 3-6 character site
//! prefix, a tier tag (`db` for the database host, `as` for the application
//! server), the literal `su`, and a role letter. The service password is the
//! hostname with the tier tag swapped for `pw`, so every box can recompute
//! it from its own name after a hostname change.
//!
//! Rolling the password out touches two application config files and two OS
//! account tools. Each step is attempted regardless of earlier failures and
//! the caller gets one aggregated report.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::conf::ConfigStore;
use crate::error::{ConsoleError, Result};
use crate::paths::ConsolePaths;
use crate::runner::CommandRunner;

/// Role letters accepted at the end of a convention hostname:
/// production, test, development, qualification.
const ROLE_LETTERS: &str = "ptdq";

/// Key rewritten positionally in the gateway config store.
const PLSQL_PASSWORD_KEY: &str = "PlsqlDatabasePassword";

fn convention_regex() -> Regex {
    Regex::new(&format!(r"^[a-z0-9]{{3,6}}(db|as)su[{ROLE_LETTERS}]$")).expect("static regex")
}

/// Derive the service password from the hostname, falling back to aliases.
///
/// The short hostname (before the first domain separator) is checked first;
/// when it does not follow the convention, each alias is tried in order.
/// The first conventional name wins and has its `(db|as)su` segment
/// replaced by `pwsu`.
pub fn derive_password(hostname: &str, aliases: &[String]) -> Result<String> {
    let convention = convention_regex();
    let substitute = Regex::new(r"(db|as)su").expect("static regex");

    let short = hostname.split('.').next().unwrap_or(hostname);
    let candidates = std::iter::once(short).chain(aliases.iter().map(|a| a.as_str()));

    for candidate in candidates {
        let candidate = candidate.split('.').next().unwrap_or(candidate);
        if convention.is_match(candidate) {
            let password = substitute.replace(candidate, "pwsu").into_owned();
            info!("derived service password from '{}'", candidate);
            return Ok(password);
        }
    }
    Err(ConsoleError::NamingConvention(hostname.to_string()))
}

/// Locate `file_name` under `home`, skipping sample/tmp/backup directories
/// (plus an optional extra exclusion). First hit wins, walking depth-first.
pub fn find_in_home(home: &Path, file_name: &str, exclude: Option<&str>) -> Option<PathBuf> {
    let pattern = match exclude {
        Some(extra) => format!(r"sample|tmp|backup|{extra}"),
        None => "sample|tmp|backup".to_string(),
    };
    let exclude_re = Regex::new(&pattern).ok()?;
    walk(home, file_name, &exclude_re)
}

fn walk(dir: &Path, file_name: &str, exclude_re: &Regex) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name)
            && !exclude_re.is_match(&dir.to_string_lossy())
        {
            return Some(path);
        }
    }
    subdirs
        .into_iter()
        .find_map(|sub| walk(&sub, file_name, exclude_re))
}

/// Where the rollout writes, and which OS accounts it touches.
#[derive(Debug, Clone)]
pub struct RolloutTargets {
    /// Ini-like file holding the `userid` credential (`user/PW@service`).
    pub ini_file: Option<PathBuf>,
    /// Section of the ini file carrying the credential.
    pub ini_section: String,
    /// Config-store file holding the positional `PlsqlDatabasePassword` key.
    pub store_file: Option<PathBuf>,
    /// Unix account whose password is set via chpasswd.
    pub unix_user: String,
    /// Samba account whose password is set via smbpasswd.
    pub samba_user: String,
}

impl Default for RolloutTargets {
    fn default() -> Self {
        Self {
            ini_file: None,
            ini_section: "suas".to_string(),
            store_file: None,
            unix_user: "suas".to_string(),
            samba_user: "suas".to_string(),
        }
    }
}

/// Outcome of one rollout step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub step: String,
    pub error: Option<String>,
}

/// Aggregated outcome of a best-effort password rollout.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    pub steps: Vec<StepReport>,
}

impl ApplyReport {
    fn record(&mut self, step: &str, result: Result<()>) {
        match result {
            Ok(()) => self.steps.push(StepReport {
                step: step.to_string(),
                error: None,
            }),
            Err(e) => {
                warn!("{} failed: {}", step, e);
                self.steps.push(StepReport {
                    step: step.to_string(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    /// True when every attempted step succeeded.
    pub fn all_ok(&self) -> bool {
        self.steps.iter().all(|s| s.error.is_none())
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match &step.error {
                None => writeln!(f, "ok: {}", step.step)?,
                Some(err) => writeln!(f, "failed: {}: {}", step.step, err)?,
            }
        }
        Ok(())
    }
}

/// Push a derived password into the application config files and the OS
/// account databases. Individual failures do not abort the remaining
/// steps; the combined report is the return value.
pub fn apply_password(
    runner: &dyn CommandRunner,
    targets: &RolloutTargets,
    password: &str,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    if let Some(ref ini) = targets.ini_file {
        report.record(
            "userid credential",
            update_ini_credential(ini, &targets.ini_section, "userid", password),
        );
    }
    if let Some(ref store) = targets.store_file {
        report.record(
            "gateway database password",
            update_store_password(store, password),
        );
    }
    report.record(
        "unix account password",
        set_unix_password(runner, &targets.unix_user, password),
    );
    report.record(
        "samba account password",
        set_samba_password(runner, &targets.samba_user, password),
    );
    report
}

/// Replace the password portion of a `user/PW@service` credential held
/// under `key` in the named ini section. Everything else in the file is
/// preserved byte for byte.
pub fn update_ini_credential(path: &Path, section: &str, key: &str, password: &str) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let cred_re = Regex::new(r"(/)[^@]*(@)").expect("static regex");

    let mut in_section = false;
    let mut replaced = false;
    let mut out = Vec::with_capacity(content.lines().count());

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_section = trimmed[1..trimmed.len() - 1].trim() == section;
            out.push(line.to_string());
            continue;
        }
        if in_section && !replaced {
            if let Some((k, v)) = line.split_once('=') {
                if k.trim() == key {
                    let new_value = cred_re.replace(v, format!("${{1}}{password}${{2}}"));
                    out.push(format!("{k}={new_value}"));
                    replaced = true;
                    continue;
                }
            }
        }
        out.push(line.to_string());
    }

    if !replaced {
        return Err(ConsoleError::not_found(format!(
            "{key} in section [{section}] of {}",
            path.display()
        )));
    }

    let mut serialized = out.join("\n");
    serialized.push('\n');
    fs::write(path, serialized)?;
    Ok(())
}

/// Positionally replace the `PlsqlDatabasePassword` entry of a config-store
/// file: the new line lands exactly where the old one was.
pub fn update_store_password(path: &Path, password: &str) -> Result<()> {
    let mut store = ConfigStore::load_path(path)?;
    let position = store
        .position(PLSQL_PASSWORD_KEY)
        .ok_or_else(|| ConsoleError::not_found(format!("{PLSQL_PASSWORD_KEY} in {}", path.display())))?;
    store.delete(PLSQL_PASSWORD_KEY);
    store.set(PLSQL_PASSWORD_KEY, password, Some(position));
    store.write()
}

fn set_unix_password(runner: &dyn CommandRunner, user: &str, password: &str) -> Result<()> {
    // Credentials go over stdin so they never show up in the process list
    let input = format!("{user}:{password}\n");
    runner
        .run_with_stdin("chpasswd", &[], &input)?
        .ensure_success("chpasswd")?;
    Ok(())
}

fn set_samba_password(runner: &dyn CommandRunner, user: &str, password: &str) -> Result<()> {
    let input = format!("{password}\n{password}\n");
    runner
        .run_with_stdin("smbpasswd", &["-s", "-a", user], &input)?
        .ensure_success("smbpasswd")?;
    Ok(())
}

/// One tracked file whose recorded digest no longer matches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumDrift {
    pub path: PathBuf,
    pub recorded: String,
    /// None when the file has disappeared.
    pub current: Option<String>,
}

fn sha256_hex(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    let digest = Sha256::digest(&data);
    Ok(format!("{digest:x}"))
}

/// Record SHA-256 digests of the tracked files into the csums file.
///
/// Any previous csums file is kept as a timestamp-suffixed backup first.
/// Files that cannot be read are skipped, matching the tolerant behavior
/// expected on half-provisioned appliances.
pub fn record_checksums(paths: &ConsolePaths, files: &[PathBuf]) -> Result<usize> {
    if paths.csum_file.exists() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let backup = paths.csum_file.with_extension(format!("bak.{stamp}"));
        fs::copy(&paths.csum_file, &backup)?;
    }

    let mut out = String::new();
    let mut recorded = 0;
    for file in files {
        match sha256_hex(file) {
            Ok(digest) => {
                out.push_str(&format!("{} {}\n", file.display(), digest));
                recorded += 1;
            }
            Err(e) => warn!("checksum of {} skipped: {}", file.display(), e),
        }
    }

    if let Some(parent) = paths.csum_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&paths.csum_file, out)?;
    info!("recorded {} checksum(s)", recorded);
    Ok(recorded)
}

/// Compare recorded digests against the files on disk.
pub fn verify_checksums(paths: &ConsolePaths) -> Result<Vec<ChecksumDrift>> {
    let content = fs::read_to_string(&paths.csum_file)?;
    let mut drifts = Vec::new();
    for line in content.lines() {
        let Some((path, recorded)) = line.rsplit_once(' ') else {
            continue;
        };
        let path = PathBuf::from(path);
        let current = sha256_hex(&path).ok();
        if current.as_deref() != Some(recorded) {
            drifts.push(ChecksumDrift {
                path,
                recorded: recorded.to_string(),
                current,
            });
        }
    }
    Ok(drifts)
}
