//! Blocking subprocess execution.
//!
//! Every OS tool the console touches (`ifup`, `sfdisk`, `file`, `chpasswd`,
//! `smbpasswd`, `hostname`) goes through the `CommandRunner` trait so that
//! helpers can be exercised against canned output in tests. The system
//! implementation is a plain blocking `std::process::Command` wait with no
//! timeout and no retries; a failed tool is surfaced verbatim.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{ConsoleError, Result};

/// Captured result of one subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited with code 0.
    pub success: bool,
}

impl CommandOutput {
    /// Both streams concatenated, stdout first. Several tools (`sfdisk` in
    /// particular) scatter diagnostics across both.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }

    /// Turn a failed invocation into an `ExternalTool` error.
    pub fn ensure_success(self, command: &str) -> Result<CommandOutput> {
        if self.success {
            Ok(self)
        } else {
            Err(ConsoleError::ExternalTool {
                command: command.to_string(),
                code: self.exit_code.unwrap_or(-1),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam for shelling out to OS tools.
pub trait CommandRunner {
    /// Run a command to completion and capture its output.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run a command, feeding `input` on stdin. Used for `chpasswd`-style
    /// tools so credentials never appear in the argument list.
    fn run_with_stdin(&self, program: &str, args: &[&str], input: &str) -> Result<CommandOutput>;
}

/// `CommandRunner` backed by real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn collect(output: std::process::Output, program: &str) -> CommandOutput {
        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };
        if result.success {
            debug!("{} exited successfully", program);
        } else {
            info!(
                "{} failed with exit code {:?}",
                program, result.exit_code
            );
        }
        result
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("running: {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(Self::collect(output, program))
    }

    fn run_with_stdin(&self, program: &str, args: &[&str], input: &str) -> Result<CommandOutput> {
        debug!("running (with stdin): {} {:?}", program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        Ok(Self::collect(output, program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_joins_streams() {
        let out = CommandOutput {
            stdout: "line one".to_string(),
            stderr: "Warning: something".to_string(),
            exit_code: Some(0),
            success: true,
        };
        let combined = out.combined();
        assert!(combined.contains("line one"));
        assert!(combined.contains("Warning: something"));
    }

    #[test]
    fn test_ensure_success_maps_failure() {
        let out = CommandOutput {
            stdout: String::new(),
            stderr: "no such device".to_string(),
            exit_code: Some(2),
            success: false,
        };
        let err = out.ensure_success("sfdisk").unwrap_err();
        match err {
            ConsoleError::ExternalTool { command, code, stderr } => {
                assert_eq!(command, "sfdisk");
                assert_eq!(code, 2);
                assert_eq!(stderr, "no such device");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_system_runner_true() {
        // `true` is universally available on the target platform
        let out = SystemRunner.run("true", &[]).unwrap();
        assert!(out.success);
    }

    #[test]
    fn test_system_runner_stdin_cat() {
        let out = SystemRunner.run_with_stdin("cat", &[], "hello\n").unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "hello\n");
    }
}
