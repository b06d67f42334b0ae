//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use bootconsole::{CommandOutput, CommandRunner, Result};

/// One recorded subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// `CommandRunner` with canned per-program responses and a call log.
///
/// Responses are consumed in FIFO order per program; a program with no
/// queued response succeeds with empty output.
#[derive(Default)]
pub struct FakeRunner {
    responses: Mutex<HashMap<String, Vec<CommandOutput>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, program: &str, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap()
            .entry(program.to_string())
            .or_default()
            .push(output);
    }

    pub fn respond_stdout(&self, program: &str, stdout: &str) {
        self.respond(program, ok_output(stdout, ""));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    fn record_and_answer(&self, program: &str, args: &[&str], stdin: Option<&str>) -> CommandOutput {
        self.calls.lock().unwrap().push(Call {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            stdin: stdin.map(str::to_string),
        });
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(program) {
            Some(queue) if !queue.is_empty() => queue.remove(0),
            _ => ok_output("", ""),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        Ok(self.record_and_answer(program, args, None))
    }

    fn run_with_stdin(&self, program: &str, args: &[&str], input: &str) -> Result<CommandOutput> {
        Ok(self.record_and_answer(program, args, Some(input)))
    }
}

pub fn ok_output(stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        exit_code: Some(0),
        success: true,
    }
}

pub fn failed_output(stderr: &str, code: i32) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(code),
        success: false,
    }
}
