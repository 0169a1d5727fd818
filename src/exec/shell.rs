//! Host shell collaborator

use std::process::Command;

use super::ExecResult;

/// Runs a full command line and captures its output
///
/// Implementations block until the command exits. Output is returned
/// untrimmed; [`super::Executor`] normalizes it.
pub trait Shell: Send + Sync {
    fn execute(&self, command_line: &str) -> std::io::Result<ExecResult>;
}

/// `sh -c <command line>` on the local host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn execute(&self, command_line: &str) -> std::io::Result<ExecResult> {
        let output = Command::new("sh").arg("-c").arg(command_line).output()?;

        Ok(ExecResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            skipped: false,
        })
    }
}
