//! Shell command execution
//!
//! Every lifecycle operation ends up here: one command line, optionally
//! prefixed with an elevation mechanism, run synchronously through the host
//! shell. Dry-run executors log the command and return a skipped result
//! without touching the shell.

mod shell;

pub use shell::{Shell, SystemShell};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// How privileged commands are prefixed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevation {
    #[default]
    Sudo,
    Doas,
    None,
}

impl Elevation {
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Sudo => Some("sudo"),
            Self::Doas => Some("doas"),
            Self::None => None,
        }
    }

    /// Apply the prefix to a command line
    pub fn wrap(&self, command_line: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{} {}", prefix, command_line),
            None => command_line.to_string(),
        }
    }
}

/// A command line plus how it should be run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command_line: String,
    pub elevate: bool,
    pub description: String,
}

impl CommandSpec {
    /// Unelevated command, described by its own command line
    pub fn new(command_line: impl Into<String>) -> Self {
        let command_line = command_line.into();
        Self {
            description: command_line.clone(),
            command_line,
            elevate: false,
        }
    }

    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Outcome of one command
///
/// `exit_code` is `None` when the command was skipped (dry run) or was
/// terminated by a signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub skipped: bool,
}

impl ExecResult {
    /// Sentinel returned in dry-run mode
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Skipped commands count as successful: there is nothing to inspect
    pub fn success(&self) -> bool {
        self.skipped || self.exit_code == Some(0)
    }
}

/// Runs command lines through a [`Shell`], honoring dry-run and elevation
#[derive(Clone)]
pub struct Executor {
    shell: Arc<dyn Shell>,
    elevation: Elevation,
    dry_run: bool,
    verbose: bool,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("elevation", &self.elevation)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Executor {
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self {
            shell,
            elevation: Elevation::default(),
            dry_run: false,
            verbose: false,
        }
    }

    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run a command specification, logging its description first
    pub fn execute(&self, spec: &CommandSpec) -> Result<ExecResult, ExecError> {
        log::debug!("{}", spec.description);
        self.run(&spec.command_line, spec.elevate)
    }

    /// Run one command line, exactly once
    pub fn run(&self, command_line: &str, elevate: bool) -> Result<ExecResult, ExecError> {
        let command = if elevate {
            self.elevation.wrap(command_line)
        } else {
            command_line.to_string()
        };

        if self.verbose {
            log::info!("Running command: {}", command);
        } else {
            log::debug!("Running command: {}", command);
        }

        if self.dry_run {
            log::warn!("[SKIP] Dry run: skipped execution of `{}`", command);
            return Ok(ExecResult::skipped());
        }

        let raw = self
            .shell
            .execute(&command)
            .map_err(|source| ExecError::Spawn {
                command: command.clone(),
                source,
            })?;

        let result = ExecResult {
            exit_code: raw.exit_code,
            stdout: raw.stdout.trim().to_string(),
            stderr: raw.stderr.trim().to_string(),
            skipped: false,
        };

        if result.exit_code != Some(0) && !result.stderr.is_empty() {
            log::error!(
                "Command failed (exit {:?}): {}\n{}",
                result.exit_code,
                command,
                result.stderr
            );
        } else if result.stdout.is_empty() {
            log::info!("Command output: [NO OUTPUT]");
        } else {
            log::info!("Command output:\n{}", result.stdout);
        }

        Ok(result)
    }
}
