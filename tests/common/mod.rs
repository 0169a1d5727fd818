//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use sysinit::exec::{Shell, SystemShell};
use sysinit::{Elevation, ExecResult, UnitOptions};

/// Records every command; `systemctl` calls are answered from canned
/// replies, everything else runs on the real shell
#[derive(Default)]
pub struct PassthroughShell {
    calls: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, String)>>,
}

impl PassthroughShell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, needle: &str, stdout: &str) {
        self.replies
            .lock()
            .unwrap()
            .push((needle.to_string(), stdout.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn systemctl_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("systemctl "))
            .collect()
    }
}

impl Shell for PassthroughShell {
    fn execute(&self, command_line: &str) -> std::io::Result<ExecResult> {
        self.calls.lock().unwrap().push(command_line.to_string());

        if !command_line.starts_with("systemctl ") {
            return SystemShell.execute(command_line);
        }

        let stdout = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| command_line.contains(needle.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();

        Ok(ExecResult {
            exit_code: Some(0),
            stdout,
            ..ExecResult::default()
        })
    }
}

/// Options that install into `root` without elevation
pub fn options(root: &Path, shell: &Arc<PassthroughShell>) -> UnitOptions {
    UnitOptions {
        install_root: root.to_path_buf(),
        elevation: Elevation::None,
        shell: shell.clone(),
        ..UnitOptions::default()
    }
}
