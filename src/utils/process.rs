//! External process execution.
//!
//! git, npm and wrangler are driven through [`CommandRunner`] so the
//! importer and publisher can be exercised against a fake runner in tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{Result, VbError};

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Wrangler and npm both report missing credentials only through stderr text.
    #[must_use]
    pub fn mentions_auth_failure(&self) -> bool {
        let stderr = self.stderr.to_lowercase();
        stderr.contains("not logged in") || stderr.contains("authentication")
    }

    /// First 200 characters of stderr, for error summaries.
    #[must_use]
    pub fn stderr_excerpt(&self) -> String {
        self.stderr.trim().chars().take(200).collect()
    }

    /// Convert a nonzero exit into [`VbError::ExternalProcess`].
    pub fn check(self, tool: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(VbError::ExternalProcess {
                tool: tool.to_string(),
                code: self.exit_code,
                message: self.stderr_excerpt(),
            })
        }
    }
}

/// Execute a program and capture its exit code and output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs commands on the host. Blocks until the child exits; no timeout.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn locate(program: &str) -> Result<PathBuf> {
        which::which(program).map_err(|err| VbError::ExternalProcess {
            tool: program.to_string(),
            code: 127,
            message: format!("{program} not found on PATH: {err}"),
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
        let binary = Self::locate(program)?;
        debug!(program, ?args, ?cwd, "running external command");

        let mut cmd = Command::new(binary);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
