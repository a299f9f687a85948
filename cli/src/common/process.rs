//! # Pilothouse Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Every Pilothouse operation ends up running an external program: Docker
//! Compose, `openssl`, `sudo tee`. This module wraps `tokio::process::Command`
//! with three execution styles:
//!
//! - **Streamed** (`run_streamed`): stdio inherited, so the user sees output and
//!   can interact (mysql shell, `wp shell`, `logs -f`). Non-zero exit is an error.
//! - **Captured** (`run_captured`): stdout/stderr collected and returned with the
//!   exit status; the caller decides what failure means (readiness polling).
//! - **Piped input** (`run_with_stdin`): content written to the child's stdin.
//!
//! Failures map to `PilothouseError::ExternalCommand`, and a missing binary
//! gets a hint to install it.
//!
//! ## Usage
//!
//! ```rust
//! let spec = CommandSpec::new("docker").args(["compose", "ps"]);
//! process::run_streamed(&spec).await?;
//!
//! let output = process::run_captured(&spec).await?;
//! if output.success { println!("{}", output.stdout); }
//! ```
//!
use crate::core::error::{PilothouseError, Result};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

/// A program invocation: program, arguments, extra environment, working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

/// Result of a captured run.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs(mut self, env: &[(String, String)]) -> Self {
        self.env.extend(env.iter().cloned());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Program and arguments joined for messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}

fn spawn_error(spec: &CommandSpec, e: std::io::Error) -> anyhow::Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!(e).context(format!(
            "Failed to execute '{}'. Is it installed and in PATH?",
            spec.program
        ))
    } else {
        anyhow!(e).context(format!("Failed to execute '{}'", spec.display()))
    }
}

fn exit_code(status: std::process::ExitStatus) -> String {
    status.code().map_or("?".to_string(), |c| c.to_string())
}

/// Runs with inherited stdio and fails on a non-zero exit.
pub async fn run_streamed(spec: &CommandSpec) -> Result<()> {
    info!("Executing command: {}", spec.display());
    let status = spec
        .command()
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| spawn_error(spec, e))?;

    if !status.success() {
        let code = exit_code(status);
        error!("Command '{}' failed with exit code {}", spec.display(), code);
        return Err(anyhow!(PilothouseError::ExternalCommand {
            cmd: spec.display(),
            status: code,
            output: "Command failed. See terminal output above for details.".to_string(),
        }));
    }
    debug!("Command '{}' completed successfully.", spec.display());
    Ok(())
}

/// Runs with captured output. A non-zero exit is reported, not raised.
pub async fn run_captured(spec: &CommandSpec) -> Result<CommandOutput> {
    debug!("Executing (captured): {}", spec.display());
    let output = spec
        .command()
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_error(spec, e))?;
    let result = CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        "Captured '{}': success={}, stdout='{}', stderr='{}'",
        spec.display(),
        result.success,
        result.stdout.trim(),
        result.stderr.trim()
    );
    Ok(result)
}

/// Like `run_captured`, but a non-zero exit becomes `ExternalCommand` with the output attached.
pub async fn run_checked(spec: &CommandSpec) -> Result<CommandOutput> {
    let output = run_captured(spec).await?;
    if !output.success {
        error!("Command '{}' failed", spec.display());
        return Err(anyhow!(PilothouseError::ExternalCommand {
            cmd: spec.display(),
            status: output.code.map_or("?".to_string(), |c| c.to_string()),
            output: format!("{}{}", output.stdout, output.stderr),
        }));
    }
    Ok(output)
}

/// Writes `input` to the child's stdin. Output goes to the terminal except
/// stdout, which is discarded (`tee` echoes its input).
pub async fn run_with_stdin(spec: &CommandSpec, input: &str) -> Result<()> {
    info!("Executing command with piped input: {}", spec.display());
    let mut child = spec
        .command()
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| spawn_error(spec, e))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("Failed to open stdin of '{}'", spec.program))?;
    stdin
        .write_all(input.as_bytes())
        .await
        .with_context(|| format!("Failed to write to stdin of '{}'", spec.program))?;
    drop(stdin);

    let status = child
        .wait()
        .await
        .with_context(|| format!("Failed waiting for '{}'", spec.display()))?;
    if !status.success() {
        let code = exit_code(status);
        error!("Command '{}' failed with exit code {}", spec.display(), code);
        return Err(anyhow!(PilothouseError::ExternalCommand {
            cmd: spec.display(),
            status: code,
            output: "See terminal output above for details.".to_string(),
        }));
    }
    Ok(())
}
