//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

use crate::lifecycle::errors::{ToolFailure, ToolStep};

/// Environment variable overriding the cmake executable.
pub const CMAKE_ENV: &str = "SND_RECIPE_CMAKE";

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command and wait for completion, capturing output.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.output()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Execute as one build-tool step. Any failure, including a failure to
    /// start the tool, is reported with the tool's own output.
    pub fn exec_step(&self, step: ToolStep) -> Result<Output, ToolFailure> {
        let command = self.display_command();
        tracing::debug!("{}: {}", step, command);

        let output = self.exec().map_err(|e| ToolFailure {
            step,
            command: command.clone(),
            status: None,
            diagnostic: format!("{:#}", e),
        })?;

        if !output.stdout.is_empty() {
            tracing::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }

        if !output.status.success() {
            return Err(ToolFailure {
                step,
                command,
                status: output.status.code(),
                diagnostic: combined_output(&output),
            });
        }

        Ok(output)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// stderr followed by stdout; build tools split diagnostics across both.
fn combined_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    match (stderr.trim().is_empty(), stdout.trim().is_empty()) {
        (false, false) => format!("{}\n{}", stderr.trim_end(), stdout.trim_end()),
        (false, true) => stderr.trim_end().to_string(),
        (true, _) => stdout.trim_end().to_string(),
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake, honouring `SND_RECIPE_CMAKE`.
pub fn find_cmake() -> Option<PathBuf> {
    if let Ok(cmake) = std::env::var(CMAKE_ENV) {
        if let Some(path) = find_executable(&cmake) {
            return Some(path);
        }
        tracing::warn!("{} is set to `{}` but it is not executable", CMAKE_ENV, cmake);
    }

    find_executable("cmake")
}
