//! Typed failures of the lifecycle stages.
//!
//! Every error is fatal to the run it occurs in. Nothing here retries or
//! translates a failure; external tool output is carried through verbatim.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::standard::{CppStandard, CppStd};
use crate::lifecycle::stages::LifecycleState;

/// Static incompatibility detected before any build work.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("standard-too-low: current cppstd ({found}) is lower than the required C++ standard ({required})")]
    #[diagnostic(
        code(snd::validate::standard_too_low),
        help("raise `compiler.cppstd` in your settings or profile, or leave it unset")
    )]
    StandardTooLow {
        found: CppStd,
        required: CppStandard,
    },
}

impl ConfigurationError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            ConfigurationError::StandardTooLow { .. } => "standard-too-low",
        }
    }
}

/// A host-supplied resolution that does not fit the declared requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DependencyResolutionError {
    #[error("`{name}/{version}` does not satisfy the declared requirement `{name}/[{selector}]`")]
    #[diagnostic(
        code(snd::requires::unsatisfied),
        help("supply a version inside the declared range")
    )]
    Unsatisfied {
        name: String,
        version: String,
        selector: String,
    },

    #[error("`{name}` was supplied but the package does not require it")]
    #[diagnostic(code(snd::requires::undeclared))]
    Undeclared { name: String },
}

/// Which external tool invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStep {
    Configure,
    Build,
    Install,
}

impl fmt::Display for ToolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolStep::Configure => "configure",
            ToolStep::Build => "build",
            ToolStep::Install => "install",
        })
    }
}

/// Failure of one external build-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{step} step failed: `{command}` {}", exit_description(.status))]
pub struct ToolFailure {
    pub step: ToolStep,
    /// Command line as run
    pub command: String,
    /// Exit code; `None` when the tool could not be run or was killed
    pub status: Option<i32>,
    /// Diagnostic output of the tool
    pub diagnostic: String,
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with code {}", code),
        None => "did not run to completion".to_string(),
    }
}

/// Failure of the configure or build step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BuildError {
    #[error("failed to update generated file {}: {message}", .path.display())]
    #[diagnostic(code(snd::build::generate))]
    Generate { path: PathBuf, message: String },

    #[error("{failure}\n{}", .failure.diagnostic)]
    #[diagnostic(
        code(snd::build::tool),
        help("run again with --verbose to see the full command lines")
    )]
    Tool { failure: ToolFailure },
}

/// Failure of the install step.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PackagingError {
    #[error("{failure}\n{}", .failure.diagnostic)]
    #[diagnostic(code(snd::package::install))]
    Tool { failure: ToolFailure },
}

/// A failed lifecycle run, tagged with the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("dependency resolution failed: {0}")]
    #[diagnostic(transparent)]
    DependencyResolution(#[from] DependencyResolutionError),

    #[error("build failed: {0}")]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error("packaging failed: {0}")]
    #[diagnostic(transparent)]
    Packaging(#[from] PackagingError),
}

impl LifecycleError {
    /// The last state the run reached before failing.
    pub fn reached(&self) -> LifecycleState {
        match self {
            LifecycleError::Configuration(_) => LifecycleState::RequirementsDeclared,
            LifecycleError::DependencyResolution(_) | LifecycleError::Build(_) => {
                LifecycleState::Validated
            }
            LifecycleError::Packaging(_) => LifecycleState::Built,
        }
    }

    /// Process exit code for a host CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::Configuration(_) => 2,
            LifecycleError::DependencyResolution(_) => 3,
            LifecycleError::Build(_) => 4,
            LifecycleError::Packaging(_) => 5,
        }
    }
}
