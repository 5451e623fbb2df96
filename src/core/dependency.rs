//! Dependencies as resolved by the host.
//!
//! The recipe declares [`Requirement`](crate::core::requirement::Requirement)s;
//! the host package manager picks versions and installs them somewhere. What
//! comes back is a [`ResolvedDependency`]: enough for the dependency
//! generator to describe the installed package to the build tool.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::requirement::parse_version_flexible;

/// An installed dependency handed to the lifecycle by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    /// Package name
    pub name: String,

    /// Resolved version
    pub version: Version,

    /// Root of the installed package
    pub package_folder: PathBuf,

    /// Include directories relative to `package_folder`
    #[serde(default = "default_include_dirs")]
    pub include_dirs: Vec<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string()]
}

impl ResolvedDependency {
    pub fn new(name: impl Into<String>, version: Version, package_folder: impl Into<PathBuf>) -> Self {
        ResolvedDependency {
            name: name.into(),
            version,
            package_folder: package_folder.into(),
            include_dirs: default_include_dirs(),
        }
    }

    /// Absolute include directories.
    pub fn include_paths(&self) -> Vec<PathBuf> {
        self.include_dirs
            .iter()
            .map(|dir| self.package_folder.join(dir))
            .collect()
    }

    /// Make `package_folder` absolute against `base`.
    pub fn anchored(mut self, base: &Path) -> Self {
        if self.package_folder.is_relative() {
            self.package_folder = base.join(&self.package_folder);
        }
        self
    }
}

/// Parses `name/version=path`, as written on the command line.
impl FromStr for ResolvedDependency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (reference, folder) = s
            .split_once('=')
            .with_context(|| format!("expected `name/version=path`, got `{}`", s))?;
        let (name, version) = reference
            .split_once('/')
            .with_context(|| format!("expected `name/version` before `=`, got `{}`", reference))?;

        let name = name.trim();
        if name.is_empty() {
            bail!("dependency name must not be empty in `{}`", s);
        }
        let version = parse_version_flexible(version)
            .with_context(|| format!("invalid version `{}` for `{}`", version, name))?;
        let folder = folder.trim();
        if folder.is_empty() {
            bail!("package folder must not be empty in `{}`", s);
        }

        Ok(ResolvedDependency::new(name, version, folder))
    }
}
