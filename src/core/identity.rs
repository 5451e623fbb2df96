//! Package identity: static metadata fixed when a manifest is loaded.

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::requirement::parse_version_flexible;

/// Package metadata from the `[package]` section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Package name
    pub name: String,

    /// Package version (semver, partial versions allowed)
    pub version: String,

    /// License identifier
    pub license: String,

    /// Author or organization
    pub author: String,

    /// Project homepage or repository
    pub url: String,
}

impl PackageIdentity {
    /// Check the metadata is usable as a package identity.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("package name must not be empty");
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
        {
            bail!(
                "package name `{}` may only contain letters, digits, `-`, `_`, `.` and `+`",
                self.name
            );
        }

        self.version()?;

        Url::parse(&self.url)
            .with_context(|| format!("invalid url `{}` for package `{}`", self.url, self.name))?;

        Ok(())
    }

    /// Parse the version, padding partial versions (`1.0` -> `1.0.0`).
    pub fn version(&self) -> Result<Version> {
        parse_version_flexible(&self.version).with_context(|| {
            format!(
                "invalid version `{}` for package `{}`",
                self.version, self.name
            )
        })
    }

    /// `name/version` reference.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snd() -> PackageIdentity {
        PackageIdentity {
            name: "snd".to_string(),
            version: "1.0.0".to_string(),
            license: "MIT".to_string(),
            author: "ColugoMusic".to_string(),
            url: "https://github.com/colugomusic/snd".to_string(),
        }
    }

    #[test]
    fn test_valid_identity() {
        let id = snd();
        id.validate().unwrap();
        assert_eq!(id.reference(), "snd/1.0.0");
        assert_eq!(id.version().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_invalid_identity() {
        let mut id = snd();
        id.name = String::new();
        assert!(id.validate().is_err());

        let mut id = snd();
        id.name = "snd lib".to_string();
        assert!(id.validate().is_err());

        let mut id = snd();
        id.version = "latest".to_string();
        assert!(id.validate().is_err());

        let mut id = snd();
        id.url = "not a url".to_string();
        assert!(id.validate().is_err());
    }
}
