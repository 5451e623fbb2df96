//! Settings profiles.
//!
//! A profile is a TOML file with a `[settings]` table:
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! compiler = "gcc"
//! "compiler.version" = "13"
//! "compiler.cppstd" = "20"
//! build_type = "Release"
//! ```
//!
//! Settings are resolved in order, later sources winning:
//! - the detected host settings
//! - Global: `~/.snd-recipe/profiles/default.toml`
//! - every `--profile` given on the command line
//! - every `-s key=value` given on the command line

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::settings::BuildSettings;

/// A named set of settings values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// `key = value` settings, keys as accepted by `-s`
    pub settings: BTreeMap<String, String>,
}

impl Profile {
    /// Load a profile from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }

    /// Load a profile with fallback to an empty one if the file doesn't exist
    /// or cannot be read.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load profile from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another profile into this one (other takes precedence).
    pub fn merge(&mut self, other: Profile) {
        self.settings.extend(other.settings);
    }
}

/// Get the global config directory (`~/.snd-recipe`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".snd-recipe"))
}

/// Get the global default profile path.
pub fn default_profile_path() -> Option<PathBuf> {
    global_config_dir().map(|d| d.join("profiles").join("default.toml"))
}

/// Resolve a `--profile` argument: an existing file path, or the name of a
/// profile in the global profiles directory.
pub fn profile_path(name_or_path: &str) -> Result<PathBuf> {
    let path = PathBuf::from(name_or_path);
    if path.is_file() {
        return Ok(path);
    }

    let named = global_config_dir()
        .map(|d| d.join("profiles").join(format!("{}.toml", name_or_path)))
        .filter(|p| p.is_file());

    named.with_context(|| format!("profile not found: {}", name_or_path))
}

/// Compute the effective settings.
///
/// `default_profile` is read leniently; explicit `profiles` must load.
pub fn resolve_settings(
    default_profile: Option<&Path>,
    profiles: &[PathBuf],
    pairs: &[String],
) -> Result<BuildSettings> {
    let mut merged = default_profile
        .map(Profile::load_or_default)
        .unwrap_or_default();

    for path in profiles {
        merged.merge(Profile::load(path)?);
    }

    let mut settings = BuildSettings::host();
    settings
        .apply_map(&merged.settings)
        .context("invalid setting in profile")?;

    // `compiler` goes first so a family change only resets sub-settings that
    // came from the host or a profile, never ones given alongside it.
    let (compiler, rest): (Vec<&String>, Vec<&String>) =
        pairs.iter().partition(|pair| sets_compiler(pair));
    for pair in compiler.into_iter().chain(rest) {
        settings
            .apply_pair(pair)
            .with_context(|| format!("invalid setting `{}`", pair))?;
    }

    Ok(settings)
}

fn sets_compiler(pair: &str) -> bool {
    pair.split_once('=')
        .is_some_and(|(key, _)| key.trim() == "compiler")
}
