//! Command implementations

pub mod completions;
pub mod create;
pub mod export;
pub mod inspect;

use anyhow::{Context, Result};

use snd_recipe::core::manifest::Manifest;
use snd_recipe::core::settings::BuildSettings;
use snd_recipe::util::config::{default_profile_path, profile_path, resolve_settings};

use crate::cli::{ManifestArgs, SettingsArgs};

/// Load `--manifest`, else the nearest Recipe.toml, else the built-in recipe
/// rooted at the current directory.
pub fn load_manifest(args: &ManifestArgs) -> Result<Manifest> {
    if let Some(path) = &args.manifest {
        return Manifest::load(path);
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    match Manifest::find(&cwd) {
        Some(path) => Manifest::load(&path),
        None => {
            tracing::debug!("No Recipe.toml found; using the built-in snd recipe");
            Manifest::builtin(cwd)
        }
    }
}

/// Effective settings: host, global default profile, `-p` profiles, `-s` pairs.
pub fn load_settings(args: &SettingsArgs) -> Result<BuildSettings> {
    let profiles = args
        .profiles
        .iter()
        .map(|p| profile_path(p))
        .collect::<Result<Vec<_>>>()?;

    let default_profile = default_profile_path();
    resolve_settings(default_profile.as_deref(), &profiles, &args.settings)
}
