//! Implementation of `snd-recipe inspect`.

use std::path::Path;

use serde::Serialize;

use crate::core::identity::PackageIdentity;
use crate::core::manifest::{ConsumerInfo, ExportedSources, GeneratorSet, Manifest, ValidationRules};
use crate::core::package_id::package_id;
use crate::core::settings::{BuildSettings, SettingAxis};

/// Everything a host needs to know about the recipe without running it.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport<'a> {
    #[serde(flatten)]
    pub identity: &'a PackageIdentity,
    pub reference: String,
    pub settings: &'a [SettingAxis],
    pub generators: &'a GeneratorSet,
    pub exports_sources: &'a ExportedSources,
    pub requires: Vec<String>,
    pub validate: &'a ValidationRules,
    pub package_info: &'a ConsumerInfo,
    pub recipe_folder: &'a Path,
    /// Binary package id for the effective settings
    pub package_id: String,
}

pub fn inspect<'a>(manifest: &'a Manifest, settings: &BuildSettings) -> InspectReport<'a> {
    InspectReport {
        identity: &manifest.identity,
        reference: manifest.identity.reference(),
        settings: &manifest.settings,
        generators: &manifest.generators,
        exports_sources: &manifest.exports_sources,
        requires: manifest.requires.iter().map(|r| r.reference()).collect(),
        validate: &manifest.validate,
        package_info: &manifest.consumer_info,
        recipe_folder: &manifest.manifest_dir,
        package_id: package_id(&manifest.identity, &manifest.settings, settings, &manifest.requires),
    }
}
