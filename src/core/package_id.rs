//! Binary package identifiers.
//!
//! A package id is the SHA-256 of a canonical text describing everything that
//! can change the installed artifacts: the package reference, every settings
//! axis the manifest declares, and the declared requirements. Runs with
//! different settings therefore get different install roots.

use sha2::{Digest, Sha256};

use crate::core::identity::PackageIdentity;
use crate::core::requirement::RequirementSet;
use crate::core::settings::{BuildSettings, SettingAxis};

/// Compute the package id for one configuration.
pub fn package_id(
    identity: &PackageIdentity,
    axes: &[SettingAxis],
    settings: &BuildSettings,
    requires: &RequirementSet,
) -> String {
    hex::encode(Sha256::digest(canonical_info(identity, axes, settings, requires)))
}

/// The text that is hashed, one `key=value` per line in sorted sections.
pub fn canonical_info(
    identity: &PackageIdentity,
    axes: &[SettingAxis],
    settings: &BuildSettings,
    requires: &RequirementSet,
) -> String {
    let mut out = String::new();

    out.push_str("[package]\n");
    out.push_str(&identity.reference());
    out.push('\n');

    out.push_str("[settings]\n");
    for (key, value) in settings.to_pairs() {
        let axis = key.split('.').next().unwrap_or(key.as_str());
        if axes.iter().any(|a| a.as_str() == axis) {
            out.push_str(&format!("{}={}\n", key, value));
        }
    }

    out.push_str("[requires]\n");
    for requirement in requires {
        out.push_str(&requirement.reference());
        out.push('\n');
    }

    out
}
