//! The six lifecycle hooks.
//!
//! A [`Recipe`] exposes its identity, the generators it wants run and exactly
//! six operations. The order they
//! run in is fixed by [`Lifecycle`](crate::lifecycle::stages::Lifecycle), not
//! by the recipe.

use std::path::{Path, PathBuf};

use crate::builder::cmake::CMake;
use crate::builder::tool::BuildTool;
use crate::core::identity::PackageIdentity;
use crate::core::layout::Layout;
use crate::core::manifest::{ConsumerInfo, GeneratorSet, Manifest};
use crate::core::requirement::RequirementSet;
use crate::core::settings::BuildSettings;
use crate::lifecycle::errors::{BuildError, ConfigurationError, PackagingError};

/// A package description with its lifecycle hooks.
pub trait Recipe {
    fn identity(&self) -> &PackageIdentity;

    /// Generators run between validation and the build hook.
    fn generators(&self) -> &GeneratorSet;

    /// Name the build, generators and install roots. Must not touch the
    /// filesystem and must return the same layout for the same settings.
    fn layout(&self, settings: &BuildSettings) -> Layout;

    /// The external dependencies of the package.
    fn requirements(&self) -> RequirementSet;

    /// Reject settings the package cannot be built with.
    fn validate(&self, settings: &BuildSettings) -> Result<(), ConfigurationError>;

    /// Configure, then build.
    fn build(&self, layout: &Layout) -> Result<(), BuildError>;

    /// Install build outputs into the layout's install root.
    fn package(&self, layout: &Layout) -> Result<(), PackagingError>;

    /// Metadata for consumers of the installed package.
    fn package_info(&self) -> ConsumerInfo;
}

/// A recipe driven entirely by a [`Manifest`], building with `T`.
#[derive(Debug, Clone)]
pub struct ManifestRecipe<T: BuildTool = CMake> {
    manifest: Manifest,
    install_root: PathBuf,
    tool: T,
}

impl<T: BuildTool> ManifestRecipe<T> {
    /// `install_root` is where `package` installs to. Distinct runs must use
    /// distinct roots.
    pub fn new(manifest: Manifest, install_root: impl Into<PathBuf>, tool: T) -> Self {
        ManifestRecipe {
            manifest,
            install_root: install_root.into(),
            tool,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }
}

impl<T: BuildTool> Recipe for ManifestRecipe<T> {
    fn identity(&self) -> &PackageIdentity {
        &self.manifest.identity
    }

    fn generators(&self) -> &GeneratorSet {
        &self.manifest.generators
    }

    fn layout(&self, settings: &BuildSettings) -> Layout {
        Layout::cmake(&self.manifest.manifest_dir, &self.install_root, settings)
    }

    fn requirements(&self) -> RequirementSet {
        self.manifest.requires.clone()
    }

    fn validate(&self, settings: &BuildSettings) -> Result<(), ConfigurationError> {
        // Only checked when the caller chose a standard.
        let (Some(required), Some(found)) = (self.manifest.validate.min_cppstd, settings.cppstd())
        else {
            return Ok(());
        };

        if found.satisfies(required) {
            Ok(())
        } else {
            Err(ConfigurationError::StandardTooLow { found, required })
        }
    }

    fn build(&self, layout: &Layout) -> Result<(), BuildError> {
        self.tool
            .configure(layout)
            .map_err(|failure| BuildError::Tool { failure })?;
        self.tool
            .build(layout)
            .map_err(|failure| BuildError::Tool { failure })
    }

    fn package(&self, layout: &Layout) -> Result<(), PackagingError> {
        self.tool
            .install(layout)
            .map_err(|failure| PackagingError::Tool { failure })
    }

    fn package_info(&self) -> ConsumerInfo {
        self.manifest.consumer_info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requirement::Requirement;
    use crate::core::standard::{CppStandard, CppStd};
    use crate::lifecycle::errors::ToolStep;
    use crate::test_support::{gcc_settings, snd_recipe, RecordingTool};
    use semver::Version;
    use tempfile::TempDir;

    #[test]
    fn test_requirements_are_fixed() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());

        let requires = recipe.requirements();
        assert_eq!(requires.len(), 1);

        let math: &Requirement = requires.get("external-math-library").unwrap();
        assert_eq!(math.selector().as_str(), ">=0");
        assert!(math.selector().matches(&Version::new(0, 0, 1)));
        assert!(math.selector().matches(&Version::new(42, 0, 0)));
    }

    #[test]
    fn test_validate_cppstd() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());

        for standard in CppStandard::ALL {
            let settings = gcc_settings(Some(standard.as_str()));
            let result = recipe.validate(&settings);
            if standard >= CppStandard::Cpp20 {
                assert_eq!(result, Ok(()), "cppstd {}", standard);
            } else {
                assert_eq!(
                    result,
                    Err(ConfigurationError::StandardTooLow {
                        found: CppStd::new(standard),
                        required: CppStandard::Cpp20,
                    }),
                    "cppstd {}",
                    standard
                );
            }
        }
    }

    #[test]
    fn test_validate_gnu_standard() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());

        assert!(recipe.validate(&gcc_settings(Some("gnu23"))).is_ok());
        assert!(recipe.validate(&gcc_settings(Some("gnu17"))).is_err());
    }

    #[test]
    fn test_validate_without_cppstd_passes() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());

        assert_eq!(recipe.validate(&gcc_settings(None)), Ok(()));
    }

    #[test]
    fn test_layout_is_stable() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());
        let settings = gcc_settings(Some("20"));

        let first = recipe.layout(&settings);
        assert_eq!(first, recipe.layout(&settings));
        assert_eq!(first.install_root, recipe.install_root());
        assert!(!first.build_root.exists());
    }

    #[test]
    fn test_build_stops_after_failed_configure() {
        let tmp = TempDir::new().unwrap();
        let tool = RecordingTool::failing_at(ToolStep::Configure);
        let recipe = snd_recipe(tmp.path(), &tool);
        let layout = recipe.layout(&gcc_settings(None));

        let err = recipe.build(&layout).unwrap_err();
        assert!(matches!(err, BuildError::Tool { ref failure } if failure.step == ToolStep::Configure));
        assert_eq!(tool.calls(), [ToolStep::Configure]);
    }

    #[test]
    fn test_package_info() {
        let tmp = TempDir::new().unwrap();
        let recipe = snd_recipe(tmp.path(), RecordingTool::new());

        assert_eq!(recipe.package_info().include_directories, ["include"]);
    }
}
