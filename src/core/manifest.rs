//! Recipe.toml manifest parsing and schema.
//!
//! The manifest is the declarative description of a package: its identity,
//! the settings axes it depends on, the generators to run, the source paths
//! it exports, the dependencies it requires, the validation rules it imposes
//! and the metadata it publishes to consumers.
//!
//! The `snd` package's own manifest is compiled in (see [`Manifest::builtin`]),
//! so the lifecycle can run without a file on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use crate::core::identity::PackageIdentity;
use crate::core::requirement::{Requirement, RequirementSet, VersionSelector};
use crate::core::settings::SettingAxis;
use crate::core::standard::CppStandard;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Recipe.toml";

pub const BUILTIN_MANIFEST: &str = include_str!("../../Recipe.toml");

/// A build-tool input file generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Emits one package-config descriptor per resolved dependency
    CMakeDeps,
    /// Emits the toolchain descriptor passed to the configure step
    CMakeToolchain,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::CMakeDeps => "CMakeDeps",
            GeneratorKind::CMakeToolchain => "CMakeToolchain",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The generators a manifest asks for. Each appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratorSet(Vec<GeneratorKind>);

impl GeneratorSet {
    pub fn new(kinds: impl IntoIterator<Item = GeneratorKind>) -> Result<Self> {
        let mut set = Vec::new();
        for kind in kinds {
            if set.contains(&kind) {
                bail!("generator `{}` is listed more than once", kind);
            }
            set.push(kind);
        }
        Ok(GeneratorSet(set))
    }

    pub fn contains(&self, kind: GeneratorKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = GeneratorKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Path patterns selecting the sources a package exports.
///
/// `*` matches across directory separators, so `include/*` selects the whole
/// header tree.
#[derive(Debug, Clone, Default)]
pub struct ExportedSources {
    raw: Vec<String>,
    patterns: Vec<Pattern>,
}

impl ExportedSources {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let raw: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let patterns = raw
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid export pattern `{}`", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ExportedSources { raw, patterns })
    }

    /// Patterns as written.
    pub fn patterns(&self) -> &[String] {
        &self.raw
    }

    /// Whether a path relative to the manifest directory is exported.
    pub fn matches(&self, relative: &Path) -> bool {
        self.matching_pattern(relative).is_some()
    }

    /// Index of the first pattern selecting `relative`.
    pub fn matching_pattern(&self, relative: &Path) -> Option<usize> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        // Patterns are written with `/` on every platform.
        let normalized = relative.to_string_lossy().replace('\\', "/");
        self.patterns
            .iter()
            .position(|p| p.matches_with(&normalized, options))
    }
}

impl PartialEq for ExportedSources {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Serialize for ExportedSources {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Environment checks run before any build work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ValidationRules {
    /// Minimum language standard, enforced only when the caller sets `compiler.cppstd`
    #[serde(default)]
    pub min_cppstd: Option<CppStandard>,
}

/// Metadata published to consumers of the installed package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsumerInfo {
    /// Include directories, relative to the package root
    pub include_directories: Vec<String>,
}

impl ConsumerInfo {
    /// Absolute include directories under an installed package root.
    pub fn resolve_include_dirs(&self, package_root: &Path) -> Vec<PathBuf> {
        self.include_directories
            .iter()
            .map(|dir| package_root.join(dir))
            .collect()
    }
}

impl Default for ConsumerInfo {
    fn default() -> Self {
        ConsumerInfo {
            include_directories: vec!["include".to_string()],
        }
    }
}

/// The parsed manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub identity: PackageIdentity,

    /// Settings axes the package depends on
    pub settings: Vec<SettingAxis>,

    pub generators: GeneratorSet,

    pub exports_sources: ExportedSources,

    pub requires: RequirementSet,

    pub validate: ValidationRules,

    pub consumer_info: ConsumerInfo,

    /// The directory containing this manifest (the source root)
    pub manifest_dir: PathBuf,

    /// The file this manifest was loaded from; `None` for the built-in recipe
    pub source: Option<PathBuf>,
}

/// Raw manifest as deserialized from TOML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawManifest {
    package: PackageIdentity,

    #[serde(default)]
    settings: Vec<SettingAxis>,

    #[serde(default)]
    generators: Vec<GeneratorKind>,

    #[serde(default)]
    exports_sources: Vec<String>,

    #[serde(default)]
    requires: BTreeMap<String, VersionSelector>,

    #[serde(default)]
    validate: ValidationRules,

    #[serde(default)]
    package_info: Option<RawPackageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackageInfo {
    #[serde(default)]
    includedirs: Option<Vec<String>>,
}

impl Manifest {
    /// The `snd` manifest, anchored at `manifest_dir`.
    pub fn builtin(manifest_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::parse_in(BUILTIN_MANIFEST, manifest_dir.into())
    }

    /// Load a manifest from a file path. Relative paths are resolved against
    /// the current directory.
    pub fn load(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)
            .with_context(|| format!("failed to resolve manifest path: {}", path.display()))?;
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let mut manifest = Self::parse(&content, &path)?;
        manifest.source = Some(path);
        Ok(manifest)
    }

    /// Parse manifest content read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let manifest_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::parse_in(content, manifest_dir)
            .with_context(|| format!("invalid manifest: {}", path.display()))
    }

    fn parse_in(content: &str, manifest_dir: PathBuf) -> Result<Self> {
        let raw: RawManifest =
            toml::from_str(content).with_context(|| format!("failed to parse {}", MANIFEST_NAME))?;

        raw.package.validate()?;

        let mut settings = Vec::new();
        for axis in raw.settings {
            if settings.contains(&axis) {
                bail!("settings axis `{}` is listed more than once", axis.as_str());
            }
            settings.push(axis);
        }

        let mut requires = RequirementSet::new();
        for (name, selector) in raw.requires {
            requires.insert(Requirement::new(name, selector)?);
        }

        let consumer_info = match raw.package_info.and_then(|info| info.includedirs) {
            Some(dirs) => ConsumerInfo {
                include_directories: dirs,
            },
            None => ConsumerInfo::default(),
        };

        Ok(Manifest {
            identity: raw.package,
            settings,
            generators: GeneratorSet::new(raw.generators)?,
            exports_sources: ExportedSources::new(raw.exports_sources)?,
            requires,
            validate: raw.validate,
            consumer_info,
            manifest_dir,
            source: None,
        })
    }

    /// Find `Recipe.toml` in `dir` or any of its ancestors.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|d| d.join(MANIFEST_NAME))
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_manifest() {
        let manifest = Manifest::builtin("/work/snd").unwrap();

        assert_eq!(manifest.identity.name, "snd");
        assert_eq!(manifest.identity.version, "1.0.0");
        assert_eq!(manifest.identity.license, "MIT");
        assert_eq!(manifest.identity.author, "ColugoMusic");
        assert_eq!(manifest.identity.url, "https://github.com/colugomusic/snd");
        assert_eq!(
            manifest.settings,
            [
                SettingAxis::Os,
                SettingAxis::Compiler,
                SettingAxis::BuildType,
                SettingAxis::Arch
            ]
        );
        assert!(manifest.generators.contains(GeneratorKind::CMakeDeps));
        assert!(manifest.generators.contains(GeneratorKind::CMakeToolchain));
        assert_eq!(
            manifest.exports_sources.patterns(),
            ["CMakeLists.txt", "include/*"]
        );
        assert_eq!(manifest.validate.min_cppstd, Some(CppStandard::Cpp20));
        assert_eq!(manifest.consumer_info, ConsumerInfo::default());
        assert_eq!(manifest.manifest_dir, PathBuf::from("/work/snd"));
        assert_eq!(manifest.source, None);

        assert_eq!(manifest.requires.len(), 1);
        let req = manifest.requires.get("external-math-library").unwrap();
        assert_eq!(req.selector().as_str(), ">=0");
    }

    #[test]
    fn test_exported_sources_cross_directories() {
        let exports = ExportedSources::new(["CMakeLists.txt", "include/*"]).unwrap();

        assert!(exports.matches(Path::new("CMakeLists.txt")));
        assert!(exports.matches(Path::new("include/snd/ease.hpp")));
        assert!(exports.matches(Path::new("include/snd/audio/filter/1-pole.hpp")));
        assert!(!exports.matches(Path::new("src/clock/clock_divider.cpp")));
        assert!(!exports.matches(Path::new("sub/CMakeLists.txt")));
        assert_eq!(exports.matching_pattern(Path::new("include/a.h")), Some(1));
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let content = r#"
[package]
name = "tiny"
version = "0.3"
license = "MIT"
author = "someone"
url = "https://example.com/tiny"
"#;
        let manifest = Manifest::parse(content, Path::new("/src/tiny/Recipe.toml")).unwrap();
        assert!(manifest.requires.is_empty());
        assert!(manifest.generators.is_empty());
        assert_eq!(manifest.validate.min_cppstd, None);
        assert_eq!(manifest.consumer_info.include_directories, ["include"]);
        assert_eq!(manifest.manifest_dir, PathBuf::from("/src/tiny"));
    }

    #[test]
    fn test_parse_rejects_bad_manifests() {
        let base = r#"
[package]
name = "tiny"
version = "1.0.0"
license = "MIT"
author = "someone"
url = "https://example.com/tiny"
"#;
        let path = Path::new("Recipe.toml");

        let duplicate_generator = format!("generators = [\"CMakeDeps\", \"CMakeDeps\"]\n{}", base);
        assert!(Manifest::parse(&duplicate_generator, path).is_err());

        let unknown_generator = format!("generators = [\"Premake\"]\n{}", base);
        assert!(Manifest::parse(&unknown_generator, path).is_err());

        let unknown_axis = format!("settings = [\"os\", \"libc\"]\n{}", base);
        assert!(Manifest::parse(&unknown_axis, path).is_err());

        let empty_name = format!("{}\n[requires]\n\"\" = \">=0\"\n", base);
        assert!(Manifest::parse(&empty_name, path).is_err());

        let bad_selector = format!("{}\n[requires]\nzlib = \">=one\"\n", base);
        assert!(Manifest::parse(&bad_selector, path).is_err());

        let bad_standard = format!("{}\n[validate]\nmin-cppstd = \"19\"\n", base);
        assert!(Manifest::parse(&bad_standard, path).is_err());

        // A misspelled rule must not silently disable validation
        let misspelled_rule = format!("{}\n[validate]\nmin_cppstd = \"20\"\n", base);
        assert!(Manifest::parse(&misspelled_rule, path).is_err());

        let misspelled_info = format!("{}\n[package-info]\ninclude_dirs = [\"inc\"]\n", base);
        assert!(Manifest::parse(&misspelled_info, path).is_err());
    }

    #[test]
    fn test_bare_file_name_is_anchored() {
        let manifest = Manifest::parse(BUILTIN_MANIFEST, Path::new("Recipe.toml")).unwrap();
        assert_eq!(manifest.manifest_dir, PathBuf::from("."));

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fork.toml");
        std::fs::write(&path, BUILTIN_MANIFEST).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.manifest_dir, tmp.path());
        assert_eq!(manifest.source, Some(path));
    }

    #[test]
    fn test_load_relative_file_name() {
        // Unit tests run from the package root, which holds Recipe.toml
        let cwd = std::env::current_dir().unwrap();
        let manifest = Manifest::load(Path::new(MANIFEST_NAME)).unwrap();

        assert_eq!(manifest.manifest_dir, cwd);
        assert_eq!(manifest.source, Some(cwd.join(MANIFEST_NAME)));
    }

    #[test]
    fn test_custom_include_dirs() {
        let content = r#"
[package]
name = "multi"
version = "2.1.0"
license = "BSD-3-Clause"
author = "someone"
url = "https://example.com/multi"

[package-info]
includedirs = ["include", "include/multi/compat"]
"#;
        let manifest = Manifest::parse(content, Path::new("Recipe.toml")).unwrap();
        assert_eq!(
            manifest.consumer_info.include_directories,
            ["include", "include/multi/compat"]
        );
    }
}
