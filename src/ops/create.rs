//! Implementation of `snd-recipe create`.
//!
//! Runs the whole lifecycle for one settings value and records the consumer
//! info next to the installed package.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::cmake::is_cmake_project;
use crate::builder::tool::BuildTool;
use crate::core::dependency::ResolvedDependency;
use crate::core::manifest::{ConsumerInfo, Manifest};
use crate::core::package_id::package_id;
use crate::core::settings::BuildSettings;
use crate::lifecycle::recipe::ManifestRecipe;
use crate::lifecycle::stages::run;
use crate::util::fs::write_string;

/// File written into the install root after a successful run.
pub const CONSUMER_INFO_FILE: &str = "consumer_info.json";

/// Options for the create command.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Effective settings for this run
    pub settings: BuildSettings,

    /// Dependencies resolved by the host, in any order
    pub dependencies: Vec<ResolvedDependency>,

    /// Packages are installed under `<output_folder>/p/<package id>`
    pub output_folder: PathBuf,
}

/// Result of a successful create.
#[derive(Debug, Clone, Serialize)]
pub struct CreateResult {
    pub reference: String,
    pub package_id: String,
    pub install_root: PathBuf,
    pub consumer_info: ConsumerInfo,
    /// `consumer_info.include_directories` resolved against `install_root`
    pub include_paths: Vec<PathBuf>,
}

impl CreateResult {
    fn new(manifest: &Manifest, package_id: String, install_root: PathBuf, info: ConsumerInfo) -> Self {
        CreateResult {
            reference: manifest.identity.reference(),
            package_id,
            include_paths: info.resolve_include_dirs(&install_root),
            install_root,
            consumer_info: info,
        }
    }
}

/// Install root for `settings` under `output_folder`.
pub fn install_root(manifest: &Manifest, settings: &BuildSettings, output_folder: &Path) -> (String, PathBuf) {
    let id = package_id(&manifest.identity, &manifest.settings, settings, &manifest.requires);
    let root = output_folder.join("p").join(&id);
    (id, root)
}

/// Build and install the package described by `manifest` with `tool`.
///
/// A failed lifecycle is returned as a [`LifecycleError`](crate::lifecycle::errors::LifecycleError)
/// inside the `anyhow::Error`, so callers can downcast it for the failing stage.
pub fn create<T: BuildTool>(manifest: Manifest, tool: T, opts: &CreateOptions) -> Result<CreateResult> {
    if !is_cmake_project(&manifest.manifest_dir) {
        tracing::warn!(
            "No CMakeLists.txt in {}; the configure step will fail",
            manifest.manifest_dir.display()
        );
    }

    let (id, root) = install_root(&manifest, &opts.settings, &opts.output_folder);
    tracing::info!("Package id {}", id);

    let dependencies: Vec<ResolvedDependency> = opts
        .dependencies
        .iter()
        .cloned()
        .map(|dep| dep.anchored(&manifest.manifest_dir))
        .collect();

    let recipe = ManifestRecipe::new(manifest, &root, tool);
    let outcome = run(&recipe, opts.settings.clone(), &dependencies);
    let info = outcome.into_result()?;

    let result = CreateResult::new(recipe.manifest(), id, root, info);
    let path = result.install_root.join(CONSUMER_INFO_FILE);
    let json = serde_json::to_string_pretty(&result.consumer_info)
        .context("failed to serialize consumer info")?;
    write_string(&path, &json)?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::errors::{LifecycleError, ToolStep};
    use crate::test_support::{gcc_settings, write_snd_sources, RecordingTool};
    use tempfile::TempDir;

    fn options(out: &Path, cppstd: Option<&str>) -> CreateOptions {
        CreateOptions {
            settings: gcc_settings(cppstd),
            dependencies: Vec::new(),
            output_folder: out.to_path_buf(),
        }
    }

    #[test]
    fn test_create_writes_consumer_info() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_snd_sources(src.path());
        let manifest = Manifest::builtin(src.path()).unwrap();
        let tool = RecordingTool::new();

        let result = create(manifest, &tool, &options(out.path(), Some("20"))).unwrap();

        assert_eq!(result.reference, "snd/1.0.0");
        assert_eq!(result.install_root, out.path().join("p").join(&result.package_id));
        assert_eq!(result.include_paths, [result.install_root.join("include")]);
        assert_eq!(tool.calls().len(), 3);

        let written = std::fs::read_to_string(result.install_root.join(CONSUMER_INFO_FILE)).unwrap();
        let info: ConsumerInfo = serde_json::from_str(&written).unwrap();
        assert_eq!(info.include_directories, ["include"]);
    }

    #[test]
    fn test_create_failure_is_downcastable() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_snd_sources(src.path());
        let manifest = Manifest::builtin(src.path()).unwrap();
        let tool = RecordingTool::new();

        let err = create(manifest, &tool, &options(out.path(), Some("17"))).unwrap_err();

        let lifecycle = err.downcast_ref::<LifecycleError>().unwrap();
        assert_eq!(lifecycle.exit_code(), 2);
        assert!(tool.calls().is_empty());
        assert!(!out.path().join("p").exists());
    }

    #[test]
    fn test_install_failure_leaves_no_consumer_info() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_snd_sources(src.path());
        let manifest = Manifest::builtin(src.path()).unwrap();
        let (_, root) = install_root(&manifest, &gcc_settings(None), out.path());

        let err = create(
            manifest,
            RecordingTool::failing_at(ToolStep::Install),
            &options(out.path(), None),
        )
        .unwrap_err();

        assert_eq!(err.downcast_ref::<LifecycleError>().unwrap().exit_code(), 5);
        assert!(!root.join(CONSUMER_INFO_FILE).exists());
    }

    #[test]
    fn test_distinct_settings_get_distinct_roots() {
        let src = TempDir::new().unwrap();
        let manifest = Manifest::builtin(src.path()).unwrap();
        let out = Path::new("/out");

        let (_, release) = install_root(&manifest, &gcc_settings(Some("20")), out);
        let (_, cpp23) = install_root(&manifest, &gcc_settings(Some("23")), out);
        let mut debug = gcc_settings(Some("20"));
        debug.set("build_type", "Debug").unwrap();
        let (_, debug) = install_root(&manifest, &debug, out);

        assert_ne!(release, cpp23);
        assert_ne!(release, debug);
    }
}
