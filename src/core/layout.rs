//! On-disk layout of one lifecycle run.
//!
//! Follows the usual CMake layout: sources live next to the manifest, build
//! trees go under `build/<BuildType>` (or plain `build` when the generator
//! holds every configuration in one tree), and generated build-tool inputs go
//! under `<build>/generators`. The install root is chosen by the caller so
//! that concurrent runs never share one.
//!
//! Computing a layout only names paths; nothing is created on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::settings::{BuildSettings, BuildType};

/// Canonical roots used by every stage after layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub source_root: PathBuf,
    pub build_root: PathBuf,
    pub generators_root: PathBuf,
    pub install_root: PathBuf,
    pub build_type: BuildType,
    /// One build tree for every configuration (Visual Studio style)
    pub multi_config: bool,
}

impl Layout {
    /// Derive the layout for `settings`.
    pub fn cmake(source_root: &Path, install_root: &Path, settings: &BuildSettings) -> Self {
        let multi_config = settings.compiler.is_multi_config();

        let build_root = if multi_config {
            source_root.join("build")
        } else {
            source_root
                .join("build")
                .join(settings.build_type.as_str())
        };
        let generators_root = build_root.join("generators");

        Layout {
            source_root: source_root.to_path_buf(),
            build_root,
            generators_root,
            install_root: install_root.to_path_buf(),
            build_type: settings.build_type,
            multi_config,
        }
    }

    /// Path of the toolchain descriptor written by the toolchain generator.
    pub fn toolchain_file(&self) -> PathBuf {
        self.generators_root.join(TOOLCHAIN_FILE_NAME)
    }
}

/// File name of the generated toolchain descriptor.
pub const TOOLCHAIN_FILE_NAME: &str = "snd_toolchain.cmake";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::CompilerSettings;

    fn settings(compiler: &str, build_type: BuildType) -> BuildSettings {
        BuildSettings {
            os: "Linux".to_string(),
            arch: "x86_64".to_string(),
            build_type,
            compiler: CompilerSettings::new(compiler),
        }
    }

    #[test]
    fn test_single_config_layout() {
        let layout = Layout::cmake(
            Path::new("/src/snd"),
            Path::new("/out/p/abc"),
            &settings("gcc", BuildType::Debug),
        );

        assert_eq!(layout.source_root, PathBuf::from("/src/snd"));
        assert_eq!(layout.build_root, PathBuf::from("/src/snd/build/Debug"));
        assert_eq!(
            layout.generators_root,
            PathBuf::from("/src/snd/build/Debug/generators")
        );
        assert_eq!(layout.install_root, PathBuf::from("/out/p/abc"));
        assert_eq!(
            layout.toolchain_file(),
            PathBuf::from("/src/snd/build/Debug/generators/snd_toolchain.cmake")
        );
        assert!(!layout.multi_config);
    }

    #[test]
    fn test_multi_config_layout() {
        let layout = Layout::cmake(
            Path::new("/src/snd"),
            Path::new("/out"),
            &settings("msvc", BuildType::Release),
        );
        assert_eq!(layout.build_root, PathBuf::from("/src/snd/build"));
        assert_eq!(
            layout.generators_root,
            PathBuf::from("/src/snd/build/generators")
        );
        assert!(layout.multi_config);
    }

    #[test]
    fn test_layout_is_idempotent_and_touches_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let s = settings("gcc", BuildType::Release);

        let first = Layout::cmake(tmp.path(), &tmp.path().join("pkg"), &s);
        let second = Layout::cmake(tmp.path(), &tmp.path().join("pkg"), &s);

        assert_eq!(first, second);
        assert!(!first.build_root.exists());
        assert!(!first.install_root.exists());
    }
}
