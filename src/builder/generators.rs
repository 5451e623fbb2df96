//! Build-tool input generators.
//!
//! Generators write the files the configure step reads:
//!
//! - `CMakeToolchain`: `snd_toolchain.cmake` with the build type, the language
//!   standard and the search paths for dependency descriptors
//! - `CMakeDeps`: `<name>-config.cmake` and `<name>-config-version.cmake` for
//!   every resolved dependency, each defining an imported `<name>::<name>` target
//!
//! Everything lands in the layout's generators root. Descriptors left there
//! by earlier runs for dependencies not supplied this time are removed, since
//! the folder is on `CMAKE_PREFIX_PATH`.

use std::io;
use std::path::{Path, PathBuf};

use crate::core::dependency::ResolvedDependency;
use crate::core::layout::Layout;
use crate::core::manifest::{GeneratorKind, GeneratorSet};
use crate::core::settings::BuildSettings;
use crate::lifecycle::errors::BuildError;
use crate::util::fs::write_string;

const HEADER: &str = "# Generated by snd-recipe. Do not edit.\n";

/// Run every generator in `set` once. Returns the files written.
pub fn generate(
    set: &GeneratorSet,
    layout: &Layout,
    settings: &BuildSettings,
    dependencies: &[ResolvedDependency],
) -> Result<Vec<PathBuf>, BuildError> {
    let mut written = Vec::new();

    for kind in set.iter() {
        tracing::debug!("Running generator {}", kind);
        match kind {
            GeneratorKind::CMakeToolchain => {
                let path = layout.toolchain_file();
                write(&path, &toolchain_descriptor(layout, settings, dependencies))?;
                written.push(path);
            }
            GeneratorKind::CMakeDeps => {
                remove_stale_descriptors(&layout.generators_root, dependencies)?;
                for dep in dependencies {
                    let config = layout
                        .generators_root
                        .join(format!("{}-config.cmake", dep.name));
                    write(&config, &dependency_config(dep))?;
                    written.push(config);

                    let version = layout
                        .generators_root
                        .join(format!("{}-config-version.cmake", dep.name));
                    write(&version, &dependency_config_version(dep))?;
                    written.push(version);
                }
            }
        }
    }

    Ok(written)
}

/// Delete `<name>-config*.cmake` files for packages not in `dependencies`.
fn remove_stale_descriptors(
    root: &Path,
    dependencies: &[ResolvedDependency],
) -> Result<(), BuildError> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_error(root, e)),
    };

    for entry in entries {
        let path = entry.map_err(|e| io_error(root, e))?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let package = name
            .strip_suffix("-config-version.cmake")
            .or_else(|| name.strip_suffix("-config.cmake"));

        if let Some(package) = package {
            if !dependencies.iter().any(|dep| dep.name == package) {
                tracing::debug!("Removing stale {}", path.display());
                std::fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
            }
        }
    }

    Ok(())
}

fn io_error(path: &Path, e: io::Error) -> BuildError {
    BuildError::Generate {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    write_string(path, contents).map_err(|e| BuildError::Generate {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })
}

/// CMake wants forward slashes, even on Windows.
fn cmake_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Contents of the toolchain descriptor.
pub fn toolchain_descriptor(
    layout: &Layout,
    settings: &BuildSettings,
    dependencies: &[ResolvedDependency],
) -> String {
    let mut out = String::from(HEADER);
    out.push_str("cmake_minimum_required(VERSION 3.15)\n\n");

    if !layout.multi_config {
        out.push_str(&format!(
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"\" FORCE)\n",
            layout.build_type
        ));
    }

    if let Some(cppstd) = settings.cppstd() {
        out.push_str(&format!(
            "set(CMAKE_CXX_STANDARD {})\n",
            cppstd.standard.cmake_value()
        ));
        out.push_str("set(CMAKE_CXX_STANDARD_REQUIRED ON)\n");
        out.push_str(&format!(
            "set(CMAKE_CXX_EXTENSIONS {})\n",
            if cppstd.gnu_extensions { "ON" } else { "OFF" }
        ));
    }

    match settings.compiler.libcxx.as_deref() {
        Some("libc++") => out.push_str("string(APPEND CMAKE_CXX_FLAGS_INIT \" -stdlib=libc++\")\n"),
        Some("libstdc++") => out.push_str("add_compile_definitions(_GLIBCXX_USE_CXX11_ABI=0)\n"),
        Some("libstdc++11") => out.push_str("add_compile_definitions(_GLIBCXX_USE_CXX11_ABI=1)\n"),
        _ => {}
    }

    let generators = cmake_path(&layout.generators_root);
    out.push('\n');
    out.push_str(&format!("list(PREPEND CMAKE_PREFIX_PATH \"{}\")\n", generators));
    out.push_str(&format!("list(PREPEND CMAKE_MODULE_PATH \"{}\")\n", generators));

    for dep in dependencies {
        out.push_str(&format!("set({}_DIR \"{}\")\n", dep.name, generators));
    }

    out
}

/// Contents of `<name>-config.cmake`.
pub fn dependency_config(dep: &ResolvedDependency) -> String {
    let target = format!("{0}::{0}", dep.name);
    let include_dirs = dep
        .include_paths()
        .iter()
        .map(|p| cmake_path(p))
        .collect::<Vec<_>>()
        .join(";");

    let mut out = String::from(HEADER);
    out.push_str(&format!("if(NOT TARGET {})\n", target));
    out.push_str(&format!("    add_library({} INTERFACE IMPORTED)\n", target));
    out.push_str(&format!(
        "    set_target_properties({} PROPERTIES\n        INTERFACE_INCLUDE_DIRECTORIES \"{}\")\n",
        target, include_dirs
    ));
    out.push_str("endif()\n\n");
    out.push_str(&format!("set({}_FOUND TRUE)\n", dep.name));
    out.push_str(&format!("set({}_VERSION \"{}\")\n", dep.name, dep.version));
    out.push_str(&format!("set({}_INCLUDE_DIRS \"{}\")\n", dep.name, include_dirs));
    out
}

/// Contents of `<name>-config-version.cmake`.
pub fn dependency_config_version(dep: &ResolvedDependency) -> String {
    let mut out = String::from(HEADER);
    out.push_str(&format!("set(PACKAGE_VERSION \"{}\")\n\n", dep.version));
    out.push_str(
        "if(PACKAGE_FIND_VERSION VERSION_GREATER PACKAGE_VERSION)\n\
         \x20   set(PACKAGE_VERSION_COMPATIBLE FALSE)\n\
         else()\n\
         \x20   set(PACKAGE_VERSION_COMPATIBLE TRUE)\n\
         \x20   if(PACKAGE_FIND_VERSION STREQUAL PACKAGE_VERSION)\n\
         \x20       set(PACKAGE_VERSION_EXACT TRUE)\n\
         \x20   endif()\n\
         endif()\n",
    );
    out
}
