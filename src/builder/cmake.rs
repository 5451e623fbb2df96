//! CMake adapter.
//!
//! Runs `cmake` configure, build and install against a [`Layout`]. The
//! toolchain descriptor written by the toolchain generator is passed to the
//! configure step when present.

use std::path::{Path, PathBuf};

use crate::builder::tool::BuildTool;
use crate::core::layout::Layout;
use crate::lifecycle::errors::{ToolFailure, ToolStep};
use crate::util::process::{find_cmake, ProcessBuilder};

/// CMake build adapter.
#[derive(Debug, Clone)]
pub struct CMake {
    program: PathBuf,
}

impl CMake {
    /// Use a specific cmake executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CMake {
            program: program.into(),
        }
    }

    /// Locate cmake on `PATH` (or via `SND_RECIPE_CMAKE`).
    ///
    /// When nothing is found the bare name is kept, so the configure step
    /// fails with the spawn error instead of the run failing before layout.
    pub fn from_env() -> Self {
        match find_cmake() {
            Some(program) => CMake::new(program),
            None => {
                tracing::warn!(
                    "CMake not found in PATH; install CMake or point SND_RECIPE_CMAKE at it"
                );
                CMake::new("cmake")
            }
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `cmake -S <source> -B <build> ...`
    pub fn configure_command(&self, layout: &Layout) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .cwd(&layout.source_root)
            .arg("-S")
            .arg(&layout.source_root)
            .arg("-B")
            .arg(&layout.build_root);

        let toolchain = layout.toolchain_file();
        if toolchain.is_file() {
            cmd = cmd.arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain.display()));
        }

        // Multi-config generators pick the configuration at build time.
        if !layout.multi_config {
            cmd = cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", layout.build_type));
        }

        cmd.arg(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            layout.install_root.display()
        ))
    }

    /// `cmake --build <build>`
    pub fn build_command(&self, layout: &Layout) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.program)
            .cwd(&layout.source_root)
            .arg("--build")
            .arg(&layout.build_root);

        with_config(cmd, layout)
    }

    /// `cmake --install <build> --prefix <install>`
    pub fn install_command(&self, layout: &Layout) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.program)
            .cwd(&layout.source_root)
            .arg("--install")
            .arg(&layout.build_root);

        with_config(cmd, layout)
            .arg("--prefix")
            .arg(&layout.install_root)
    }
}

fn with_config(cmd: ProcessBuilder, layout: &Layout) -> ProcessBuilder {
    if layout.multi_config {
        cmd.arg("--config").arg(layout.build_type.as_str())
    } else {
        cmd
    }
}

impl BuildTool for CMake {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self, layout: &Layout) -> Result<(), ToolFailure> {
        tracing::info!("Configuring with {}", self.name());
        self.configure_command(layout)
            .exec_step(ToolStep::Configure)
            .map(drop)
    }

    fn build(&self, layout: &Layout) -> Result<(), ToolFailure> {
        tracing::info!("Building with {}", self.name());
        self.build_command(layout)
            .exec_step(ToolStep::Build)
            .map(drop)
    }

    fn install(&self, layout: &Layout) -> Result<(), ToolFailure> {
        tracing::info!(
            "Installing with {} into {}",
            self.name(),
            layout.install_root.display()
        );
        self.install_command(layout)
            .exec_step(ToolStep::Install)
            .map(drop)
    }
}

/// Check if a directory contains a CMake project.
pub fn is_cmake_project(dir: &Path) -> bool {
    dir.join("CMakeLists.txt").exists()
}
