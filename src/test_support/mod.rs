//! Test utilities and mocks for snd-recipe unit tests.
//!
//! [`RecordingTool`] stands in for CMake so lifecycle tests can assert which
//! build-tool steps ran, and in which order, without a toolchain.

use std::cell::RefCell;
use std::path::Path;

use crate::builder::tool::BuildTool;
use crate::core::layout::Layout;
use crate::core::manifest::Manifest;
use crate::core::settings::{BuildSettings, BuildType, CompilerSettings};
use crate::lifecycle::errors::{ToolFailure, ToolStep};
use crate::lifecycle::recipe::ManifestRecipe;

/// Mock build tool that records every step it is asked to run.
///
/// Optionally fails at one step, returning a failure with canned output.
#[derive(Debug, Default)]
pub struct RecordingTool {
    calls: RefCell<Vec<ToolStep>>,
    fail_at: Option<ToolStep>,
}

impl RecordingTool {
    /// A tool where every step succeeds.
    pub fn new() -> Self {
        RecordingTool::default()
    }

    /// A tool that fails when it reaches `step`.
    pub fn failing_at(step: ToolStep) -> Self {
        RecordingTool {
            calls: RefCell::default(),
            fail_at: Some(step),
        }
    }

    /// Steps run so far, in order.
    pub fn calls(&self) -> Vec<ToolStep> {
        self.calls.borrow().clone()
    }

    fn record(&self, step: ToolStep) -> Result<(), ToolFailure> {
        self.calls.borrow_mut().push(step);
        if self.fail_at == Some(step) {
            return Err(ToolFailure {
                step,
                command: format!("mock {}", step),
                status: Some(1),
                diagnostic: format!("mock {} failure", step),
            });
        }
        Ok(())
    }
}

impl BuildTool for RecordingTool {
    fn name(&self) -> &str {
        "mock"
    }

    fn configure(&self, _layout: &Layout) -> Result<(), ToolFailure> {
        self.record(ToolStep::Configure)
    }

    fn build(&self, _layout: &Layout) -> Result<(), ToolFailure> {
        self.record(ToolStep::Build)
    }

    fn install(&self, _layout: &Layout) -> Result<(), ToolFailure> {
        self.record(ToolStep::Install)
    }
}

/// The built-in `snd` recipe rooted at `dir`, installing into `dir/package`.
pub fn snd_recipe<T: BuildTool>(dir: &Path, tool: T) -> ManifestRecipe<T> {
    let manifest = Manifest::builtin(dir).unwrap();
    ManifestRecipe::new(manifest, dir.join("package"), tool)
}

/// Linux/gcc/Release settings with an optional `compiler.cppstd`.
pub fn gcc_settings(cppstd: Option<&str>) -> BuildSettings {
    let mut settings = BuildSettings {
        os: "Linux".to_string(),
        arch: "x86_64".to_string(),
        build_type: BuildType::Release,
        compiler: CompilerSettings::new("gcc"),
    };
    if let Some(std) = cppstd {
        settings.set("compiler.cppstd", std).unwrap();
    }
    settings
}

/// Lay out a minimal `snd` source tree: manifest, build script, headers.
pub fn write_snd_sources(dir: &Path) {
    std::fs::write(dir.join("Recipe.toml"), crate::core::manifest::BUILTIN_MANIFEST).unwrap();
    std::fs::write(
        dir.join("CMakeLists.txt"),
        "cmake_minimum_required(VERSION 3.15)\nproject(snd CXX)\n",
    )
    .unwrap();
    let include = dir.join("include/snd");
    std::fs::create_dir_all(&include).unwrap();
    std::fs::write(include.join("ease.hpp"), "#pragma once\n").unwrap();
    std::fs::write(include.join("misc.hpp"), "#pragma once\n").unwrap();
}
