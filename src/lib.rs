//! snd-recipe - the package recipe of the `snd` header-only C++ library
//!
//! This crate provides the declarative manifest of the package and the
//! fixed-order lifecycle a host package manager drives it through:
//! layout, requirements, validation, build, packaging and consumer info.

pub mod builder;
pub mod core;
pub mod lifecycle;
pub mod ops;
pub mod util;

/// Test utilities and mocks for snd-recipe unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording build tool and source fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    dependency::ResolvedDependency, layout::Layout, manifest::Manifest,
    settings::BuildSettings,
};
pub use lifecycle::{run, LifecycleError, LifecycleState, ManifestRecipe, Recipe};
