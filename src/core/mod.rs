//! Core data structures for snd-recipe.
//!
//! This module contains the foundational types of a recipe:
//! - Package identity and the declarative manifest
//! - Build settings and the C++ standard scale
//! - Requirements with version selectors
//! - Run layout and binary package ids

pub mod dependency;
pub mod identity;
pub mod layout;
pub mod manifest;
pub mod package_id;
pub mod requirement;
pub mod settings;
pub mod standard;

pub use dependency::ResolvedDependency;
pub use identity::PackageIdentity;
pub use layout::Layout;
pub use manifest::{ConsumerInfo, Manifest, MANIFEST_NAME};
pub use requirement::{Requirement, RequirementSet, VersionSelector};
pub use settings::{BuildSettings, BuildType, CompilerSettings, SettingAxis};
pub use standard::{CppStandard, CppStd};
