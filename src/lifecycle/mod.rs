//! The package lifecycle.
//!
//! A [`Recipe`] provides six hooks; [`Lifecycle`] runs them in their one
//! valid order and [`run`] drives a whole lifecycle to its end.

pub mod errors;
pub mod recipe;
pub mod stages;

pub use errors::{
    BuildError, ConfigurationError, DependencyResolutionError, LifecycleError, PackagingError,
    ToolFailure, ToolStep,
};
pub use recipe::{ManifestRecipe, Recipe};
pub use stages::{run, Lifecycle, LifecycleOutcome, LifecycleState};
