//! The lifecycle driver.
//!
//! ```text
//! Uninitialized -> LayoutEstablished -> RequirementsDeclared -> Validated
//!     -> Built -> Packaged -> ConsumerInfoExported
//! ```
//!
//! [`Lifecycle`] is parameterized by its current stage and every transition
//! consumes it, so a caller cannot build before validating, package before
//! building, or run a stage twice. A failing transition returns the error and
//! the lifecycle value is gone; [`run`] records that as [`LifecycleState::Failed`].

use serde::Serialize;

use crate::builder::generators;
use crate::core::dependency::ResolvedDependency;
use crate::core::layout::Layout;
use crate::core::manifest::ConsumerInfo;
use crate::core::requirement::RequirementSet;
use crate::core::settings::BuildSettings;
use crate::lifecycle::errors::{DependencyResolutionError, LifecycleError};
use crate::lifecycle::recipe::Recipe;

/// Observable state of one lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    Uninitialized,
    LayoutEstablished,
    RequirementsDeclared,
    Validated,
    Built,
    Packaged,
    ConsumerInfoExported,
    Failed,
}

/// Marker for a lifecycle stage.
pub trait Stage {
    const STATE: LifecycleState;
}

pub struct Uninitialized;

pub struct LayoutEstablished {
    layout: Layout,
}

pub struct RequirementsDeclared {
    layout: Layout,
    requirements: RequirementSet,
}

pub struct Validated {
    layout: Layout,
    requirements: RequirementSet,
}

pub struct Built {
    layout: Layout,
}

pub struct Packaged {
    layout: Layout,
}

impl Stage for Uninitialized {
    const STATE: LifecycleState = LifecycleState::Uninitialized;
}

impl Stage for LayoutEstablished {
    const STATE: LifecycleState = LifecycleState::LayoutEstablished;
}

impl Stage for RequirementsDeclared {
    const STATE: LifecycleState = LifecycleState::RequirementsDeclared;
}

impl Stage for Validated {
    const STATE: LifecycleState = LifecycleState::Validated;
}

impl Stage for Built {
    const STATE: LifecycleState = LifecycleState::Built;
}

impl Stage for Packaged {
    const STATE: LifecycleState = LifecycleState::Packaged;
}

/// One run of a recipe's hooks, currently at stage `S`.
///
/// Stages are entered in order, each exactly once:
///
/// ```no_run
/// # use snd_recipe::builder::CMake;
/// # use snd_recipe::core::{BuildSettings, Manifest};
/// # use snd_recipe::lifecycle::{Lifecycle, ManifestRecipe};
/// # fn main() -> anyhow::Result<()> {
/// let recipe = ManifestRecipe::new(Manifest::builtin(".")?, "pkg", CMake::new("cmake"));
/// let info = Lifecycle::new(&recipe, BuildSettings::host())
///     .establish_layout()
///     .declare_requirements()
///     .validate()?
///     .build(&[])?
///     .package()?
///     .export_consumer_info();
/// assert_eq!(info.include_directories, ["include"]);
/// # Ok(())
/// # }
/// ```
///
/// Building before validation does not compile:
///
/// ```compile_fail
/// # use snd_recipe::builder::CMake;
/// # use snd_recipe::core::{BuildSettings, Manifest};
/// # use snd_recipe::lifecycle::{Lifecycle, ManifestRecipe};
/// # fn main() -> anyhow::Result<()> {
/// let recipe = ManifestRecipe::new(Manifest::builtin(".")?, "pkg", CMake::new("cmake"));
/// let declared = Lifecycle::new(&recipe, BuildSettings::host())
///     .establish_layout()
///     .declare_requirements();
/// let _ = declared.build(&[]);
/// # Ok(())
/// # }
/// ```
///
/// Neither does packaging before building:
///
/// ```compile_fail
/// # use snd_recipe::builder::CMake;
/// # use snd_recipe::core::{BuildSettings, Manifest};
/// # use snd_recipe::lifecycle::{Lifecycle, ManifestRecipe};
/// # fn main() -> anyhow::Result<()> {
/// let recipe = ManifestRecipe::new(Manifest::builtin(".")?, "pkg", CMake::new("cmake"));
/// let validated = Lifecycle::new(&recipe, BuildSettings::host())
///     .establish_layout()
///     .declare_requirements()
///     .validate()?;
/// let _ = validated.package();
/// # Ok(())
/// # }
/// ```
///
/// Or running a stage twice:
///
/// ```compile_fail
/// # use snd_recipe::builder::CMake;
/// # use snd_recipe::core::{BuildSettings, Manifest};
/// # use snd_recipe::lifecycle::{Lifecycle, ManifestRecipe};
/// # fn main() -> anyhow::Result<()> {
/// let recipe = ManifestRecipe::new(Manifest::builtin(".")?, "pkg", CMake::new("cmake"));
/// let declared = Lifecycle::new(&recipe, BuildSettings::host())
///     .establish_layout()
///     .declare_requirements();
/// let _ = declared.validate();
/// let _ = declared.validate();
/// # Ok(())
/// # }
/// ```
pub struct Lifecycle<'r, R: Recipe, S: Stage> {
    recipe: &'r R,
    settings: BuildSettings,
    stage: S,
}

impl<'r, R: Recipe, S: Stage> Lifecycle<'r, R, S> {
    pub fn state(&self) -> LifecycleState {
        S::STATE
    }

    fn advance<N: Stage>(self, stage: N) -> Lifecycle<'r, R, N> {
        tracing::debug!("{:?} -> {:?}", S::STATE, N::STATE);
        Lifecycle {
            recipe: self.recipe,
            settings: self.settings,
            stage,
        }
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, Uninitialized> {
    /// Start a run. `settings` are fixed for the whole run.
    pub fn new(recipe: &'r R, settings: BuildSettings) -> Self {
        Lifecycle {
            recipe,
            settings,
            stage: Uninitialized,
        }
    }

    pub fn establish_layout(self) -> Lifecycle<'r, R, LayoutEstablished> {
        let layout = self.recipe.layout(&self.settings);
        tracing::info!("Build folder {}", layout.build_root.display());
        self.advance(LayoutEstablished { layout })
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, LayoutEstablished> {
    pub fn layout(&self) -> &Layout {
        &self.stage.layout
    }

    pub fn declare_requirements(self) -> Lifecycle<'r, R, RequirementsDeclared> {
        let requirements = self.recipe.requirements();
        for requirement in &requirements {
            tracing::info!("Requires {}", requirement.reference());
        }
        let layout = self.stage.layout.clone();
        self.advance(RequirementsDeclared {
            layout,
            requirements,
        })
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, RequirementsDeclared> {
    pub fn requirements(&self) -> &RequirementSet {
        &self.stage.requirements
    }

    pub fn validate(self) -> Result<Lifecycle<'r, R, Validated>, LifecycleError> {
        self.recipe.validate(&self.settings)?;
        tracing::info!("Settings validated");

        let RequirementsDeclared {
            layout,
            requirements,
        } = self.stage;
        Ok(Lifecycle {
            recipe: self.recipe,
            settings: self.settings,
            stage: Validated {
                layout,
                requirements,
            },
        })
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, Validated> {
    /// Check `dependencies` against the requirements, run the generators,
    /// then the recipe's build hook.
    pub fn build(
        self,
        dependencies: &[ResolvedDependency],
    ) -> Result<Lifecycle<'r, R, Built>, LifecycleError> {
        check_resolution(&self.stage.requirements, dependencies)?;

        let written = generators::generate(
            self.recipe.generators(),
            &self.stage.layout,
            &self.settings,
            dependencies,
        )?;
        for path in &written {
            tracing::debug!("Generated {}", path.display());
        }

        tracing::info!("Building {}", self.recipe.identity().reference());
        self.recipe.build(&self.stage.layout)?;

        let layout = self.stage.layout.clone();
        Ok(self.advance(Built { layout }))
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, Built> {
    pub fn package(self) -> Result<Lifecycle<'r, R, Packaged>, LifecycleError> {
        tracing::info!("Packaging {}", self.recipe.identity().reference());
        self.recipe.package(&self.stage.layout)?;

        let layout = self.stage.layout.clone();
        Ok(self.advance(Packaged { layout }))
    }
}

impl<'r, R: Recipe> Lifecycle<'r, R, Packaged> {
    pub fn layout(&self) -> &Layout {
        &self.stage.layout
    }

    /// Final stage. The lifecycle ends here.
    pub fn export_consumer_info(self) -> ConsumerInfo {
        let info = self.recipe.package_info();
        tracing::info!(
            "Package {} installed in {}",
            self.recipe.identity().reference(),
            self.stage.layout.install_root.display()
        );
        tracing::debug!(
            "{:?} -> {:?}",
            LifecycleState::Packaged,
            LifecycleState::ConsumerInfoExported
        );
        info
    }
}

/// Every supplied dependency must be declared and in range. Declared
/// requirements the host did not supply are left to the host.
pub fn check_resolution(
    requirements: &RequirementSet,
    dependencies: &[ResolvedDependency],
) -> Result<(), DependencyResolutionError> {
    for dep in dependencies {
        let requirement =
            requirements
                .get(&dep.name)
                .ok_or_else(|| DependencyResolutionError::Undeclared {
                    name: dep.name.clone(),
                })?;

        if !requirement.selector().matches(&dep.version) {
            return Err(DependencyResolutionError::Unsatisfied {
                name: dep.name.clone(),
                version: dep.version.to_string(),
                selector: requirement.selector().to_string(),
            });
        }
    }

    for requirement in requirements {
        if !dependencies.iter().any(|d| d.name == requirement.name()) {
            tracing::warn!(
                "No resolved package supplied for {}; no descriptor generated",
                requirement.reference()
            );
        }
    }

    Ok(())
}

/// How a complete run ended.
#[derive(Debug)]
pub struct LifecycleOutcome {
    /// `ConsumerInfoExported` on success, `Failed` otherwise
    pub state: LifecycleState,
    pub result: Result<ConsumerInfo, LifecycleError>,
}

impl LifecycleOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<ConsumerInfo, LifecycleError> {
        self.result
    }
}

/// Drive `recipe` through all six stages in order.
pub fn run<R: Recipe>(
    recipe: &R,
    settings: BuildSettings,
    dependencies: &[ResolvedDependency],
) -> LifecycleOutcome {
    let result = Lifecycle::new(recipe, settings)
        .establish_layout()
        .declare_requirements()
        .validate()
        .and_then(|lifecycle| lifecycle.build(dependencies))
        .and_then(|lifecycle| lifecycle.package())
        .map(|lifecycle| lifecycle.export_consumer_info());

    match result {
        Ok(info) => LifecycleOutcome {
            state: LifecycleState::ConsumerInfoExported,
            result: Ok(info),
        },
        Err(e) => {
            tracing::debug!("{:?} stage failed: {}", next_state(e.reached()), e);
            LifecycleOutcome {
                state: LifecycleState::Failed,
                result: Err(e),
            }
        }
    }
}

fn next_state(state: LifecycleState) -> LifecycleState {
    match state {
        LifecycleState::Uninitialized => LifecycleState::LayoutEstablished,
        LifecycleState::LayoutEstablished => LifecycleState::RequirementsDeclared,
        LifecycleState::RequirementsDeclared => LifecycleState::Validated,
        LifecycleState::Validated => LifecycleState::Built,
        LifecycleState::Built => LifecycleState::Packaged,
        LifecycleState::Packaged => LifecycleState::ConsumerInfoExported,
        LifecycleState::ConsumerInfoExported | LifecycleState::Failed => LifecycleState::Failed,
    }
}
