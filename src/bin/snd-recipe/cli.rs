//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use snd_recipe::core::dependency::ResolvedDependency;
use snd_recipe::util::process::CMAKE_ENV;

/// snd-recipe - build and package the snd header-only C++ library
#[derive(Parser)]
#[command(name = "snd-recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full lifecycle: layout, requirements, validate, build, package
    Create(CreateArgs),

    /// Copy the recipe and its exported sources to a folder
    Export(ExportArgs),

    /// Print the recipe as JSON
    Inspect(InspectArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Path to Recipe.toml (defaults to searching the current directory
    /// and its parents, then the built-in snd recipe)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Override a setting, e.g. `-s compiler.cppstd=20`
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Apply a profile (file path or name under ~/.snd-recipe/profiles)
    #[arg(short = 'p', long = "profile", value_name = "PROFILE")]
    pub profiles: Vec<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Root folder for installed packages (defaults to ~/.snd-recipe)
    #[arg(long, value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// A dependency resolved by the host, as `NAME/VERSION=PATH`
    #[arg(long = "dependency", value_name = "NAME/VERSION=PATH")]
    pub dependencies: Vec<ResolvedDependency>,

    /// CMake executable to use
    #[arg(long, value_name = "PATH", env = CMAKE_ENV)]
    pub cmake: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Destination folder
    pub destination: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Settings used to compute the package id
    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
