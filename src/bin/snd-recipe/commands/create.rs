//! `snd-recipe create` command

use anyhow::{Context, Result};

use crate::cli::CreateArgs;
use crate::commands::{load_manifest, load_settings};
use snd_recipe::builder::CMake;
use snd_recipe::ops::create::{create, CreateOptions};
use snd_recipe::util::config::global_config_dir;

pub fn execute(args: CreateArgs) -> Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    let settings = load_settings(&args.settings)?;

    for (key, value) in settings.to_pairs() {
        tracing::debug!("{}={}", key, value);
    }

    let output_folder = match args.output_folder {
        // cmake runs from the source folder, so pin relative paths to ours
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("invalid output folder: {}", dir.display()))?,
        None => global_config_dir()
            .unwrap_or_else(|| manifest.manifest_dir.join(".snd-recipe")),
    };

    let cmake = match args.cmake {
        Some(program) => CMake::new(program),
        None => CMake::from_env(),
    };
    tracing::debug!("Using {}", cmake.program().display());

    let opts = CreateOptions {
        settings,
        dependencies: args.dependencies,
        output_folder,
    };

    let result = create(manifest, cmake, &opts)?;

    let json = serde_json::to_string_pretty(&result.consumer_info)
        .context("failed to serialize consumer info")?;
    println!("{}", json);

    Ok(())
}
