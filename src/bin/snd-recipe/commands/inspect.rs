//! `snd-recipe inspect` command

use anyhow::{Context, Result};

use crate::cli::InspectArgs;
use crate::commands::{load_manifest, load_settings};
use snd_recipe::ops::inspect::inspect;

pub fn execute(args: InspectArgs) -> Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    let settings = load_settings(&args.settings)?;

    let report = inspect(&manifest, &settings);
    let json = serde_json::to_string_pretty(&report).context("failed to serialize recipe")?;
    println!("{}", json);

    Ok(())
}
