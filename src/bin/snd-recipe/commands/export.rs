//! `snd-recipe export` command

use anyhow::Result;

use crate::cli::ExportArgs;
use crate::commands::load_manifest;
use snd_recipe::ops::export::export;

pub fn execute(args: ExportArgs) -> Result<()> {
    let manifest = load_manifest(&args.manifest)?;

    let result = export(&manifest, &args.destination)?;

    println!(
        "{}: exported to {} (revision {})",
        manifest.identity.reference(),
        result.dest.display(),
        result.revision
    );

    Ok(())
}
