//! Implementation of `snd-recipe export`.
//!
//! Materializes the recipe and its exported sources in a destination folder:
//!
//! ```text
//! <dest>/Recipe.toml
//! <dest>/export_source/<every file matched by exports-sources>
//! <dest>/manifest.txt          "<path>: <sha256>" per file, sorted
//! ```
//!
//! The recipe revision is the SHA-256 of `manifest.txt`, so it changes
//! whenever the recipe or any exported file changes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::core::manifest::{Manifest, BUILTIN_MANIFEST, MANIFEST_NAME};
use crate::util::fs::{copy_file, remove_dir_all_if_exists, walk_files, write_string};

/// Folder under the destination receiving exported sources.
pub const EXPORT_SOURCE_DIR: &str = "export_source";

/// Name of the content manifest.
pub const CONTENT_MANIFEST: &str = "manifest.txt";

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub dest: PathBuf,
    /// Exported sources, relative to the manifest directory
    pub files: Vec<PathBuf>,
    pub revision: String,
}

/// Export `manifest`'s recipe and sources into `dest`.
pub fn export(manifest: &Manifest, dest: &Path) -> Result<ExportResult> {
    let source_root = &manifest.manifest_dir;
    if dest == source_root.as_path() {
        bail!("export destination must differ from the source folder");
    }

    let build_dir = source_root.join("build");
    let skip = [build_dir.as_path(), dest];

    let patterns = &manifest.exports_sources;
    let mut used = vec![false; patterns.patterns().len()];
    let files = walk_files(source_root, &skip, |rel| match patterns.matching_pattern(rel) {
        Some(i) => {
            used[i] = true;
            true
        }
        None => false,
    })?;

    for (pattern, used) in patterns.patterns().iter().zip(&used) {
        if !used {
            tracing::warn!("Export pattern `{}` matched no files", pattern);
        }
    }

    let export_dir = dest.join(EXPORT_SOURCE_DIR);
    remove_dir_all_if_exists(&export_dir)?;

    let mut entries = Vec::with_capacity(files.len() + 1);

    // Always exported as Recipe.toml, whatever the loaded file was called.
    let recipe_dst = dest.join(MANIFEST_NAME);
    match &manifest.source {
        Some(recipe_src) => copy_file(recipe_src, &recipe_dst)?,
        None => write_string(&recipe_dst, BUILTIN_MANIFEST)?,
    }
    entries.push((MANIFEST_NAME.to_string(), hash_file(&recipe_dst)?));

    for rel in &files {
        let target = export_dir.join(rel);
        copy_file(&source_root.join(rel), &target)?;
        entries.push((
            format!("{}/{}", EXPORT_SOURCE_DIR, slash_path(rel)),
            hash_file(&target)?,
        ));
    }

    entries.sort();
    let content: String = entries
        .iter()
        .map(|(path, hash)| format!("{}: {}\n", path, hash))
        .collect();
    write_string(&dest.join(CONTENT_MANIFEST), &content)?;

    let revision = hex::encode(Sha256::digest(content.as_bytes()));
    tracing::info!(
        "Exported {} ({} files), revision {}",
        manifest.identity.reference(),
        files.len(),
        revision
    );

    Ok(ExportResult {
        dest: dest.to_path_buf(),
        files,
        revision,
    })
}

fn hash_file(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
