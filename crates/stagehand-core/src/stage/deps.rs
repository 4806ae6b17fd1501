//! Staging of the runtime dependency tree and its manifest.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::fs::{copy_tree, link_dir, link_file, remove_path_if_exists, symlink_supported};
use crate::session::{BuildSession, DEPS_DIR, MANIFEST_FILE};

/// Materialize the dependency tree and manifest inside the staging
/// directory.
///
/// Probes link support once and falls back to copying for any negative
/// result, then delegates to [`stage_with_capability`].
pub fn stage(session: &BuildSession, for_packaging: bool) -> anyhow::Result<()> {
    let staging = session.staging_root();
    fs::create_dir_all(&staging)
        .with_context(|| format!("Failed to create staging directory: {}", staging.display()))?;
    let links_supported = symlink_supported(&staging);
    stage_with_capability(session, for_packaging, links_supported)
}

/// Staging with an explicit link-capability answer.
///
/// Packaging mode always replaces the staged dependency tree with a
/// fresh full copy so the packager sees the current dependency state.
/// Non-packaging mode links (or copies) only when the destination is
/// absent; the manifest is handled the same way in both modes.
pub fn stage_with_capability(
    session: &BuildSession,
    for_packaging: bool,
    links_supported: bool,
) -> anyhow::Result<()> {
    let staging = session.staging_root();
    fs::create_dir_all(&staging)
        .with_context(|| format!("Failed to create staging directory: {}", staging.display()))?;

    let src_deps = session.source_root().join(DEPS_DIR);
    let dst_deps = staging.join(DEPS_DIR);

    if for_packaging {
        remove_path_if_exists(&dst_deps)?;
        ensure_source(&src_deps)?;
        copy_tree(&src_deps, &dst_deps)?;
    } else if !dst_deps.exists() {
        ensure_source(&src_deps)?;
        if links_supported {
            link_dir(&src_deps, &dst_deps)?;
        } else {
            copy_tree(&src_deps, &dst_deps)?;
        }
    }

    let src_manifest = session.source_root().join(MANIFEST_FILE);
    let dst_manifest = staging.join(MANIFEST_FILE);
    if !dst_manifest.exists() {
        ensure_source(&src_manifest)?;
        if links_supported {
            link_file(&src_manifest, &dst_manifest)?;
        } else {
            fs::copy(&src_manifest, &dst_manifest).with_context(|| {
                format!(
                    "Failed to copy manifest from {} to {}",
                    src_manifest.display(),
                    dst_manifest.display()
                )
            })?;
        }
    }

    Ok(())
}

fn ensure_source(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("Staging source does not exist: {}", path.display());
    }
    Ok(())
}
