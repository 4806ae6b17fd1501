//! Copying caller-declared extra files into the staging directory.

use std::fs;

use anyhow::Context;

use crate::session::BuildSession;

/// Copy every include-glob match into its mirrored staging location.
///
/// A destination that already exists is skipped, which makes repeated
/// staging within one session cheap; the trade-off is that a source file
/// changed after its first copy is not picked up again until the next
/// session. Enumeration order is the glob library's default and not
/// guaranteed stable across filesystems.
///
/// Returns the number of files copied by this call.
pub fn stage(session: &BuildSession, include_globs: &[String]) -> anyhow::Result<usize> {
    if include_globs.is_empty() {
        return Ok(0);
    }

    let source_root = session.source_root();
    let staging = session.staging_root();
    let mut copied = 0usize;

    for pattern in include_globs {
        let full_pattern = source_root.join(pattern);
        let matches = glob::glob(&full_pattern.to_string_lossy())
            .with_context(|| format!("Invalid include glob: {pattern}"))?;

        for entry in matches {
            let path =
                entry.with_context(|| format!("Failed to expand include glob: {pattern}"))?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(source_root).with_context(|| {
                format!(
                    "Include match {} is outside the project root",
                    path.display()
                )
            })?;
            let dst = staging.join(relative);
            if dst.exists() {
                continue;
            }
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            fs::copy(&path, &dst).with_context(|| {
                format!(
                    "Failed to copy extra file from {} to {}",
                    path.display(),
                    dst.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}
