//! Platform link helpers and the link-capability probe.

use std::fs;
use std::path::Path;

use anyhow::Context;

/// Whether this process can create symlinks inside `dir`.
///
/// Probed by actually creating (and removing) a throwaway link, so it
/// captures every negative condition at once: unsupported platform,
/// missing privilege, filesystem without symlink support. Callers fall
/// back to copying on a negative result.
pub fn symlink_supported(dir: &Path) -> bool {
    let probe = dir.join(format!(".stagehand-linkprobe.{}", std::process::id()));
    let _ = fs::remove_file(&probe);
    match create_symlink(Path::new("."), &probe) {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

/// Create a directory link at `dst` pointing to `src`.
pub fn link_dir(src: &Path, dst: &Path) -> anyhow::Result<()> {
    create_dir_symlink(src, dst).with_context(|| {
        format!(
            "Failed to link directory {} -> {}",
            dst.display(),
            src.display()
        )
    })
}

/// Create a file link at `dst` pointing to `src`.
pub fn link_file(src: &Path, dst: &Path) -> anyhow::Result<()> {
    create_symlink(src, dst).with_context(|| {
        format!(
            "Failed to link file {} -> {}",
            dst.display(),
            src.display()
        )
    })
}

/// Remove a file, directory, or link if present. Returns whether
/// anything was removed.
pub fn remove_path_if_exists(path: &Path) -> anyhow::Result<bool> {
    if !path.exists() && fs::symlink_metadata(path).is_err() {
        return Ok(false);
    }
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    } else {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    }
    Ok(true)
}

#[cfg(unix)]
fn create_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(unix)]
fn create_dir_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn create_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

#[cfg(windows)]
fn create_dir_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_src: &Path, _dst: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Symlinks are not supported on this platform",
    ))
}

#[cfg(not(any(unix, windows)))]
fn create_dir_symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    create_symlink(src, dst)
}
