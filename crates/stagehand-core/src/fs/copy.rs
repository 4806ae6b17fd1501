//! Recursive tree copy.

use std::fs;
use std::path::Path;

use anyhow::Context;

/// Copy `src` recursively into `dst`, overwriting existing files.
///
/// `dst` is created if missing. Entries that are neither files nor
/// directories are rejected; the staging tree must stay relocatable.
pub fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create directory: {}", dst.display()))?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read dir: {}", src.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry: {}", src.display()))?;
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat dir entry: {}", entry.path().display()))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_tree(&from, &to)?;
        } else if ty.is_file() {
            fs::copy(&from, &to).with_context(|| {
                format!(
                    "Failed to copy file from {} to {}",
                    from.display(),
                    to.display()
                )
            })?;
        } else {
            anyhow::bail!("Unsupported filesystem entry type at {}", from.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree_and_overwrites() {
        let tmp = tempfile::tempdir().expect("tempdir should succeed");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("nested")).expect("create_dir_all should succeed");
        fs::write(src.join("a.txt"), "one").expect("write should succeed");
        fs::write(src.join("nested").join("b.txt"), "two").expect("write should succeed");
        fs::create_dir_all(&dst).expect("create_dir_all should succeed");
        fs::write(dst.join("a.txt"), "stale").expect("write should succeed");

        copy_tree(&src, &dst).expect("copy_tree should succeed");

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "one");
        assert_eq!(
            fs::read_to_string(dst.join("nested").join("b.txt")).unwrap(),
            "two"
        );
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir should succeed");
        let result = copy_tree(&tmp.path().join("absent"), &tmp.path().join("dst"));
        assert!(result.is_err());
    }
}
