//! External compiler collaborator.

use std::path::{Path, PathBuf};

use crate::service::DeployableUnit;

/// Compiler configuration with a redirectable output directory.
///
/// `options` is an opaque payload owned by the compiler implementation;
/// the pipeline only ever touches `out_dir`.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub out_dir: PathBuf,
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl CompilerConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            options: serde_json::Map::new(),
        }
    }
}

/// The source compiler consumed by the pipeline.
///
/// Implementations emit files under [`CompilerConfig::out_dir`]; the
/// pipeline points that at the staging directory before running.
pub trait Compiler {
    /// Load the compiler configuration for a project root.
    fn load_config(&self, root: &Path) -> anyhow::Result<CompilerConfig>;

    /// Resolve the root input file set for the declared units.
    fn extract_entry_files(
        &self,
        root: &Path,
        unit_kind: &str,
        units: &[DeployableUnit],
    ) -> anyhow::Result<Vec<PathBuf>>;

    /// Compile the entry files and return every emitted file path.
    fn run(
        &self,
        entry_files: &[PathBuf],
        config: &CompilerConfig,
    ) -> anyhow::Result<Vec<PathBuf>>;
}
