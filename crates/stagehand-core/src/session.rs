//! Build session state and project-root redirection.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the hidden staging directory created under the project root.
pub const STAGING_DIR: &str = ".build";
/// Subfolder (under either root) where the external packager drops its output.
pub const OUTPUT_DIR: &str = ".artifacts";
/// Runtime dependency tree directory, relative to the project root.
pub const DEPS_DIR: &str = "vendor";
/// Dependency manifest file, relative to the project root.
pub const MANIFEST_FILE: &str = "manifest.toml";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot restore original root: no redirection was recorded for this session")]
    NotRedirected,
}

/// Unit of work for one compile/package cycle.
///
/// Owns the mapping between the original project root and the staging
/// directory, and which of the two is currently active. Every other
/// component reads paths through this value; only [`BuildSession::activate`]
/// and [`BuildSession::deactivate`] mutate the active root. Sessions are
/// plain values so tests (and multiple concurrent sessions) never share
/// process-global state.
#[derive(Debug, Clone)]
pub struct BuildSession {
    original_root: Option<PathBuf>,
    active_root: PathBuf,
    watching: bool,
    selected_unit: Option<String>,
}

impl BuildSession {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            original_root: None,
            active_root: project_root.into(),
            watching: false,
            selected_unit: None,
        }
    }

    /// Limit the session to a single deployable unit.
    pub fn with_selected_unit(mut self, name: impl Into<String>) -> Self {
        self.selected_unit = Some(name.into());
        self
    }

    /// The root all filesystem-reading collaborators should currently use.
    pub fn active_root(&self) -> &Path {
        &self.active_root
    }

    /// The original project root, regardless of redirection state.
    ///
    /// Before redirection this is the active root; afterwards it is the
    /// recorded original.
    pub fn source_root(&self) -> &Path {
        self.original_root.as_deref().unwrap_or(&self.active_root)
    }

    /// The staging directory, always a direct child of the original root.
    pub fn staging_root(&self) -> PathBuf {
        self.source_root().join(STAGING_DIR)
    }

    /// Packaged-output subfolder inside the staging directory.
    pub fn staging_output_dir(&self) -> PathBuf {
        self.staging_root().join(OUTPUT_DIR)
    }

    /// Packaged-output subfolder under the original root.
    pub fn original_output_dir(&self) -> PathBuf {
        self.source_root().join(OUTPUT_DIR)
    }

    pub fn is_redirected(&self) -> bool {
        self.original_root.is_some()
    }

    /// Record the current root as original and make staging the active root.
    ///
    /// Idempotent: a session already redirected stays as it is.
    pub fn activate(&mut self) {
        if self.original_root.is_some() {
            return;
        }
        let original = self.active_root.clone();
        self.active_root = original.join(STAGING_DIR);
        self.original_root = Some(original);
    }

    /// Restore the original root as active.
    ///
    /// Fails if no redirection was ever recorded; that is a programming
    /// contract violation, not a transient condition.
    pub fn deactivate(&mut self) -> Result<(), SessionError> {
        let original = self
            .original_root
            .as_ref()
            .ok_or(SessionError::NotRedirected)?;
        self.active_root = original.clone();
        Ok(())
    }

    pub fn selected_unit(&self) -> Option<&str> {
        self.selected_unit.as_deref()
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// One-way Idle -> Watching transition.
    ///
    /// Returns `true` when this call performed the transition, `false`
    /// when the session was already watching.
    pub fn mark_watching(&mut self) -> bool {
        if self.watching {
            return false;
        }
        self.watching = true;
        true
    }
}
