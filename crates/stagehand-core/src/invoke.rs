//! Host invocation collaborator for single-invoke watch mode.

use std::path::Path;

/// Re-execution surface owned by the host.
///
/// After a watch-triggered rebuild, the pipeline unloads every freshly
/// emitted file so the next invocation runs the new code, then triggers
/// exactly one invocation.
pub trait Invoker {
    /// Discard any previously loaded in-process representation of a
    /// compiled file.
    fn unload(&mut self, compiled: &Path) -> anyhow::Result<()>;

    /// Trigger a single external invocation.
    fn invoke(&mut self) -> anyhow::Result<()>;
}
