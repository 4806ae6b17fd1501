//! The host-facing staging pipeline.
//!
//! One [`StagePipeline`] value carries a build session end to end:
//! activate the staging redirect, compile into staging, stage extras
//! and dependencies, and later relocate packaged artifacts and clean
//! the session up. Watch mode wraps the pipeline in a mutex so change
//! bursts serialize against any in-flight rebuild.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::{error, info};

use crate::compiler::Compiler;
use crate::fs::remove_path_if_exists;
use crate::invoke::Invoker;
use crate::notifier::{BurstCallback, ChangeNotifier};
use crate::relocate;
use crate::service::ServiceDefinition;
use crate::session::BuildSession;
use crate::stage;

/// Watch behavior selected by whichever entry point starts watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// Each change burst re-runs the full stage pipeline.
    Rebuild,
    /// Each burst rebuilds, unloads the emitted files, and re-triggers
    /// a single invocation.
    SingleInvoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Started,
    AlreadyWatching,
}

pub struct StagePipeline<C: Compiler, I: Invoker> {
    compiler: C,
    invoker: I,
    service: ServiceDefinition,
    session: BuildSession,
}

impl<C: Compiler, I: Invoker> StagePipeline<C, I> {
    pub fn new(
        compiler: C,
        invoker: I,
        service: ServiceDefinition,
        session: BuildSession,
    ) -> Self {
        Self {
            compiler,
            invoker,
            service,
            session,
        }
    }

    pub fn session(&self) -> &BuildSession {
        &self.session
    }

    pub fn service(&self) -> &ServiceDefinition {
        &self.service
    }

    /// Mutable service access for the host surface (the packager records
    /// artifact paths on units between staging and relocation).
    pub fn service_mut(&mut self) -> &mut ServiceDefinition {
        &mut self.service
    }

    /// Idempotent pre-step: inject this plugin's module path into every
    /// unit's exclude list.
    pub fn prepare(&mut self) {
        self.service.prepare();
    }

    /// Compile into staging and populate it with extras and
    /// dependencies (link-or-copy mode). Returns the emitted files.
    pub fn compile_and_stage(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        self.compile_and_stage_inner(false)
    }

    /// Same as [`Self::compile_and_stage`], but dependencies are staged
    /// as a fresh full copy so packaging captures their current state.
    pub fn compile_and_stage_for_packaging(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        self.compile_and_stage_inner(true)
    }

    fn compile_and_stage_inner(&mut self, for_packaging: bool) -> anyhow::Result<Vec<PathBuf>> {
        self.session.activate();
        let source_root = self.session.source_root().to_path_buf();
        let staging = self.session.staging_root();
        std::fs::create_dir_all(&staging).with_context(|| {
            format!("Failed to create staging directory: {}", staging.display())
        })?;

        let mut config = self.compiler.load_config(&source_root)?;
        config.out_dir = staging;

        let entry_files =
            self.compiler
                .extract_entry_files(&source_root, &self.service.unit_kind, &self.service.units)?;
        info!(entries = entry_files.len(), "starting compile");
        let emitted = self.compiler.run(&entry_files, &config)?;
        info!(emitted = emitted.len(), "compile complete");

        let globs = self.service.include_globs(self.session.selected_unit());
        stage::extras::stage(&self.session, &globs)?;
        stage::deps::stage(&self.session, for_packaging)?;

        Ok(emitted)
    }

    /// Relocate packaged artifacts, restore the original root, delete
    /// staging.
    ///
    /// Ordering is strict: the staging directory is only deleted after
    /// relocation completed and the redirect was deactivated, so a
    /// relocation failure leaves staging (and the redirect) intact.
    pub fn relocate_and_cleanup(&mut self) -> anyhow::Result<()> {
        relocate::relocate(&self.session, &mut self.service)?;
        self.session.deactivate()?;
        let staging = self.session.staging_root();
        remove_path_if_exists(&staging)?;
        info!(path = %staging.display(), "staging directory removed");
        Ok(())
    }

    /// One watch-triggered rebuild cycle.
    fn run_burst(&mut self, mode: WatchMode) -> anyhow::Result<()> {
        let emitted = self.compile_and_stage()?;
        if mode == WatchMode::SingleInvoke {
            for path in &emitted {
                self.invoker.unload(path)?;
            }
            self.invoker.invoke()?;
        }
        Ok(())
    }
}

/// Start watching with rebuild-only burst behavior.
pub fn start_watch_all<C, I, N>(
    pipeline: &Arc<Mutex<StagePipeline<C, I>>>,
    notifier: &mut N,
) -> anyhow::Result<WatchOutcome>
where
    C: Compiler + Send + 'static,
    I: Invoker + Send + 'static,
    N: ChangeNotifier + ?Sized,
{
    start_watch(pipeline, notifier, WatchMode::Rebuild)
}

/// Start watching with rebuild-then-reinvoke burst behavior.
pub fn start_watch_single<C, I, N>(
    pipeline: &Arc<Mutex<StagePipeline<C, I>>>,
    notifier: &mut N,
) -> anyhow::Result<WatchOutcome>
where
    C: Compiler + Send + 'static,
    I: Invoker + Send + 'static,
    N: ChangeNotifier + ?Sized,
{
    start_watch(pipeline, notifier, WatchMode::SingleInvoke)
}

/// Register the change-notification subscription for a session.
///
/// The Idle -> Watching transition is one-way: repeat calls return
/// [`WatchOutcome::AlreadyWatching`] without registering a second
/// subscription. Bursts serialize on the pipeline mutex; the notifier
/// already coalesces events and never fires the callback concurrently
/// with itself, so at most one rebuild queues behind an in-flight one.
/// A failed burst is logged and the subscription stays alive.
pub fn start_watch<C, I, N>(
    pipeline: &Arc<Mutex<StagePipeline<C, I>>>,
    notifier: &mut N,
    mode: WatchMode,
) -> anyhow::Result<WatchOutcome>
where
    C: Compiler + Send + 'static,
    I: Invoker + Send + 'static,
    N: ChangeNotifier + ?Sized,
{
    let (entry_files, root) = {
        let mut guard = lock_pipeline(pipeline)?;
        if guard.session.is_watching() {
            return Ok(WatchOutcome::AlreadyWatching);
        }
        let root = guard.session.source_root().to_path_buf();
        let entry_files = guard.compiler.extract_entry_files(
            &root,
            &guard.service.unit_kind,
            &guard.service.units,
        )?;
        guard.session.mark_watching();
        (entry_files, root)
    };

    info!(mode = ?mode, root = %root.display(), "starting watch");

    let shared = Arc::clone(pipeline);
    let callback: BurstCallback = Box::new(move || {
        let Ok(mut guard) = shared.lock() else {
            return;
        };
        if let Err(err) = guard.run_burst(mode) {
            error!(error = %err, "watch rebuild failed");
        }
    });

    notifier.watch(&entry_files, &root, callback)?;
    Ok(WatchOutcome::Started)
}

fn lock_pipeline<'a, C: Compiler, I: Invoker>(
    pipeline: &'a Arc<Mutex<StagePipeline<C, I>>>,
) -> anyhow::Result<std::sync::MutexGuard<'a, StagePipeline<C, I>>> {
    pipeline
        .lock()
        .map_err(|_| anyhow::anyhow!("Stage pipeline lock poisoned"))
}
