//! Stagehand Core Library
//!
//! Build-staging and artifact-relocation pipeline sitting between a
//! source compiler and a deployment packager. It redirects a project
//! root into an isolated staging directory, fills it with compiled
//! output, extra files, and dependencies, and after external packaging
//! relocates the produced artifacts back where the caller expects
//! them. Watch mode re-runs the staging pipeline on change bursts.

pub mod compiler;
pub mod config;
pub mod fs;
pub mod invoke;
pub mod notifier;
pub mod pipeline;
pub mod relocate;
pub mod service;
pub mod session;
pub mod stage;

/// Re-exports of commonly used types
pub mod prelude {
    // Session
    pub use crate::session::{BuildSession, SessionError};

    // Service
    pub use crate::service::{DeployableUnit, PackageRules, ServiceDefinition};

    // Pipeline
    pub use crate::pipeline::{
        StagePipeline, WatchMode, WatchOutcome, start_watch, start_watch_all, start_watch_single,
    };

    // Relocation
    pub use crate::relocate::PackagingTopology;

    // Collaborators
    pub use crate::compiler::{Compiler, CompilerConfig};
    pub use crate::invoke::Invoker;
    pub use crate::notifier::{BurstCallback, ChangeNotifier, NotifyNotifier};
}
