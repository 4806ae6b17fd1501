//! Change notification: trait and the notify-backed default.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Fired once per coalesced burst of filesystem events.
pub type BurstCallback = Box<dyn FnMut() + Send + 'static>;

/// Observer of a path set, invoking a callback once per change burst.
///
/// Implementations must never fire the callback concurrently with
/// itself.
pub trait ChangeNotifier {
    fn watch(
        &mut self,
        paths: &[PathBuf],
        root: &Path,
        on_change_burst: BurstCallback,
    ) -> anyhow::Result<()>;
}

/// Default window used to coalesce near-simultaneous events.
const DEBOUNCE_MS: u64 = 300;

struct Subscription {
    // Held only to keep the watcher and its drain thread alive.
    _watcher: RecommendedWatcher,
    _thread: JoinHandle<()>,
}

/// [`ChangeNotifier`] backed by the `notify` crate.
///
/// Watches the root recursively, filters events down to the requested
/// path set, and drains the event channel for a debounce window so one
/// callback covers a whole burst. The callback runs on a dedicated
/// drain thread, never concurrently with itself.
pub struct NotifyNotifier {
    debounce: Duration,
    subscriptions: Vec<Subscription>,
}

impl NotifyNotifier {
    pub fn new() -> Self {
        Self::with_debounce(Duration::from_millis(DEBOUNCE_MS))
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            subscriptions: Vec::new(),
        }
    }
}

impl Default for NotifyNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier for NotifyNotifier {
    fn watch(
        &mut self,
        paths: &[PathBuf],
        root: &Path,
        mut on_change_burst: BurstCallback,
    ) -> anyhow::Result<()> {
        // Relative entries are matched as path suffixes, so the watcher's
        // own canonicalization of event paths does not defeat the filter.
        let watched: Vec<PathBuf> = paths.to_vec();

        let (tx, rx) = channel();
        let mut watcher =
            notify::recommended_watcher(tx).context("Failed to create file watcher")?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch root: {}", root.display()))?;

        let debounce = self.debounce;
        let thread = std::thread::spawn(move || {
            while let Ok(first) = rx.recv() {
                let mut relevant = is_relevant(&first, &watched);
                // Coalesce the rest of the burst.
                loop {
                    match rx.recv_timeout(debounce) {
                        Ok(event) => relevant |= is_relevant(&event, &watched),
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => {
                            if relevant {
                                on_change_burst();
                            }
                            return;
                        }
                    }
                }
                if relevant {
                    on_change_burst();
                }
            }
        });

        self.subscriptions.push(Subscription {
            _watcher: watcher,
            _thread: thread,
        });
        Ok(())
    }
}

fn is_relevant(event: &Result<notify::Event, notify::Error>, watched: &[PathBuf]) -> bool {
    let Ok(event) = event else {
        return false;
    };
    if watched.is_empty() {
        return true;
    }
    event
        .paths
        .iter()
        .any(|changed| watched.iter().any(|w| changed.ends_with(w) || changed == w))
}
