//! File watcher for API-definitions hot-reload.
//!
//! Mirrors the auth-table watcher pattern: debounce rapid filesystem events
//! (editors often replace a file atomically rather than writing in place),
//! then trigger one reload once things settle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::builder::TableBuilder;
use crate::service::GatewayRouter;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Watches `api_definitions_path` for changes and triggers [`crate::builder::reload`].
pub struct DefinitionWatcher {
    router: GatewayRouter,
    builder: Arc<dyn TableBuilder>,
    dir: PathBuf,
    debounce: Duration,
}

impl DefinitionWatcher {
    #[must_use]
    pub fn new(router: GatewayRouter, builder: Arc<dyn TableBuilder>, dir: impl Into<PathBuf>) -> Self {
        Self { router, builder, dir: dir.into(), debounce: DEFAULT_DEBOUNCE }
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Spawn the watcher as a background task. The returned handle can be
    /// aborted to stop watching; the watcher otherwise runs for the life of
    /// the process.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.run().await {
                error!(error = %err, "definitions watcher exited with error");
            }
        })
    }

    async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(16);

        let _watcher = {
            let tx = tx.clone();
            let mut watcher = RecommendedWatcher::new(
                move |res: Result<notify::Event, notify::Error>| match res {
                    Ok(event) if is_relevant_event(event.kind) => {
                        let _ = tx.try_send(());
                    }
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "filesystem watcher error"),
                },
                notify::Config::default(),
            )?;
            watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;
            info!(path = %self.dir.display(), "definitions watcher started");
            watcher
        };

        loop {
            if rx.recv().await.is_none() {
                debug!("definitions watcher channel closed, shutting down");
                break;
            }
            tokio::time::sleep(self.debounce).await;
            while rx.try_recv().is_ok() {}

            info!(path = %self.dir.display(), "reloading API definitions");
            if let Err(err) = crate::builder::reload(&self.router, self.builder.as_ref()).await {
                error!(error = %err, "failed to reload routing table, keeping previous state");
            }
        }

        Ok(())
    }
}

fn is_relevant_event(kind: EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_relevant_event_modify() {
        assert!(is_relevant_event(EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Content
        ))));
    }

    #[test]
    fn is_relevant_event_access_is_not() {
        assert!(!is_relevant_event(EventKind::Access(notify::event::AccessKind::Read)));
    }
}
