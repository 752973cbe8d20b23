//! Hot reload of the retry section.
//!
//! Only the retry policy can change under a running client, so a reload is
//! forwarded only when it parses, validates, and carries a retry section that
//! differs from the last one forwarded. The receiver typically feeds
//! `Client::apply_retry_config`.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{ClientConfig, RetryConfig};

/// Watches a client config file and emits changed retry sections.
pub struct ConfigWatcher {
    path: PathBuf,
    current: RetryConfig,
    retry_tx: mpsc::UnboundedSender<RetryConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the retry section of `initial`.
    ///
    /// Returns the watcher and a receiver for changed retry sections.
    pub fn new(
        path: &Path,
        initial: &ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RetryConfig>) {
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                current: initial.retry.clone(),
                retry_tx,
            },
            retry_rx,
        )
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            current,
            retry_tx,
        } = self;
        let last_sent = Mutex::new(current);
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }

                let reloaded = match load_config(&watched) {
                    Ok(config) => config.retry,
                    Err(e) => {
                        tracing::warn!(
                            path = %watched.display(),
                            error = %e,
                            "Ignoring invalid config reload"
                        );
                        return;
                    }
                };

                let Ok(mut last) = last_sent.lock() else {
                    return;
                };
                if *last == reloaded {
                    return;
                }
                tracing::info!(
                    attempts = reloaded.attempts,
                    delay_ms = reloaded.delay_ms,
                    "Retry configuration changed"
                );
                *last = reloaded.clone();
                let _ = retry_tx.send(reloaded);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Watching client config");
        Ok(watcher)
    }
}
