use super::{AppState, StateStore};
use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Notify};

/// Feeds the state store from a JSON snapshot file, reloading it whenever the
/// file system reports a change to it.
pub struct StateFileWatcher {
    path: PathBuf,
    debounce: Duration,
    store: Arc<StateStore>,
    reload: Arc<Notify>,
}

impl StateFileWatcher {
    pub fn new(path: PathBuf, debounce: Duration, store: Arc<StateStore>) -> Self {
        Self {
            path,
            debounce,
            store,
            reload: Arc::new(Notify::new()),
        }
    }

    /// Notifying the handle forces a re-read on the next loop turn.
    pub fn reload_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.reload)
    }

    /// Reads the file into the store. Returns whether the store changed.
    pub fn load(&self) -> Result<bool> {
        let state = read_state(&self.path)?;
        let changed = self.store.replace(state);
        if changed {
            log::info!("Loaded state from {}", self.path.display());
        }
        Ok(changed)
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let (tx, mut events) = mpsc::unbounded_channel();
        let _debouncer = match self.watch(tx) {
            Ok(debouncer) => Some(debouncer),
            Err(e) => {
                log::warn!("State file changes will not be picked up automatically: {:#}", e);
                None
            }
        };
        let reload = Arc::clone(&self.reload);

        self.reload_or_keep();
        loop {
            tokio::select! {
                Some(result) = events.recv() => match result {
                    Ok(events) if events.iter().any(|e| self.concerns_state(e)) => self.reload_or_keep(),
                    Ok(_) => {}
                    Err(e) => log::warn!("State file watcher error: {}", e),
                },
                _ = reload.notified() => {
                    log::debug!("State reload requested");
                    self.reload_or_keep();
                }
                _ = shutdown.recv() => break,
            }
        }

        log::debug!("State file watcher stopped");
    }

    /// Watches the parent directory so the file may be created, replaced or removed.
    fn watch(&self, tx: mpsc::UnboundedSender<DebounceEventResult>) -> Result<Debouncer<RecommendedWatcher>> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut debouncer = new_debouncer(self.debounce, move |result: DebounceEventResult| {
            let _ = tx.send(result);
        })
        .context("Failed to create file watcher")?;
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        log::info!("Watching state file {}", self.path.display());
        Ok(debouncer)
    }

    fn concerns_state(&self, event: &DebouncedEvent) -> bool {
        event.path.file_name() == self.path.file_name()
    }

    fn reload_or_keep(&self) {
        if let Err(e) = self.load() {
            log::warn!("Keeping previous state: {:#}", e);
        }
    }
}

fn read_state(path: &Path) -> Result<AppState> {
    if !path.exists() {
        return Ok(AppState::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Invalid state file {}", path.display()))?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::BadgeValue;
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);

    fn setup() -> (StateFileWatcher, Arc<StateStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(StateStore::default());
        let watcher = StateFileWatcher::new(
            dir.path().join("state.json"),
            Duration::from_millis(20),
            Arc::clone(&store),
        );
        (watcher, store, dir)
    }

    #[test]
    fn missing_file_yields_empty_state() {
        // Arrange
        let (watcher, store, _dir) = setup();

        // Act
        let changed = watcher.load().unwrap();

        // Assert
        assert!(!changed);
        assert_eq!(store.snapshot(), AppState::default());
    }

    #[test]
    fn load_reports_change_once() {
        // Arrange
        let (watcher, store, _dir) = setup();
        fs::write(&watcher.path, r#"{"servers": [{"url": "a", "badge": 4}]}"#).unwrap();

        // Act
        let first = watcher.load().unwrap();
        let second = watcher.load().unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(store.snapshot().window_badge(), BadgeValue::Count(4));
    }

    #[test]
    fn invalid_json_keeps_previous_state() {
        // Arrange
        let (watcher, store, _dir) = setup();
        fs::write(&watcher.path, r#"{"servers": [{"url": "a", "badge": 2}]}"#).unwrap();
        watcher.load().unwrap();

        // Act
        fs::write(&watcher.path, "{ not json").unwrap();
        let result = watcher.load();

        // Assert
        assert!(result.is_err());
        assert_eq!(store.snapshot().window_badge(), BadgeValue::Count(2));
    }

    #[tokio::test]
    async fn same_size_rewrite_is_picked_up() {
        // Arrange
        let (watcher, store, _dir) = setup();
        let path = watcher.path.clone();
        fs::write(&path, r#"{"servers": [{"url": "a", "badge": 3}]}"#).unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let mut rx = store.subscribe();
        let task = tokio::spawn(watcher.run(shutdown_rx));
        tokio::time::timeout(WAIT, rx.changed()).await.unwrap().unwrap();

        // Act
        fs::write(&path, r#"{"servers": [{"url": "a", "badge": 4}]}"#).unwrap();
        tokio::time::timeout(WAIT, rx.changed()).await.unwrap().unwrap();

        // Assert
        assert_eq!(store.snapshot().window_badge(), BadgeValue::Count(4));
        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn bad_rewrite_keeps_state_until_fixed() {
        // Arrange
        let (watcher, store, _dir) = setup();
        let path = watcher.path.clone();
        fs::write(&path, r#"{"servers": [{"url": "a", "badge": 1}]}"#).unwrap();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let mut rx = store.subscribe();
        let task = tokio::spawn(watcher.run(shutdown_rx));
        tokio::time::timeout(WAIT, rx.changed()).await.unwrap().unwrap();

        // Act
        fs::write(&path, "{ truncated").unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let during = store.snapshot().window_badge();
        fs::write(&path, r#"{"servers": [{"url": "a", "badge": 12}]}"#).unwrap();
        tokio::time::timeout(WAIT, rx.changed()).await.unwrap().unwrap();

        // Assert
        assert_eq!(during, BadgeValue::Count(1));
        assert_eq!(store.snapshot().window_badge(), BadgeValue::Overflow);
        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn reload_request_rereads_file() {
        // Arrange
        let (watcher, store, _dir) = setup();
        let reload = watcher.reload_handle();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let mut rx = store.subscribe();
        let task = tokio::spawn(watcher.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Act
        store.replace(AppState {
            is_tray_icon_enabled: true,
            ..AppState::default()
        });
        rx.borrow_and_update();
        reload.notify_one();
        tokio::time::timeout(WAIT, rx.changed()).await.unwrap().unwrap();

        // Assert
        assert_eq!(store.snapshot(), AppState::default());
        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }
}
