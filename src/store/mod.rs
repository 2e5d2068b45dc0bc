mod file;

pub use file::StateFileWatcher;

use crate::badge::{self, BadgeValue, ServerBadge};
use crate::icon::IconSource;
use serde::Deserialize;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub favicon: Option<String>,
    #[serde(default)]
    pub badge: ServerBadge,
    #[serde(default)]
    pub title: Option<String>,
}

/// Snapshot of the application state the icon pipeline reacts to.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub current_server_url: Option<String>,
    #[serde(default)]
    pub is_tray_icon_enabled: bool,
}

impl AppState {
    pub fn current_server(&self) -> Option<&Server> {
        let current = self.current_server_url.as_deref()?;
        self.servers.iter().find(|s| s.url == current)
    }

    pub fn aggregate_badge(&self) -> BadgeValue {
        badge::aggregate(self.servers.iter().map(|s| &s.badge))
    }

    /// Badge for the window icon. The tray icon takes over the badge when enabled.
    pub fn window_badge(&self) -> BadgeValue {
        if self.is_tray_icon_enabled {
            return BadgeValue::None;
        }
        self.aggregate_badge()
    }

    pub fn icon_source(&self, fallback: &IconSource) -> IconSource {
        self.current_server()
            .and_then(|s| s.favicon.as_deref())
            .filter(|favicon| !favicon.is_empty())
            .map(IconSource::new)
            .unwrap_or_else(|| fallback.clone())
    }

    pub fn title<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.current_server()
            .and_then(|s| s.title.as_deref())
            .filter(|title| !title.is_empty())
            .unwrap_or(fallback)
    }
}

pub struct StateStore {
    tx: watch::Sender<AppState>,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Replaces the snapshot, notifying subscribers only when it actually changed.
    pub fn replace(&self, state: AppState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        })
    }

    pub fn update(&self, f: impl FnOnce(&mut AppState)) -> bool {
        let mut next = self.snapshot();
        f(&mut next);
        self.replace(next)
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
