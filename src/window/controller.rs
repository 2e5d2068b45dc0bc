use super::{IconScheduler, IconTarget, WindowSurface};
use crate::badge::BadgeValue;
use crate::icon::{Capabilities, IconSource};
use crate::store::AppState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// What a window shows when no server supplies its own icon or title.
#[derive(Debug, Clone)]
pub struct WindowDefaults {
    pub icon: IconSource,
    pub title: String,
}

/// The icon, badge and title a window should currently display.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowView {
    pub icon: IconSource,
    pub badge: BadgeValue,
    pub title: String,
}

impl WindowView {
    pub fn derive(state: &AppState, defaults: &WindowDefaults) -> Self {
        Self {
            icon: state.icon_source(&defaults.icon),
            badge: state.window_badge(),
            title: state.title(&defaults.title).to_string(),
        }
    }
}

/// Turns state snapshots and focus changes into surface updates for one window.
pub struct WindowController<S> {
    surface: Arc<S>,
    scheduler: IconScheduler,
    defaults: WindowDefaults,
    caps: Capabilities,
    current: Option<WindowView>,
    flashing: bool,
}

impl<S: WindowSurface> WindowController<S> {
    pub fn new(surface: Arc<S>, scheduler: IconScheduler, defaults: WindowDefaults) -> Self {
        Self {
            caps: surface.platform().capabilities(),
            surface,
            scheduler,
            defaults,
            current: None,
            flashing: false,
        }
    }

    pub fn scheduler(&self) -> &IconScheduler {
        &self.scheduler
    }

    pub fn observe(&mut self, state: &AppState) {
        let view = WindowView::derive(state, &self.defaults);
        let previous = self.current.replace(view.clone());

        if previous.as_ref().map(|p| &p.title) != Some(&view.title) {
            self.surface.set_title(&view.title);
        }

        let icon_changed = previous
            .as_ref()
            .map_or(true, |p| p.icon != view.icon || p.badge != view.badge);
        if icon_changed {
            self.scheduler.submit(IconTarget {
                source: view.icon.clone(),
                badge: view.badge,
            });
        }

        if previous.as_ref().map(|p| p.badge) != Some(view.badge) {
            let wanted = view.badge.is_positive_count() && !self.surface.is_focused();
            self.request_attention(wanted);
        }
    }

    pub fn focus_changed(&mut self, focused: bool) {
        if focused {
            self.request_attention(false);
        }
    }

    fn request_attention(&mut self, flash: bool) {
        if !self.caps.flashes_on_unread || self.flashing == flash {
            return;
        }
        log::debug!("Window attention request: {}", flash);
        self.flashing = flash;
        self.surface.flash_attention(flash);
    }

    pub async fn run(mut self, mut states: watch::Receiver<AppState>, mut focus: mpsc::Receiver<bool>) {
        let initial = states.borrow_and_update().clone();
        self.observe(&initial);

        loop {
            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = states.borrow_and_update().clone();
                    self.observe(&state);
                }
                Some(focused) = focus.recv() => self.focus_changed(focused),
            }
        }

        log::debug!("State store closed; window controller stopped");
    }

    pub fn spawn(self, states: watch::Receiver<AppState>, focus: mpsc::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(states, focus))
    }
}
