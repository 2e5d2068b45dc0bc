pub mod icon;
mod platform;

use crate::icon::{Platform, Representation, RepresentationSet};
use crate::menu::router::{EventRouter, MenuAction};
use crate::window::WindowSurface;
use anyhow::Result;
use std::sync::mpsc;
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};
use tray_icon::TrayIcon;

#[derive(Debug)]
pub enum TrayCommand {
    SetIcon(Representation),
    SetBadge(Option<String>),
    SetTitle(String),
    Flash(bool),
}

/// A window surface backed by the system tray icon. Updates are forwarded to
/// the thread that owns the tray.
pub struct TraySurface {
    tx: mpsc::Sender<TrayCommand>,
    platform: Platform,
    scale_factor: f32,
}

impl TraySurface {
    pub fn spawn(
        app_name: &str,
        platform: Platform,
        scale_factor: f32,
        reload: Arc<Notify>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let handler = MenuHandler {
            router: crate::menu::builder::routes(),
            reload,
            shutdown_tx,
        };
        platform::spawn_tray(app_name.to_string(), rx, handler)?;

        Ok(Self {
            tx,
            platform,
            scale_factor,
        })
    }

    fn send(&self, command: TrayCommand) {
        if self.tx.send(command).is_err() {
            log::warn!("Tray thread has exited; update dropped");
        }
    }
}

impl WindowSurface for TraySurface {
    fn set_icon(&self, icon: Arc<RepresentationSet>) {
        let wanted = (icon::TRAY_ICON_SIZE as f32 * self.scale_factor).round() as u32;
        match icon.best_fit(wanted) {
            Some(representation) => self.send(TrayCommand::SetIcon(representation.clone())),
            None => log::warn!("Icon has no representations; tray icon unchanged"),
        }
    }

    fn set_overlay_icon(&self, overlay: Option<Arc<RepresentationSet>>, description: &str) {
        let badge = overlay.map(|_| description.to_string());
        self.send(TrayCommand::SetBadge(badge));
    }

    fn set_title(&self, title: &str) {
        self.send(TrayCommand::SetTitle(title.to_string()));
    }

    fn flash_attention(&self, flash: bool) {
        self.send(TrayCommand::Flash(flash));
    }

    fn is_focused(&self) -> bool {
        false
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn display_scale_factor(&self) -> f32 {
        self.scale_factor
    }
}

pub(crate) struct MenuHandler {
    router: EventRouter,
    reload: Arc<Notify>,
    shutdown_tx: broadcast::Sender<()>,
}

impl MenuHandler {
    /// Returns true when the tray should shut down.
    fn handle(&self, event_id: &str) -> bool {
        log::debug!("Menu event: {}", event_id);

        match self.router.route(event_id) {
            Some(MenuAction::ReloadState) => {
                self.reload.notify_one();
                false
            }
            Some(MenuAction::Quit) => {
                log::info!("Quitting application");
                let _ = self.shutdown_tx.send(());
                true
            }
            None => false,
        }
    }
}

/// Tray-side view of what the window surface was told.
#[derive(Debug, Default)]
pub(crate) struct TrayState {
    title: String,
    badge: Option<String>,
}

impl TrayState {
    fn new(title: String) -> Self {
        Self { title, badge: None }
    }

    fn tooltip(&self) -> String {
        match self.badge.as_deref() {
            Some(badge) if !badge.is_empty() => format!("{} ({})", self.title, badge),
            _ => self.title.clone(),
        }
    }

    fn apply(&mut self, tray: &TrayIcon, command: TrayCommand) {
        match command {
            TrayCommand::SetIcon(representation) => {
                let result = icon::to_icon(representation).and_then(|icon| Ok(tray.set_icon(Some(icon))?));
                if let Err(e) = result {
                    log::error!("Failed to update tray icon: {}", e);
                }
                return;
            }
            TrayCommand::SetBadge(badge) => self.badge = badge,
            TrayCommand::SetTitle(title) => self.title = title,
            TrayCommand::Flash(flash) => {
                log::debug!("Tray icons cannot flash; attention request {} ignored", flash);
                return;
            }
        }

        if let Err(e) = tray.set_tooltip(Some(self.tooltip())) {
            log::error!("Failed to update tray tooltip: {}", e);
        }
    }
}
