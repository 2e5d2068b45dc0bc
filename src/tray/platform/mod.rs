#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod polling;

use super::{MenuHandler, TrayCommand};
use anyhow::Result;
use std::sync::mpsc::Receiver;

#[cfg(target_os = "linux")]
pub fn spawn_tray(title: String, commands: Receiver<TrayCommand>, handler: MenuHandler) -> Result<()> {
    linux::spawn_tray(title, commands, handler)
}

#[cfg(not(target_os = "linux"))]
pub fn spawn_tray(title: String, commands: Receiver<TrayCommand>, handler: MenuHandler) -> Result<()> {
    polling::spawn_tray(title, commands, handler)
}

fn build_tray(title: &str) -> Result<tray_icon::TrayIcon> {
    let menu = crate::menu::builder::build_menu()?;
    let tray_icon = tray_icon::TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(title)
        .with_icon(super::icon::create_icon()?)
        .build()?;
    Ok(tray_icon)
}
