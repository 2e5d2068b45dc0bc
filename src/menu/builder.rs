use super::router::{EventRoute, EventRouter, MenuAction};
use anyhow::Result;
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem};

pub const RELOAD_ID: &str = "__reload__";
pub const QUIT_ID: &str = "__quit__";

pub fn routes() -> EventRouter {
    EventRouter::new(vec![
        EventRoute {
            id: RELOAD_ID,
            action: MenuAction::ReloadState,
        },
        EventRoute {
            id: QUIT_ID,
            action: MenuAction::Quit,
        },
    ])
}

pub fn build_menu() -> Result<Menu> {
    let menu = Menu::new();

    let reload_item = MenuItem::with_id(RELOAD_ID, "Reload state", true, None);
    menu.append(&reload_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    let quit_item = MenuItem::with_id(QUIT_ID, "Quit", true, None);
    menu.append(&quit_item)?;

    Ok(menu)
}
