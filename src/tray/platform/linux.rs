use super::super::{MenuHandler, TrayCommand, TrayState};
use anyhow::Result;
use gtk::{self, glib};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tray_icon::menu::{MenuEvent, MenuEventReceiver};
use tray_icon::TrayIcon;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn spawn_tray(title: String, commands: Receiver<TrayCommand>, handler: MenuHandler) -> Result<()> {
    std::thread::Builder::new().name("tray".into()).spawn(move || {
        if gtk::init().is_err() {
            log::error!("Failed to initialize GTK");
            return;
        }

        let tray_icon = match super::build_tray(&title) {
            Ok(icon) => icon,
            Err(e) => {
                log::error!("Failed to create tray icon: {}", e);
                return;
            }
        };

        let mut state = TrayState::new(title);
        let menu_receiver = MenuEvent::receiver();

        glib::timeout_add_local(POLL_INTERVAL, move || {
            process_pending_events(&tray_icon, &mut state, &commands, menu_receiver, &handler)
        });
        gtk::main();
    })?;

    Ok(())
}

fn process_pending_events(
    tray_icon: &TrayIcon,
    state: &mut TrayState,
    commands: &Receiver<TrayCommand>,
    menu_receiver: &MenuEventReceiver,
    handler: &MenuHandler,
) -> glib::ControlFlow {
    while let Ok(command) = commands.try_recv() {
        state.apply(tray_icon, command);
    }

    while let Ok(event) = menu_receiver.try_recv() {
        if handler.handle(&event.id.0) {
            gtk::main_quit();
            return glib::ControlFlow::Break;
        }
    }

    glib::ControlFlow::Continue
}
