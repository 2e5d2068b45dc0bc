use super::super::{MenuHandler, TrayCommand, TrayState};
use anyhow::Result;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tray_icon::menu::MenuEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn spawn_tray(title: String, commands: Receiver<TrayCommand>, handler: MenuHandler) -> Result<()> {
    std::thread::Builder::new().name("tray".into()).spawn(move || {
        let tray_icon = match super::build_tray(&title) {
            Ok(icon) => icon,
            Err(e) => {
                log::error!("Failed to create tray icon: {}", e);
                return;
            }
        };

        let mut state = TrayState::new(title);
        let menu_receiver = MenuEvent::receiver();

        loop {
            match commands.recv_timeout(POLL_INTERVAL) {
                Ok(command) => state.apply(&tray_icon, command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            while let Ok(event) = menu_receiver.try_recv() {
                if handler.handle(&event.id.0) {
                    return;
                }
            }
        }
    })?;

    Ok(())
}
