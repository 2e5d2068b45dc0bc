use anyhow::Result;
use badge_shell::config::Settings;
use badge_shell::icon::{RepresentationCache, UrlLoader};
use badge_shell::store::{StateFileWatcher, StateStore};
use badge_shell::tray::TraySurface;
use badge_shell::window::{IconScheduler, WindowController, WindowDefaults};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting Badge Shell...");

    let settings = Settings::load()?;
    let platform = settings.platform();
    let state_path = settings.state_path()?;
    log::info!("Platform: {:?}, state file: {}", platform, state_path.display());

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let store = Arc::new(StateStore::default());
    let watcher = StateFileWatcher::new(state_path, settings.debounce(), Arc::clone(&store));

    let surface = Arc::new(TraySurface::spawn(
        &settings.app_name,
        platform,
        settings.scale_factor(),
        watcher.reload_handle(),
        shutdown_tx.clone(),
    )?);

    let loader = Arc::new(UrlLoader::new()?);
    let cache = RepresentationCache::new();
    let scheduler = IconScheduler::spawn(Arc::clone(&surface), loader, cache);
    let defaults = WindowDefaults {
        icon: settings.default_icon()?,
        title: settings.app_name.clone(),
    };

    // The tray never gains focus, so the focus channel only keeps the controller alive.
    let (_focus_tx, focus_rx) = mpsc::channel::<bool>(8);
    let _controller = WindowController::new(surface, scheduler, defaults).spawn(store.subscribe(), focus_rx);
    let _watcher = tokio::spawn(watcher.run(shutdown_tx.subscribe()));

    log::info!("Badge Shell started successfully");

    shutdown_rx.recv().await.ok();
    log::info!("Shutdown signal received, exiting...");
    Ok(())
}
