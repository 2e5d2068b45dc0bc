pub mod badge;
pub mod config;
pub mod icon;
pub mod menu;
pub mod paths;
pub mod store;
pub mod tray;
pub mod window;
