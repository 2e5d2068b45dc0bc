mod controller;
mod scheduler;

pub use controller::{WindowController, WindowDefaults, WindowView};
pub use scheduler::{ChainState, IconScheduler, IconTarget};

use crate::icon::{Platform, RepresentationSet};
use std::sync::Arc;

/// The native window (or stand-in) that receives icon, title and attention updates.
pub trait WindowSurface: Send + Sync + 'static {
    fn set_icon(&self, icon: Arc<RepresentationSet>);

    /// `None` clears the overlay; `description` is the badge text for accessibility.
    fn set_overlay_icon(&self, overlay: Option<Arc<RepresentationSet>>, description: &str);

    fn set_title(&self, title: &str);

    fn flash_attention(&self, flash: bool);

    fn is_focused(&self) -> bool;

    fn platform(&self) -> Platform;

    fn display_scale_factor(&self) -> f32;
}
