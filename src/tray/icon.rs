use crate::icon::{Composer, Platform, Representation, SourceImage, APP_ICON_SVG};
use anyhow::Result;
use tray_icon::Icon;

pub const TRAY_ICON_SIZE: u32 = 32;

/// The bundled application icon, shown until the first window icon arrives.
pub fn create_icon() -> Result<Icon> {
    let image = SourceImage::decode(APP_ICON_SVG.as_bytes())?;
    let representation = Composer::new(Platform::current().capabilities(), 1.0).render(&image, TRAY_ICON_SIZE)?;
    to_icon(representation)
}

pub fn to_icon(representation: Representation) -> Result<Icon> {
    let size = representation.size;
    Ok(Icon::from_rgba(representation.rgba, size, size)?)
}
