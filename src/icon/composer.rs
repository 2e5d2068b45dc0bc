use super::platform::{BadgeStyle, Capabilities};
use super::{CompositionError, Representation, RepresentationSet};
use crate::badge::{glyph, BadgeValue};
use resvg::tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform,
};
use resvg::usvg;

/// A decoded icon source, ready to be drawn at any size.
pub enum SourceImage {
    Vector(usvg::Tree),
    Raster(Pixmap),
}

impl SourceImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, CompositionError> {
        if image::guess_format(bytes).is_ok() {
            return decode_raster(bytes);
        }

        usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map(SourceImage::Vector)
            .map_err(|e| CompositionError::Decode(e.to_string()))
    }

    fn draw(&self, canvas: &mut Pixmap, size: u32) {
        match self {
            SourceImage::Vector(tree) => {
                let natural = tree.size();
                let transform = Transform::from_scale(
                    size as f32 / natural.width(),
                    size as f32 / natural.height(),
                );
                resvg::render(tree, transform, &mut canvas.as_mut());
            }
            SourceImage::Raster(pixmap) => {
                let transform = Transform::from_scale(
                    size as f32 / pixmap.width() as f32,
                    size as f32 / pixmap.height() as f32,
                );
                let paint = PixmapPaint {
                    quality: FilterQuality::Bicubic,
                    ..PixmapPaint::default()
                };
                canvas.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
            }
        }
    }
}

fn decode_raster(bytes: &[u8]) -> Result<SourceImage, CompositionError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CompositionError::Decode(e.to_string()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(CompositionError::Canvas(width.max(height)))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(decoded.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    Ok(SourceImage::Raster(pixmap))
}

/// Produces representation sets for one platform convention.
#[derive(Debug, Clone, Copy)]
pub struct Composer {
    caps: Capabilities,
    display_scale: f32,
}

impl Composer {
    pub fn new(caps: Capabilities, display_scale: f32) -> Self {
        Self { caps, display_scale }
    }

    /// Main window icon at every canonical size. The badge is only drawn when the
    /// platform composites badges into the icon.
    pub fn icon(&self, source: &SourceImage, badge: BadgeValue) -> Result<RepresentationSet, CompositionError> {
        let glyph = match self.caps.badge_style {
            BadgeStyle::Composite if !badge.is_none() => Some(glyph::render(badge)),
            _ => None,
        };

        let mut representations = Vec::with_capacity(self.caps.icon_sizes.len());
        for &size in self.caps.icon_sizes {
            let mut canvas = canvas(source, size)?;

            if let Some(glyph) = &glyph {
                draw_notch_badge(&mut canvas, size, glyph);
            }

            representations.push(self.representation(canvas));
        }

        Ok(RepresentationSet::new(representations))
    }

    /// Unbadged bitmap at one arbitrary size.
    pub fn render(&self, source: &SourceImage, size: u32) -> Result<Representation, CompositionError> {
        Ok(self.representation(canvas(source, size)?))
    }

    /// Separate small badge icon, `None` when there is nothing to show.
    pub fn overlay(&self, badge: BadgeValue) -> Result<Option<RepresentationSet>, CompositionError> {
        if badge.is_none() {
            return Ok(None);
        }

        let size = self.caps.overlay_size;
        let glyph = glyph::render(badge);
        let mut canvas = Pixmap::new(size, size).ok_or(CompositionError::Canvas(size))?;
        let scale = size as f32 / glyph.size() as f32;
        canvas.draw_pixmap(
            0,
            0,
            glyph.pixmap(),
            &PixmapPaint {
                quality: FilterQuality::Bicubic,
                ..PixmapPaint::default()
            },
            Transform::from_scale(scale, scale),
            None,
        );

        Ok(Some(RepresentationSet::new(vec![self.representation(canvas)])))
    }

    fn representation(&self, canvas: Pixmap) -> Representation {
        let size = canvas.width();
        let rgba = canvas
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        Representation {
            size,
            scale_factor: self.caps.scale.scale_factor(size, self.display_scale),
            rgba,
        }
    }
}

fn canvas(source: &SourceImage, size: u32) -> Result<Pixmap, CompositionError> {
    let mut canvas = Pixmap::new(size, size).ok_or(CompositionError::Canvas(size))?;
    source.draw(&mut canvas, size);
    Ok(canvas)
}

/// Cuts a flag-shaped notch into the lower-right quadrant and centers the glyph in it.
fn draw_notch_badge(canvas: &mut Pixmap, size: u32, glyph: &glyph::Glyph) {
    let size = size as f32;
    let radius = size / 4.0;
    let center = size - radius;

    let clear = Paint {
        blend_mode: BlendMode::Clear,
        ..Paint::default()
    };
    if let Some(circle) = PathBuilder::from_circle(center, center, radius) {
        canvas.fill_path(&circle, &clear, FillRule::Winding, Transform::identity(), None);
    }
    if let Some(corner) = Rect::from_xywh(center, center, radius, radius) {
        canvas.fill_rect(corner, &clear, Transform::identity(), None);
    }

    let diameter = size / 3.0;
    let scale = diameter / glyph.size() as f32;
    let offset = center - diameter / 2.0;
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(
        0,
        0,
        glyph.pixmap(),
        &paint,
        Transform::from_scale(scale, scale).post_translate(offset, offset),
        None,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::platform::Platform;

    const SQUARE_SVG: &str = "<svg xmlns='http://www.w3.org/2000/svg' width='10' height='10'>\
        <rect width='10' height='10' fill='#00ff00'/></svg>";

    fn alpha_at(set: &RepresentationSet, size: u32, x: u32, y: u32) -> u8 {
        let rep = set.get(size).unwrap();
        rep.rgba[((y * size + x) * 4 + 3) as usize]
    }

    fn rgba_at(set: &RepresentationSet, size: u32, x: u32, y: u32) -> [u8; 4] {
        let rep = set.get(size).unwrap();
        let idx = ((y * size + x) * 4) as usize;
        [rep.rgba[idx], rep.rgba[idx + 1], rep.rgba[idx + 2], rep.rgba[idx + 3]]
    }

    fn source() -> SourceImage {
        SourceImage::decode(SQUARE_SVG.as_bytes()).unwrap()
    }

    #[test]
    fn linux_icon_covers_canonical_sizes_with_display_scale() {
        let composer = Composer::new(Platform::Linux.capabilities(), 2.0);

        let set = composer.icon(&source(), BadgeValue::None).unwrap();

        assert_eq!(set.sizes(), vec![64, 48, 40, 32, 24, 20, 16]);
        for rep in set.iter() {
            assert_eq!(rep.scale_factor, 2.0);
            assert_eq!(rep.rgba.len(), (rep.size * rep.size * 4) as usize);
        }
        assert_eq!(rgba_at(&set, 32, 16, 16), [0, 255, 0, 255]);
    }

    #[test]
    fn windows_icon_scale_is_relative_to_32px() {
        let composer = Composer::new(Platform::Windows.capabilities(), 2.0);

        let set = composer.icon(&source(), BadgeValue::Count(3)).unwrap();

        assert_eq!(set.get(32).unwrap().scale_factor, 1.0);
        assert_eq!(set.get(16).unwrap().scale_factor, 0.5);
        assert_eq!(set.get(256).unwrap().scale_factor, 8.0);
    }

    #[test]
    fn windows_icon_is_never_badged() {
        let composer = Composer::new(Platform::Windows.capabilities(), 1.0);

        let plain = composer.icon(&source(), BadgeValue::None).unwrap();
        let with_badge = composer.icon(&source(), BadgeValue::Count(3)).unwrap();

        assert_eq!(plain, with_badge);
    }

    #[test]
    fn linux_badge_clears_notch_and_draws_glyph() {
        let composer = Composer::new(Platform::Linux.capabilities(), 1.0);

        let set = composer.icon(&source(), BadgeValue::Count(3)).unwrap();

        // Notch ring between the glyph disc and the cleared circle edge.
        assert_eq!(alpha_at(&set, 64, 48, 35), 0);
        // Trailing square corner is cleared too.
        assert_eq!(alpha_at(&set, 64, 63, 63), 0);
        // Glyph backdrop sits at the notch center.
        let [r, g, _, a] = rgba_at(&set, 64, 39, 48);
        assert!(a > 250);
        assert!(r > 200 && g < 120);
        // Rest of the icon is untouched.
        assert_eq!(rgba_at(&set, 64, 8, 8), [0, 255, 0, 255]);
    }

    fn notch_pixels(set: &RepresentationSet) -> Vec<u8> {
        let rep = set.get(64).unwrap();
        (32..64)
            .flat_map(|y| {
                let start = ((y * 64 + 32) * 4) as usize;
                rep.rgba[start..start + 32 * 4].to_vec()
            })
            .collect()
    }

    #[test]
    fn composited_glyph_differs_per_badge() {
        // Arrange
        let composer = Composer::new(Platform::Linux.capabilities(), 1.0);
        let badges = [BadgeValue::Count(3), BadgeValue::Count(4), BadgeValue::Dot, BadgeValue::Overflow];

        // Act
        let sets: Vec<_> = badges.iter().map(|&b| composer.icon(&source(), b).unwrap()).collect();

        // Assert
        for (i, first) in sets.iter().enumerate() {
            for (j, second) in sets.iter().enumerate().skip(i + 1) {
                assert_ne!(
                    notch_pixels(first),
                    notch_pixels(second),
                    "{} and {} render the same notch",
                    badges[i],
                    badges[j]
                );
                assert_eq!(rgba_at(first, 64, 8, 8), rgba_at(second, 64, 8, 8));
            }
        }
    }

    #[test]
    fn overlay_is_single_32px_glyph() {
        let composer = Composer::new(Platform::Windows.capabilities(), 1.0);

        let overlay = composer.overlay(BadgeValue::Count(3)).unwrap().unwrap();

        assert_eq!(overlay.sizes(), vec![32]);
        assert_eq!(overlay.get(32).unwrap().scale_factor, 1.0);
        assert_eq!(alpha_at(&overlay, 32, 0, 0), 0);
        assert!(alpha_at(&overlay, 32, 3, 16) > 250);
    }

    #[test]
    fn overlay_for_empty_badge_is_none() {
        let composer = Composer::new(Platform::Windows.capabilities(), 1.0);

        assert!(composer.overlay(BadgeValue::None).unwrap().is_none());
    }

    #[test]
    fn decode_rejects_garbage() {
        let cases: [&[u8]; 3] = [b"", b"not an image", b"<svg"];

        for bytes in cases {
            assert!(matches!(SourceImage::decode(bytes), Err(CompositionError::Decode(_))));
        }
    }

    #[test]
    fn decode_accepts_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let composer = Composer::new(Platform::Linux.capabilities(), 1.0);

        let decoded = SourceImage::decode(&png).unwrap();
        let set = composer.icon(&decoded, BadgeValue::None).unwrap();

        assert!(matches!(decoded, SourceImage::Raster(_)));
        let [r, g, b, a] = rgba_at(&set, 16, 8, 8);
        assert!(r > 250 && g < 5 && b < 5 && a > 250);
    }
}
