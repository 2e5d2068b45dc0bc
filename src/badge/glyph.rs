use super::BadgeValue;
use resvg::tiny_skia::{Pixmap, PixmapRef, Transform};
use resvg::usvg;

/// Edge length of every rendered glyph; callers scale it to the target icon.
pub const GLYPH_SIZE: u32 = 32;

const BACKDROP: &str = "<circle cx='47.5' cy='44.5' r='11.5' fill='#f5455c'/>";

const DIGITS: [&str; 9] = [
    "M44.4 39h4.4v8.8H51V50h-6.6v-2.2h2.2v-6.6h-2.2z",
    "M43.1 40.1h1.1V39h6.6v1.1h1.1v4.4h-1.1v1.1h-5.5v2.2h6.6V50h-8.8v-5.5h1.1v-1.1h5.5v-2.2h-4.4v1.1h-2.2z",
    "M43.1 40.1h1.1V39h6.6v1.1h1.1v3.3h-1.1v2.2h1.1v3.3h-1.1V50h-6.6v-1.1h-1.1v-2.2h2.2v1.1h4.4v-2.2h-4.4v-2.2h4.4v-2.2h-4.4v1.1h-2.2z",
    "M43.1 39h2.2v4.4h4.4V39h2.2v11h-2.2v-4.4h-6.6z",
    "M42.9 39h8.8v2.2h-6.6v2.2h5.5v1.1h1.1v4.4h-1.1V50H44v-1.1h-1.1v-2.2h2.2v1.1h4.4v-2.2h-6.6z",
    "M43.1 40.1h1.1V39h6.6v1.1h1.1v2.2h-2.2v-1.1h-4.4v2.2h5.5v1.1h1.1v4.4h-1.1V50h-6.6v-1.1h-1.1v-8.8zm2.2 7.7h4.4v-2.2h-4.4v2.2z",
    "M42.8 40.1h1.1V39h6.6v1.1h1.1V50h-2.2v-8.8H45v3.3h-2.2z",
    "M43.1 40.1h1.1V39h6.6v1.1h1.1v3.3h-1.1v2.2h1.1v3.3h-1.1V50h-6.6v-1.1h-1.1v-3.3h1.1v-2.2h-1.1v-3.3zm2.2 7.7h4.4v-2.2h-4.4v2.2zm0-4.4h4.4v-2.2h-4.4v2.2z",
    "M43.1 40.1h1.1V39h6.6v1.1h1.1v8.8h-1.1V50h-6.6v-1.1h-1.1v-2.2h2.2v1.1h4.4v-2.2h-5.5v-1.1h-1.1v-4.4zm2.2 1.1v2.2h4.4v-2.2h-4.4z",
];

const OVERFLOW: &str =
    "M39.3 43.5h2v-2h2v2h2v2h-2v2h-2v-2h-2v-2zm7.68-3h1v-1h6v1h1v8h-1v1h-6v-1h-1v-2h2v1h4v-2h-5v-1h-1v-4zm2 1v2h4v-2h-4z";

/// A rendered badge: colored disc with a white mark, premultiplied RGBA.
pub struct Glyph {
    pixmap: Pixmap,
}

impl Glyph {
    pub fn size(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Renders the glyph for a badge.
///
/// # Panics
///
/// Panics on `BadgeValue::None` or an out-of-range count; callers only ask for
/// a glyph when there is something to show.
pub fn render(badge: BadgeValue) -> Glyph {
    let svg = template(badge);
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
        .expect("badge glyph templates are valid svg");

    let mut pixmap = Pixmap::new(GLYPH_SIZE, GLYPH_SIZE).expect("glyph size is non-zero");
    let scale = GLYPH_SIZE as f32 / tree.size().width();
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    Glyph { pixmap }
}

fn template(badge: BadgeValue) -> String {
    let mark = match badge {
        BadgeValue::Count(n @ 1..=9) => format!("<path fill='#fff' d='{}'/>", DIGITS[n as usize - 1]),
        BadgeValue::Overflow => format!("<path fill='#fff' d='{}'/>", OVERFLOW),
        BadgeValue::Dot => "<circle cx='47.5' cy='44.5' r='3.5' fill='#fff'/>".to_string(),
        BadgeValue::Count(n) => panic!("badge count {} has no glyph", n),
        BadgeValue::None => panic!("no glyph for an empty badge"),
    };

    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='23' height='23' viewBox='36 33 23 23'>{}{}</svg>",
        BACKDROP, mark
    )
}
