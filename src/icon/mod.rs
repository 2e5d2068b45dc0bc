pub mod cache;
pub mod composer;
pub mod loader;
pub mod platform;

pub use cache::{CacheKey, RenderVariant, RepresentationCache};
pub use composer::{Composer, SourceImage};
pub use loader::{SourceLoader, UrlLoader};
pub use platform::{BadgeStyle, Capabilities, Platform, ScalePolicy};

use anyhow::{Context, Result};
use base64::Engine;
use std::fmt;
use std::path::Path;

pub const APP_ICON_SVG: &str = include_str!("../../assets/icon.svg");

#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("failed to load icon source {url}: {reason}")]
    SourceLoad { url: String, reason: String },
    #[error("failed to decode icon source: {0}")]
    Decode(String),
    #[error("cannot allocate a {0}px canvas")]
    Canvas(u32),
    #[error("composition task was interrupted")]
    Interrupted,
}

/// A resolvable image reference: `file:`, `data:`, `http(s):` URL or a bare path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconSource(String);

impl IconSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Could not resolve icon path {}", path.display()))?;
        let url = url::Url::from_file_path(&absolute)
            .map_err(|_| anyhow::anyhow!("Icon path is not absolute: {}", absolute.display()))?;
        Ok(Self(url.into()))
    }

    /// The icon bundled with the binary, as a `data:` URL.
    pub fn app_icon() -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(APP_ICON_SVG);
        Self(format!("data:image/svg+xml;base64,{}", encoded))
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.starts_with("data:") {
            return f.write_str("data:…");
        }
        f.write_str(&self.0)
    }
}

/// One bitmap of a multi-resolution icon, straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    pub size: u32,
    pub scale_factor: f32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepresentationSet {
    representations: Vec<Representation>,
}

impl RepresentationSet {
    pub fn new(representations: Vec<Representation>) -> Self {
        Self { representations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Representation> {
        self.representations.iter()
    }

    pub fn len(&self) -> usize {
        self.representations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn sizes(&self) -> Vec<u32> {
        self.iter().map(|r| r.size).collect()
    }

    pub fn get(&self, size: u32) -> Option<&Representation> {
        self.iter().find(|r| r.size == size)
    }

    /// Smallest representation at least `size` pixels wide, else the largest one.
    pub fn best_fit(&self, size: u32) -> Option<&Representation> {
        self.iter()
            .filter(|r| r.size >= size)
            .min_by_key(|r| r.size)
            .or_else(|| self.iter().max_by_key(|r| r.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(sizes: &[u32]) -> RepresentationSet {
        RepresentationSet::new(
            sizes
                .iter()
                .map(|&size| Representation {
                    size,
                    scale_factor: 1.0,
                    rgba: vec![0; (size * size * 4) as usize],
                })
                .collect(),
        )
    }

    #[test]
    fn best_fit_prefers_smallest_sufficient_size() {
        let set = set_of(&[64, 48, 32, 16]);

        let cases = [(16, 16), (20, 32), (32, 32), (50, 64), (128, 64)];

        for (requested, expected) in cases {
            assert_eq!(set.best_fit(requested).unwrap().size, expected, "requested {}", requested);
        }
    }

    #[test]
    fn best_fit_on_empty_set_is_none() {
        assert!(RepresentationSet::default().best_fit(32).is_none());
    }

    #[test]
    fn app_icon_is_base64_svg_data_url() {
        let source = IconSource::app_icon();

        assert!(source.url().starts_with("data:image/svg+xml;base64,"));
        assert_eq!(source.to_string(), "data:…");
    }

    #[test]
    fn from_path_builds_file_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("icon.svg");

        let source = IconSource::from_path(&path).unwrap();

        assert!(source.url().starts_with("file://"));
        assert!(source.url().ends_with("/icon.svg"));
    }
}
