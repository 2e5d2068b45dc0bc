use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Macos,
    Other,
}

/// How a platform wants the unread badge presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    /// Badge is drawn into the window icon bitmap.
    Composite,
    /// Main icon stays plain; the badge goes to a separate overlay icon.
    Overlay,
    /// The OS draws badges itself; no bitmaps are generated.
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalePolicy {
    /// Every representation uses the display's scale factor.
    Display,
    /// Scale factor is `size / base`, making `base` pixels the 1x bitmap.
    RelativeTo(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities {
    pub badge_style: BadgeStyle,
    pub icon_sizes: &'static [u32],
    pub overlay_size: u32,
    pub scale: ScalePolicy,
    pub flashes_on_unread: bool,
}

const LINUX: Capabilities = Capabilities {
    badge_style: BadgeStyle::Composite,
    icon_sizes: &[64, 48, 40, 32, 24, 20, 16],
    overlay_size: 32,
    scale: ScalePolicy::Display,
    flashes_on_unread: false,
};

const WINDOWS: Capabilities = Capabilities {
    badge_style: BadgeStyle::Overlay,
    icon_sizes: &[256, 64, 48, 40, 32, 24, 20, 16],
    overlay_size: 32,
    scale: ScalePolicy::RelativeTo(32),
    flashes_on_unread: true,
};

const NATIVE: Capabilities = Capabilities {
    badge_style: BadgeStyle::Native,
    icon_sizes: &[],
    overlay_size: 32,
    scale: ScalePolicy::Display,
    flashes_on_unread: false,
};

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else {
            Platform::Other
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Platform::Linux => LINUX,
            Platform::Windows => WINDOWS,
            Platform::Macos | Platform::Other => NATIVE,
        }
    }
}

impl ScalePolicy {
    pub fn scale_factor(self, size: u32, display_scale: f32) -> f32 {
        match self {
            ScalePolicy::Display => display_scale,
            ScalePolicy::RelativeTo(base) => size as f32 / base as f32,
        }
    }
}
