//! Target size computation for displayed photos.

use serde::Deserialize;

pub const DEFAULT_RESERVED_CHROME_HEIGHT: u32 = 250;
pub const DEFAULT_BOX_SIDE: u32 = 500;

/// How a photo's on-screen size is derived from its native size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum SizingPolicy {
    /// Honor the user's scale factor unless the result would not fit on the
    /// screen above the controls; then shrink to fit.
    ScreenBounded {
        #[serde(
            default = "SizingPolicy::default_reserved_chrome_height",
            rename = "reserved-chrome-height"
        )]
        reserved_chrome_height: u32,
    },
    /// Shrink (never enlarge) to fit a fixed box; the scale factor is ignored.
    FixedBox {
        #[serde(default = "SizingPolicy::default_box_side", rename = "max-width")]
        max_width: u32,
        #[serde(default = "SizingPolicy::default_box_side", rename = "max-height")]
        max_height: u32,
    },
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self::ScreenBounded {
            reserved_chrome_height: DEFAULT_RESERVED_CHROME_HEIGHT,
        }
    }
}

impl SizingPolicy {
    fn default_reserved_chrome_height() -> u32 {
        DEFAULT_RESERVED_CHROME_HEIGHT
    }

    fn default_box_side() -> u32 {
        DEFAULT_BOX_SIDE
    }

    /// Size to draw a `native` sized photo at, given the screen size.
    pub fn target_size(&self, native: (u32, u32), scale_factor: f64, screen: (u32, u32)) -> (u32, u32) {
        match *self {
            Self::ScreenBounded {
                reserved_chrome_height,
            } => compute_size(
                native.0,
                native.1,
                scale_factor,
                screen.0,
                screen.1,
                reserved_chrome_height,
            ),
            Self::FixedBox {
                max_width,
                max_height,
            } => fit_within_box(native.0, native.1, max_width, max_height),
        }
    }
}

/// Scale `native` by `scale_factor`, shrinking further when the result exceeds
/// `screen_width` x `(screen_height - reserved_chrome_height)`.
///
/// When a correction is needed a single factor
/// `min(screen_width / native_width, max_height / native_height)` replaces the
/// scale factor, so the aspect ratio is preserved. Both dimensions are truncated.
#[must_use]
pub fn compute_size(
    native_width: u32,
    native_height: u32,
    scale_factor: f64,
    screen_width: u32,
    screen_height: u32,
    reserved_chrome_height: u32,
) -> (u32, u32) {
    if native_width == 0 || native_height == 0 {
        return (0, 0);
    }
    let max_height = screen_height.saturating_sub(reserved_chrome_height);
    let (nw, nh) = (f64::from(native_width), f64::from(native_height));
    let target = (truncate(nw * scale_factor), truncate(nh * scale_factor));
    if target.0 <= screen_width && target.1 <= max_height {
        return target;
    }
    let f = (f64::from(screen_width) / nw).min(f64::from(max_height) / nh);
    (
        truncate(nw * f).min(screen_width),
        truncate(nh * f).min(max_height),
    )
}

/// Shrink `native` to fit a `max_width` x `max_height` box, preserving the
/// aspect ratio. Photos already inside the box keep their size.
#[must_use]
pub fn fit_within_box(native_width: u32, native_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if native_width <= max_width && native_height <= max_height {
        return (native_width, native_height);
    }
    let (nw, nh) = (f64::from(native_width), f64::from(native_height));
    let f = (f64::from(max_width) / nw).min(f64::from(max_height) / nh);
    (
        truncate(nw * f).clamp(1, max_width.max(1)),
        truncate(nh * f).clamp(1, max_height.max(1)),
    )
}

fn truncate(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}
