//! False-color maps from normalized scalars to RGB.

use serde::{Deserialize, Serialize};

/// Available colormaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// Blue → cyan → yellow → red.
    #[default]
    Jet,
    /// Black → white.
    Gray,
}

impl Colormap {
    /// Name as written into image metadata.
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Jet => "jet",
            Colormap::Gray => "gray",
        }
    }

    /// Map `t` in `[0, 1]` to RGB. Values outside the range are clamped,
    /// NaN maps to the low end.
    pub fn map(self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::Jet => [
                channel(jet_component(t, 0.75)),
                channel(jet_component(t, 0.5)),
                channel(jet_component(t, 0.25)),
            ],
            Colormap::Gray => {
                let v = channel(t);
                [v, v, v]
            }
        }
    }
}

/// Piecewise-linear jet ramp: a trapezoid of width 1.5 centered on `center`,
/// clipped to `[0, 1]`.
#[inline]
fn jet_component(t: f32, center: f32) -> f32 {
    (1.5 - 4.0 * (t - center).abs()).clamp(0.0, 1.0)
}

#[inline]
fn channel(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

/// Normalize `v` into `[0, 1]` against `(lo, hi)`.
///
/// A degenerate range maps everything to 0.
#[inline]
pub fn normalize(v: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span > 0.0 { (v - lo) / span } else { 0.0 }
}
