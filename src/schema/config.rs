//! Configuration types for models and exports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Seed;
use crate::render::{Colormap, FigureSize};
use crate::system::ChannelId;

/// Parameters of the three-species reaction-diffusion model.
///
/// Each channel evolves as
/// `du_i/dt = D_i ∇²u_i + Σ_j R_ij u_j - s u_i³`
/// integrated with explicit Euler steps of size `dt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Integration time step.
    pub dt: f32,
    /// Cell spacing.
    #[serde(default = "default_dx")]
    pub dx: f32,
    /// Euler substeps per model update.
    #[serde(default = "default_substeps")]
    pub substeps: usize,
    /// Diffusion coefficient per channel, in [`ChannelId::ALL`] order.
    pub diffusion: [f32; 3],
    /// Linear reaction matrix, row `i` gives the contributions to channel `i`.
    pub reaction: [[f32; 3]; 3],
    /// Cubic saturation strength.
    #[serde(default)]
    pub saturation: f32,
    /// Initial condition.
    #[serde(default)]
    pub seed: Seed,
    /// Channel drawn in animations.
    #[serde(default = "default_display_channel")]
    pub display_channel: ChannelId,
}

fn default_dx() -> f32 {
    1.0
}

fn default_substeps() -> usize {
    10
}

fn default_display_channel() -> ChannelId {
    ChannelId::TPlus
}

impl Default for ModelConfig {
    fn default() -> Self {
        // T^+ activates, T^- inhibits and diffuses fast, T^p follows T^+.
        Self {
            width: 100,
            height: 100,
            dt: 0.02,
            dx: 1.0,
            substeps: 10,
            diffusion: [1.0, 1.0, 10.0],
            reaction: [[1.0, 0.0, -1.0], [0.5, -0.5, 0.0], [2.0, 0.0, -1.5]],
            saturation: 1.0,
            seed: Seed::default(),
            display_channel: ChannelId::TPlus,
        }
    }
}

impl ModelConfig {
    /// Largest stable explicit step for the five-point Laplacian.
    pub fn max_stable_dt(&self) -> f32 {
        let d_max = self.diffusion.iter().copied().fold(0.0f32, f32::max);
        if d_max > 0.0 {
            self.dx * self.dx / (4.0 * d_max)
        } else {
            f32::INFINITY
        }
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep);
        }
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(ConfigError::InvalidSpacing);
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        for (id, &d) in ChannelId::ALL.iter().zip(&self.diffusion) {
            if !(d.is_finite() && d >= 0.0) {
                return Err(ConfigError::InvalidDiffusion { channel: *id });
            }
        }
        if self.reaction.iter().flatten().any(|r| !r.is_finite()) || !self.saturation.is_finite()
        {
            return Err(ConfigError::NonFiniteParameter);
        }
        let limit = self.max_stable_dt();
        if self.dt > limit {
            return Err(ConfigError::UnstableTimeStep {
                dt: self.dt,
                limit,
            });
        }
        for pattern in &self.seed.patterns {
            if let super::Pattern::GaussianNoise { sigma, .. } = pattern {
                if !(sigma.is_finite() && *sigma >= 0.0) {
                    return Err(ConfigError::InvalidSeed);
                }
            }
        }
        Ok(())
    }
}

/// Largest frame side in pixels. GIF stores dimensions as 16-bit values.
pub const MAX_FIGURE_PIXELS: u32 = u16::MAX as u32;

/// GIF frame delays are stored in hundredths of a second.
pub const FRAME_DELAY_STEP_MS: u32 = 10;

/// Check a figure size and resolution before anything is drawn.
fn validate_figure(figsize: FigureSize, dpi: u32) -> Result<(), ConfigError> {
    let FigureSize { width, height } = figsize;
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(ConfigError::InvalidFigureSize { width, height });
    }
    if dpi == 0 {
        return Err(ConfigError::InvalidDpi);
    }
    let limit = MAX_FIGURE_PIXELS as f32;
    let (px_w, px_h) = (width * dpi as f32, height * dpi as f32);
    if px_w.round() > limit || px_h.round() > limit {
        return Err(ConfigError::FigureTooLarge {
            width: px_w,
            height: px_h,
            max: MAX_FIGURE_PIXELS,
        });
    }
    Ok(())
}

/// Settings for animated time-evolution export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Figure size in inches.
    #[serde(default)]
    pub figsize: FigureSize,
    /// Output resolution.
    pub dpi: u32,
    /// Playback rate. Takes precedence over `interval_ms`.
    pub fps: Option<u32>,
    /// Display interval per frame, used when `fps` is unset.
    pub interval_ms: u32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            figsize: FigureSize::default(),
            dpi: 60,
            fps: Some(10),
            interval_ms: 20,
        }
    }
}

impl AnimationSettings {
    /// Delay between frames in the written file.
    ///
    /// Rounded to the nearest [`FRAME_DELAY_STEP_MS`] and never shorter than
    /// one step, so the value reported is the one stored in the GIF.
    pub fn frame_delay_ms(&self) -> u32 {
        let ms = match self.fps {
            Some(fps) if fps > 0 => 1000 / fps,
            _ => self.interval_ms,
        };
        let steps = ms.saturating_add(FRAME_DELAY_STEP_MS / 2) / FRAME_DELAY_STEP_MS;
        steps.max(1) * FRAME_DELAY_STEP_MS
    }

    /// Validate figure size and resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_figure(self.figsize, self.dpi)
    }
}

/// Settings for terminal-state snapshot export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Directory the images are written to. Created if missing.
    pub output_dir: PathBuf,
    #[serde(default = "default_snapshot_figsize")]
    pub figsize: FigureSize,
    #[serde(default = "default_snapshot_dpi")]
    pub dpi: u32,
    #[serde(default)]
    pub colormap: Colormap,
}

fn default_snapshot_figsize() -> FigureSize {
    FigureSize::new(6.0, 6.0)
}

fn default_snapshot_dpi() -> u32 {
    100
}

impl SnapshotSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            figsize: default_snapshot_figsize(),
            dpi: default_snapshot_dpi(),
            colormap: Colormap::Jet,
        }
    }

    /// Validate figure size and resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_figure(self.figsize, self.dpi)
    }
}

/// Everything the CLI needs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub animation: AnimationSettings,
    pub snapshot: SnapshotSettings,
    /// Steps used when none is given on the command line.
    #[serde(default = "default_steps")]
    pub steps: usize,
}

fn default_steps() -> usize {
    30
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            animation: AnimationSettings::default(),
            snapshot: SnapshotSettings::new("output"),
            steps: default_steps(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Time step must be positive")]
    InvalidTimeStep,
    #[error("Cell spacing must be positive")]
    InvalidSpacing,
    #[error("Substeps per update must be non-zero")]
    InvalidSubsteps,
    #[error("Diffusion coefficient for {channel} must be non-negative")]
    InvalidDiffusion { channel: ChannelId },
    #[error("Reaction and saturation parameters must be finite")]
    NonFiniteParameter,
    #[error("Time step {dt} exceeds explicit stability limit {limit}")]
    UnstableTimeStep { dt: f32, limit: f32 },
    #[error("Seed noise parameters must be finite and non-negative")]
    InvalidSeed,
    #[error("Figure size {width}x{height} in must be finite and positive")]
    InvalidFigureSize { width: f32, height: f32 },
    #[error("Resolution (dpi) must be non-zero")]
    InvalidDpi,
    #[error("Figure of {width}x{height} px exceeds {max} px per side")]
    FigureTooLarge { width: f32, height: f32, max: u32 },
}
