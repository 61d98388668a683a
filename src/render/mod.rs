//! Render module - Drawable surfaces and the raster backend.
//!
//! A [`Surface`] is the opaque drawing target handed to
//! [`StateSystem::draw`](crate::system::StateSystem::draw). Exporters obtain
//! surfaces from a [`Backend`] and own them for the duration of one export
//! call; dropping a surface releases it.
//!
//! [`RasterBackend`] produces [`Figure`]s that rasterize into RGBA buffers
//! and save as PNG. Titles and axis labels are carried as PNG text chunks
//! rather than drawn glyphs.

mod colormap;
mod figure;

pub use colormap::*;
pub use figure::*;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::system::Grid;

/// Vertical placement of row 0 of a heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Row 0 at the bottom; the vertical axis increases upward.
    #[default]
    Lower,
    /// Row 0 at the top.
    Upper,
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: f32,
    pub height: f32,
}

impl FigureSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel dimensions at `dpi`, at least 1×1.
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let px = |inches: f32| ((inches * dpi as f32).round() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::new(6.4, 4.8)
    }
}

/// A drawable figure with a single set of axes.
pub trait Surface {
    /// Remove everything drawn so far. Size is kept.
    fn clear(&mut self);

    /// Draw `grid` as a false-color heat map, replacing any previous one.
    fn draw_heatmap(&mut self, grid: &Grid, colormap: Colormap, origin: Origin);

    fn set_title(&mut self, title: &str);

    fn set_xlabel(&mut self, label: &str);

    fn set_ylabel(&mut self, label: &str);

    /// Toggle grid lines over the axes.
    fn set_grid(&mut self, visible: bool);

    /// Attach a color scale legend for the current heat map.
    fn add_colorbar(&mut self);

    /// Render to pixels at `dpi`.
    fn rasterize(&self, dpi: u32) -> RgbaImage;

    /// Render and write an image file at `dpi`.
    fn save(&self, path: &Path, dpi: u32) -> Result<(), StorageError>;
}

/// Factory for surfaces.
pub trait Backend {
    type Surface: Surface;

    fn new_surface(&self, size: FigureSize) -> Self::Surface;
}

/// Backend producing in-memory raster [`Figure`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl Backend for RasterBackend {
    type Surface = Figure;

    fn new_surface(&self, size: FigureSize) -> Figure {
        Figure::new(size)
    }
}

/// Errors writing rendered output.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to move output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Write `path` through a temporary file in the same directory.
///
/// The target is only replaced once `write` succeeds, so a failed write never
/// leaves a truncated file or clobbers an older one. Errors from `write` are
/// returned unchanged. Returns the bytes written.
pub(crate) fn write_atomic<F, E>(path: &Path, write: F) -> Result<u64, E>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), E>,
    E: From<StorageError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".turing-viz")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(StorageError::from)?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush().map_err(StorageError::from)?;
    }

    let bytes = tmp.as_file().metadata().map_err(StorageError::from)?.len();
    tmp.persist(path).map_err(StorageError::from)?;
    Ok(bytes)
}
