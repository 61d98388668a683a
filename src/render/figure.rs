//! Raster figure: a heat map on one set of axes with an optional colorbar.

use std::io::Write;
use std::path::Path;

use image::{Rgba, RgbaImage};

use super::{Colormap, FigureSize, Origin, StorageError, Surface, normalize, write_atomic};
use crate::system::Grid;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXES_EDGE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRID_LINE: Rgba<u8> = Rgba([176, 176, 176, 255]);
/// Cells with non-finite values are left blank.
const MISSING: Rgba<u8> = BACKGROUND;

/// Subplot margins as fractions of the figure (left, right, bottom, top).
const SUBPLOT: (f32, f32, f32, f32) = (0.125, 0.9, 0.11, 0.88);
/// Share of the axes width taken by the colorbar, and the gap before it.
const COLORBAR_FRACTION: f32 = 0.15;
const COLORBAR_PAD: f32 = 0.05;
/// Grid lines per axis when the grid is visible.
const GRID_DIVISIONS: u32 = 4;

/// PNG text chunk keywords.
pub const TITLE_KEY: &str = "Title";
pub const XLABEL_KEY: &str = "XLabel";
pub const YLABEL_KEY: &str = "YLabel";
pub const COLORMAP_KEY: &str = "Colormap";

#[derive(Debug, Clone)]
struct Heatmap {
    grid: Grid,
    colormap: Colormap,
    origin: Origin,
    range: (f32, f32),
}

/// In-memory figure produced by [`RasterBackend`](super::RasterBackend).
#[derive(Debug, Clone)]
pub struct Figure {
    size: FigureSize,
    heatmap: Option<Heatmap>,
    title: Option<String>,
    xlabel: Option<String>,
    ylabel: Option<String>,
    grid_visible: bool,
    colorbar: bool,
}

/// Pixel rectangle, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Rect {
    fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}

impl Figure {
    pub fn new(size: FigureSize) -> Self {
        Self {
            size,
            heatmap: None,
            title: None,
            xlabel: None,
            ylabel: None,
            grid_visible: false,
            colorbar: false,
        }
    }

    pub fn size(&self) -> FigureSize {
        self.size
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn xlabel(&self) -> Option<&str> {
        self.xlabel.as_deref()
    }

    pub fn ylabel(&self) -> Option<&str> {
        self.ylabel.as_deref()
    }

    pub fn has_colorbar(&self) -> bool {
        self.colorbar
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Value range of the current heat map.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.heatmap.as_ref().map(|h| h.range)
    }

    /// Text chunks written alongside the pixels.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(title) = &self.title {
            entries.push((TITLE_KEY, title.clone()));
        }
        if let Some(label) = &self.xlabel {
            entries.push((XLABEL_KEY, label.clone()));
        }
        if let Some(label) = &self.ylabel {
            entries.push((YLABEL_KEY, label.clone()));
        }
        if let Some(heatmap) = &self.heatmap {
            entries.push((COLORMAP_KEY, heatmap.colormap.name().to_string()));
        }
        entries
    }

    /// Encode as PNG into `w`.
    pub fn write_png<W: Write>(&self, w: W, dpi: u32) -> Result<(), StorageError> {
        let image = self.rasterize(dpi);
        let mut encoder = png::Encoder::new(w, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = dots_per_meter(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        for (key, text) in self.metadata() {
            encoder.add_text_chunk(key.to_string(), text)?;
        }

        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
        Ok(())
    }

    /// Axes, heat map and colorbar rectangles for a `width × height` canvas.
    fn layout(&self, width: u32, height: u32) -> (Rect, Option<Rect>, Option<Rect>) {
        let (left, right, bottom, top) = SUBPLOT;
        let w = width as f32;
        let h = height as f32;

        let ax_x0 = w * left;
        let ax_y0 = h * (1.0 - top);
        let ax_y1 = h * (1.0 - bottom);
        let mut ax_x1 = w * right;

        let colorbar = if self.colorbar {
            let full = ax_x1 - ax_x0;
            ax_x1 = ax_x0 + full * (1.0 - COLORBAR_FRACTION - COLORBAR_PAD);
            let cb_x0 = ax_x1 + full * COLORBAR_PAD;
            let cb_width = ((ax_y1 - ax_y0) / 20.0).max(1.0);
            Some(Rect {
                x0: cb_x0 as u32,
                y0: ax_y0 as u32,
                x1: ((cb_x0 + cb_width) as u32).min(width),
                y1: ax_y1 as u32,
            })
        } else {
            None
        };

        let axes = Rect {
            x0: ax_x0 as u32,
            y0: ax_y0 as u32,
            x1: ax_x1 as u32,
            y1: ax_y1 as u32,
        };

        // Equal aspect: square cells centered in the axes.
        let image = self.heatmap.as_ref().and_then(|hm| {
            let (gw, gh) = hm.grid.shape();
            if gw == 0 || gh == 0 {
                return None;
            }
            let cell = (axes.width() as f32 / gw as f32).min(axes.height() as f32 / gh as f32);
            let iw = (cell * gw as f32).round().max(1.0) as u32;
            let ih = (cell * gh as f32).round().max(1.0) as u32;
            let x0 = axes.x0 + axes.width().saturating_sub(iw) / 2;
            let y0 = axes.y0 + axes.height().saturating_sub(ih) / 2;
            Some(Rect {
                x0,
                y0,
                x1: (x0 + iw).min(width),
                y1: (y0 + ih).min(height),
            })
        });

        (axes, image, colorbar)
    }
}

impl Surface for Figure {
    fn clear(&mut self) {
        *self = Figure::new(self.size);
    }

    fn draw_heatmap(&mut self, grid: &Grid, colormap: Colormap, origin: Origin) {
        let range = grid.min_max().unwrap_or((0.0, 0.0));
        self.heatmap = Some(Heatmap {
            grid: grid.clone(),
            colormap,
            origin,
            range,
        });
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_xlabel(&mut self, label: &str) {
        self.xlabel = Some(label.to_string());
    }

    fn set_ylabel(&mut self, label: &str) {
        self.ylabel = Some(label.to_string());
    }

    fn set_grid(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    fn add_colorbar(&mut self) {
        self.colorbar = true;
    }

    fn rasterize(&self, dpi: u32) -> RgbaImage {
        let (width, height) = self.size.pixels(dpi);
        let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);
        let (axes, image_rect, colorbar_rect) = self.layout(width, height);

        let frame = match (&self.heatmap, image_rect) {
            (Some(hm), Some(rect)) => {
                paint_heatmap(&mut img, hm, rect);
                rect
            }
            _ => axes,
        };

        if self.grid_visible {
            paint_grid_lines(&mut img, frame);
        }
        paint_outline(&mut img, frame);

        if let (Some(rect), Some(hm)) = (colorbar_rect, &self.heatmap) {
            paint_colorbar(&mut img, hm.colormap, rect);
            paint_outline(&mut img, rect);
        }

        img
    }

    fn save(&self, path: &Path, dpi: u32) -> Result<(), StorageError> {
        write_atomic(path, |w| self.write_png(w, dpi))?;
        Ok(())
    }
}

fn paint_heatmap(img: &mut RgbaImage, hm: &Heatmap, rect: Rect) {
    let (gw, gh) = hm.grid.shape();
    let (lo, hi) = hm.range;
    let rw = rect.width().max(1) as f32;
    let rh = rect.height().max(1) as f32;

    for py in rect.y0..rect.y1 {
        let row_from_top = (((py - rect.y0) as f32 + 0.5) / rh * gh as f32) as usize;
        let row_from_top = row_from_top.min(gh - 1);
        let y = match hm.origin {
            Origin::Lower => gh - 1 - row_from_top,
            Origin::Upper => row_from_top,
        };
        for px in rect.x0..rect.x1 {
            let x = ((((px - rect.x0) as f32 + 0.5) / rw * gw as f32) as usize).min(gw - 1);
            let v = hm.grid.get(x, y);
            let color = if v.is_finite() {
                let [r, g, b] = hm.colormap.map(normalize(v, lo, hi));
                Rgba([r, g, b, 255])
            } else {
                MISSING
            };
            img.put_pixel(px, py, color);
        }
    }
}

fn paint_colorbar(img: &mut RgbaImage, colormap: Colormap, rect: Rect) {
    let span = rect.height().saturating_sub(1).max(1) as f32;
    for py in rect.y0..rect.y1 {
        // High values at the top.
        let t = 1.0 - (py - rect.y0) as f32 / span;
        let [r, g, b] = colormap.map(t);
        for px in rect.x0..rect.x1 {
            img.put_pixel(px, py, Rgba([r, g, b, 255]));
        }
    }
}

fn paint_grid_lines(img: &mut RgbaImage, rect: Rect) {
    for i in 1..GRID_DIVISIONS {
        let x = rect.x0 + rect.width() * i / GRID_DIVISIONS;
        let y = rect.y0 + rect.height() * i / GRID_DIVISIONS;
        for py in rect.y0..rect.y1 {
            if x < img.width() {
                img.put_pixel(x, py, GRID_LINE);
            }
        }
        for px in rect.x0..rect.x1 {
            if y < img.height() {
                img.put_pixel(px, y, GRID_LINE);
            }
        }
    }
}

fn paint_outline(img: &mut RgbaImage, rect: Rect) {
    if rect.width() == 0 || rect.height() == 0 {
        return;
    }
    let right = rect.x1 - 1;
    let bottom = rect.y1 - 1;
    for px in rect.x0..rect.x1 {
        img.put_pixel(px, rect.y0, AXES_EDGE);
        img.put_pixel(px, bottom, AXES_EDGE);
    }
    for py in rect.y0..rect.y1 {
        img.put_pixel(rect.x0, py, AXES_EDGE);
        img.put_pixel(right, py, AXES_EDGE);
    }
}

/// Convert dots per inch to pixels per meter for the PNG pHYs chunk.
pub fn dots_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}
