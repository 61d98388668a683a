//! Terminal-state snapshot export: one heat map image per channel.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempPath;

use super::{ChannelFailure, ExportError};
use crate::render::{Backend, Origin, RasterBackend, StorageError, Surface};
use crate::schema::SnapshotSettings;
use crate::system::{Channel, ChannelId, StateSystem, run};

/// Axis labels on every snapshot.
pub const X_LABEL: &str = "X-axis";
pub const Y_LABEL: &str = "Y-axis";

/// Evolves a system without intermediate rendering and writes the final
/// state of every declared channel to `{output_dir}/{prefix}_{suffix}.png`.
///
/// Negative values are clamped to zero before drawing. Each channel is drawn
/// on its own surface and saved to a temporary file in the output directory.
/// The images replace their targets only once every channel was saved, so a
/// failure leaves the previous set of images in place. Failures are collected
/// across all channels and reported together.
pub struct SnapshotExporter<B: Backend = RasterBackend> {
    backend: B,
    settings: SnapshotSettings,
}

impl SnapshotExporter<RasterBackend> {
    pub fn new(settings: SnapshotSettings) -> Self {
        Self::with_backend(RasterBackend, settings)
    }
}

impl<B: Backend> SnapshotExporter<B> {
    pub fn with_backend(backend: B, settings: SnapshotSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &SnapshotSettings {
        &self.settings
    }

    /// Path of the image for `channel`.
    pub fn path_for(&self, prefix: &str, channel: ChannelId) -> PathBuf {
        snapshot_path(&self.settings.output_dir, prefix, channel)
    }

    /// Evolve `system` for `n_steps` and write one image per channel.
    pub fn export<S>(
        &self,
        system: &mut S,
        prefix: &str,
        n_steps: usize,
    ) -> Result<SnapshotReport, ExportError>
    where
        S: StateSystem + ?Sized,
    {
        self.settings.validate()?;
        let dir = &self.settings.output_dir;
        fs::create_dir_all(dir).map_err(|source| ExportError::OutputDir {
            path: dir.clone(),
            source,
        })?;

        info!(
            "Exporting snapshot {} to {} ({} steps)",
            prefix,
            dir.display(),
            n_steps
        );
        run(system, n_steps)?;

        let time = system.time();
        let mut channels = system.channels();
        channels.sort_by_key(|c| c.id);
        if let Some(pair) = channels.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(ExportError::DuplicateChannel(pair[0].id));
        }

        let mut staged = Vec::with_capacity(channels.len());
        let mut failures = Vec::new();
        for channel in &channels {
            let path = self.path_for(prefix, channel.id);
            match self.stage_channel(channel, time) {
                Ok(tmp) => staged.push((channel.id, path, tmp)),
                Err(source) => {
                    warn!(
                        "Failed to render {} for {}: {}",
                        channel.id,
                        path.display(),
                        source
                    );
                    failures.push(ChannelFailure {
                        channel: channel.id,
                        path,
                        source,
                    });
                }
            }
        }
        if !failures.is_empty() {
            return Err(ExportError::Channels { failures });
        }

        let mut written = Vec::with_capacity(staged.len());
        for (id, path, tmp) in staged {
            match tmp.persist(&path) {
                Ok(()) => {
                    debug!("Wrote {} to {}", id, path.display());
                    written.push((id, path));
                }
                Err(e) => {
                    warn!(
                        "Failed to move {} into {}: {}",
                        id,
                        path.display(),
                        e.error
                    );
                    failures.push(ChannelFailure {
                        channel: id,
                        path,
                        source: StorageError::Io(e.error),
                    });
                }
            }
        }
        if !failures.is_empty() {
            return Err(ExportError::Channels { failures });
        }

        info!("Wrote {} snapshot images (t = {:.2})", written.len(), time);
        Ok(SnapshotReport { time, written })
    }

    /// Render `channel` into a temporary PNG next to its target.
    fn stage_channel(
        &self,
        channel: &Channel<'_>,
        time: f64,
    ) -> Result<TempPath, StorageError> {
        let tmp = tempfile::Builder::new()
            .prefix(".turing-viz")
            .suffix(".png")
            .tempfile_in(&self.settings.output_dir)?
            .into_temp_path();
        self.render_channel(channel, time, &tmp)?;
        Ok(tmp)
    }

    fn render_channel(
        &self,
        channel: &Channel<'_>,
        time: f64,
        path: &Path,
    ) -> Result<(), StorageError> {
        let mut surface = self.backend.new_surface(self.settings.figsize);
        let clamped = channel.grid.clamp_non_negative();
        surface.draw_heatmap(&clamped, self.settings.colormap, Origin::Lower);
        surface.set_title(&snapshot_title(channel.id, time));
        surface.set_xlabel(X_LABEL);
        surface.set_ylabel(Y_LABEL);
        surface.set_grid(false);
        surface.add_colorbar();
        surface.save(path, self.settings.dpi)
    }
}

/// `{output_dir}/{prefix}_{suffix}.png`
pub fn snapshot_path(output_dir: &Path, prefix: &str, channel: ChannelId) -> PathBuf {
    output_dir.join(format!("{}_{}.png", prefix, channel.suffix()))
}

/// Figure title: channel label and time to two decimals.
pub fn snapshot_title(channel: ChannelId, time: f64) -> String {
    format!("{}, t = {:.2}", channel.label(), time)
}

/// Evolve `system` and write per-channel PNGs into `output_dir` with the
/// default figure settings.
pub fn export_snapshot<S, P>(
    system: &mut S,
    output_dir: P,
    filename_prefix: &str,
    n_steps: usize,
) -> Result<SnapshotReport, ExportError>
where
    S: StateSystem + ?Sized,
    P: Into<PathBuf>,
{
    SnapshotExporter::new(SnapshotSettings::new(output_dir)).export(
        system,
        filename_prefix,
        n_steps,
    )
}

/// Images written by a snapshot export.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// Simulation time of the captured state.
    pub time: f64,
    /// Written files in channel order.
    pub written: Vec<(ChannelId, PathBuf)>,
}

impl SnapshotReport {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.written.iter().map(|(_, p)| p.as_path())
    }
}
