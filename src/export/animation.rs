//! Animated time-evolution export.

use std::io::Write;
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use log::{debug, info};

use super::ExportError;
use crate::render::{Backend, RasterBackend, StorageError, Surface, write_atomic};
use crate::schema::AnimationSettings;
use crate::system::{Evolution, StateSystem, SystemError};

/// GIF quantizer speed (1 = best quality, 30 = fastest).
const GIF_SPEED: i32 = 10;

/// Records every step of a system as one frame of a looping GIF.
///
/// The initialised state is always the first frame, followed by one frame
/// per step: `n_steps = 0` yields a single-frame file and `n_steps = n`
/// yields `n + 1` frames. Frames are encoded as they are produced into a
/// temporary file that replaces `path` only once every step succeeded, so a
/// failing system leaves no output behind.
///
/// Usage:
/// ```ignore
/// let exporter = AnimationExporter::new(AnimationSettings::default());
/// let stats = exporter.export(&mut model, "evolution.gif", 30)?;
/// println!("{}", stats);
/// ```
pub struct AnimationExporter<B: Backend = RasterBackend> {
    backend: B,
    settings: AnimationSettings,
}

impl AnimationExporter<RasterBackend> {
    pub fn new(settings: AnimationSettings) -> Self {
        Self::with_backend(RasterBackend, settings)
    }
}

impl Default for AnimationExporter<RasterBackend> {
    fn default() -> Self {
        Self::new(AnimationSettings::default())
    }
}

impl<B: Backend> AnimationExporter<B> {
    pub fn with_backend(backend: B, settings: AnimationSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// Evolve `system` for `n_steps` and write the animation to `path`.
    pub fn export<S, P>(
        &self,
        system: &mut S,
        path: P,
        n_steps: usize,
    ) -> Result<AnimationStats, ExportError>
    where
        S: StateSystem + ?Sized,
        P: AsRef<Path>,
    {
        self.settings.validate()?;
        let path = path.as_ref();
        info!(
            "Exporting animation to {} ({} steps)",
            path.display(),
            n_steps
        );

        let frame_delay_ms = self.settings.frame_delay_ms();
        let mut sink = FrameSink::new(frame_delay_ms);
        let written = write_atomic(path, |w| {
            self.stream_frames(w, system, n_steps, &mut sink)
        });
        let total_bytes = written.map_err(|e| match e {
            StreamError::System(e) => ExportError::System(e),
            StreamError::Storage(source) => ExportError::Storage {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let stats = AnimationStats {
            frame_count: sink.frames,
            evolved_frames: sink.frames.saturating_sub(1),
            frame_delay_ms,
            width: sink.width,
            height: sink.height,
            total_bytes,
        };
        info!("Wrote {}: {}", path.display(), stats);
        Ok(stats)
    }

    /// Encode the initial frame plus one frame per step into `w`.
    fn stream_frames<S, W>(
        &self,
        w: W,
        system: &mut S,
        n_steps: usize,
        sink: &mut FrameSink,
    ) -> Result<(), StreamError>
    where
        S: StateSystem + ?Sized,
        W: Write,
    {
        let dpi = self.settings.dpi;
        let mut surface = self.backend.new_surface(self.settings.figsize);
        let mut encoder = GifEncoder::new_with_speed(w, GIF_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(StorageError::from)?;

        let mut evolution = Evolution::start(system, n_steps)?;
        evolution.system().draw(&mut surface);
        sink.encode(&mut encoder, surface.rasterize(dpi))?;

        while let Some(step) = evolution.advance() {
            let step = step?;
            surface.clear();
            step.system.draw(&mut surface);
            sink.encode(&mut encoder, surface.rasterize(dpi))?;
            debug!("Encoded frame {} (t = {:.2})", step.index, step.time);
        }

        Ok(())
    }
}

/// Failure while frames are being produced and encoded.
enum StreamError {
    System(SystemError),
    Storage(StorageError),
}

impl From<SystemError> for StreamError {
    fn from(e: SystemError) -> Self {
        StreamError::System(e)
    }
}

impl From<StorageError> for StreamError {
    fn from(e: StorageError) -> Self {
        StreamError::Storage(e)
    }
}

/// Counts encoded frames and remembers their size.
struct FrameSink {
    delay: Delay,
    frames: usize,
    width: u32,
    height: u32,
}

impl FrameSink {
    fn new(frame_delay_ms: u32) -> Self {
        Self {
            delay: Delay::from_numer_denom_ms(frame_delay_ms, 1),
            frames: 0,
            width: 0,
            height: 0,
        }
    }

    fn encode<W: Write>(
        &mut self,
        encoder: &mut GifEncoder<W>,
        buffer: RgbaImage,
    ) -> Result<(), StorageError> {
        if self.frames == 0 {
            (self.width, self.height) = buffer.dimensions();
        }
        encoder.encode_frame(Frame::from_parts(buffer, 0, 0, self.delay))?;
        self.frames += 1;
        Ok(())
    }
}

/// Evolve `system` and write a GIF with the default settings
/// (10 fps, 60 dpi).
pub fn export_animation<S, P>(
    system: &mut S,
    filename: P,
    n_steps: usize,
) -> Result<AnimationStats, ExportError>
where
    S: StateSystem + ?Sized,
    P: AsRef<Path>,
{
    AnimationExporter::default().export(system, filename, n_steps)
}

/// Statistics from an animation export.
#[derive(Debug, Clone)]
pub struct AnimationStats {
    /// Frames in the file, including the initial frame.
    pub frame_count: usize,
    /// Frames produced by steps.
    pub evolved_frames: usize,
    pub frame_delay_ms: u32,
    /// Frame size in pixels.
    pub width: u32,
    pub height: u32,
    /// File size in bytes.
    pub total_bytes: u64,
}

impl std::fmt::Display for AnimationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames ({} evolved), {}x{} px, {} ms/frame, {} bytes",
            self.frame_count,
            self.evolved_frames,
            self.width,
            self.height,
            self.frame_delay_ms,
            self.total_bytes
        )
    }
}
