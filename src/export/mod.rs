//! Export pipelines that drive a [`StateSystem`](crate::system::StateSystem)
//! and write what it draws.
//!
//! - [`AnimationExporter`]: every step becomes one frame of a looping GIF.
//! - [`SnapshotExporter`]: only the final state is kept, one PNG per channel.
//!
//! Both exporters check their settings first and own the surfaces they create
//! for the duration of a single call. Errors from the system abort the call
//! and are returned as [`ExportError::System`]; nothing half-written is left
//! at the target paths.

mod animation;
mod snapshot;

pub use animation::*;
pub use snapshot::*;

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::render::StorageError;
use crate::schema::ConfigError;
use crate::system::{ChannelId, SystemError};

/// A channel image that could not be written.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: ChannelId,
    pub path: PathBuf,
    pub source: StorageError,
}

impl fmt::Display for ChannelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.channel,
            self.path.display(),
            self.source
        )
    }
}

/// Errors from export calls.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    System(#[from] SystemError),
    #[error("Invalid export settings: {0}")]
    Settings(#[from] ConfigError),
    #[error("Failed to prepare output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", .path.display())]
    Storage { path: PathBuf, source: StorageError },
    #[error("{} channel image(s) failed: {}", .failures.len(), join_failures(.failures))]
    Channels { failures: Vec<ChannelFailure> },
    #[error("Channel {0} is declared more than once")]
    DuplicateChannel(ChannelId),
}

impl ExportError {
    /// True for failures writing output rather than evolving the system.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ExportError::OutputDir { .. }
                | ExportError::Storage { .. }
                | ExportError::Channels { .. }
        )
    }
}

fn join_failures(failures: &[ChannelFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
