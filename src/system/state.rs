//! The state system contract: how state evolves and how it is drawn.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Grid;
use crate::render::Surface;
use crate::schema::ConfigError;

/// Named state channels, in their fixed export order.
///
/// The file suffix of each channel is part of the snapshot output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// First channel, `T^+`.
    TPlus,
    /// Second channel, `T^p`.
    TP,
    /// Third channel, `T^-`.
    TMinus,
}

impl ChannelId {
    /// All channels in export order.
    pub const ALL: [ChannelId; 3] = [ChannelId::TPlus, ChannelId::TP, ChannelId::TMinus];

    /// Display label used in figure titles.
    pub fn label(self) -> &'static str {
        match self {
            ChannelId::TPlus => "T^+",
            ChannelId::TP => "T^p",
            ChannelId::TMinus => "T^-",
        }
    }

    /// Suffix used in snapshot file names (`{prefix}_{suffix}.png`).
    pub fn suffix(self) -> &'static str {
        match self {
            ChannelId::TPlus => "Tplus",
            ChannelId::TP => "Tp",
            ChannelId::TMinus => "Tminus",
        }
    }

    /// Zero-based position in [`ChannelId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Borrowed view of one declared channel.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    pub id: ChannelId,
    pub grid: &'a Grid,
}

impl<'a> Channel<'a> {
    pub fn new(id: ChannelId, grid: &'a Grid) -> Self {
        Self { id, grid }
    }
}

/// A Markovian simulation: state evolves in discrete steps and each step
/// depends only on the previous state.
///
/// Implementors own their time `t` and channel grids. The grid shape is fixed
/// by [`initialise`](StateSystem::initialise) and `t` only moves forward, by
/// exactly one unit per [`update`](StateSystem::update).
pub trait StateSystem {
    /// Set `t = 0` and populate every channel.
    ///
    /// Calling it again resets the system.
    fn initialise(&mut self) -> Result<(), SystemError>;

    /// Advance by one step, mutating state in place.
    fn update(&mut self) -> Result<(), SystemError>;

    /// Draw the current state onto `target`. Must not mutate state.
    fn draw(&self, target: &mut dyn Surface);

    /// Current simulation time.
    fn time(&self) -> f64;

    /// Declared channels in declaration order.
    fn channels(&self) -> Vec<Channel<'_>>;
}

/// Errors raised by state systems.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("Initialization failed: {reason}")]
    Initialization { reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Dynamics failed at step {step} in channel {channel}: {reason}")]
    Dynamics {
        step: u64,
        channel: ChannelId,
        reason: String,
    },
}

impl SystemError {
    pub fn initialization(reason: impl Into<String>) -> Self {
        SystemError::Initialization {
            reason: reason.into(),
        }
    }

    /// True for errors raised before the first step could run.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            SystemError::Initialization { .. } | SystemError::InvalidConfig(_)
        )
    }
}
