//! Scripted state system used by unit tests.

use super::{Channel, ChannelId, Grid, StateSystem, SystemError};
use crate::render::{Colormap, Origin, Surface};

/// Deterministic system with a constant fill value and optional failures.
pub struct ScriptedSystem {
    width: usize,
    height: usize,
    channel_count: usize,
    fill: f32,
    fail_at: Option<u64>,
    fail_init: bool,
    t: f64,
    step: u64,
    grids: Vec<Grid>,
    pub initialise_calls: usize,
    pub update_calls: usize,
}

impl ScriptedSystem {
    pub fn new(width: usize, height: usize, channel_count: usize) -> Self {
        Self {
            width,
            height,
            channel_count: channel_count.min(ChannelId::ALL.len()),
            fill: 0.0,
            fail_at: None,
            fail_init: false,
            t: 0.0,
            step: 0,
            grids: Vec::new(),
            initialise_calls: 0,
            update_calls: 0,
        }
    }

    /// Cells start as a checkerboard of `value` and `-value` and rise by 1.0
    /// per step.
    pub fn filled_with(mut self, value: f32) -> Self {
        self.fill = value;
        self
    }

    /// `update` fails on the given 1-based step.
    pub fn failing_at(mut self, step: u64) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

impl StateSystem for ScriptedSystem {
    fn initialise(&mut self) -> Result<(), SystemError> {
        self.initialise_calls += 1;
        if self.fail_init {
            return Err(SystemError::initialization("scripted failure"));
        }
        self.t = 0.0;
        self.step = 0;
        self.grids = (0..self.channel_count)
            .map(|c| {
                Grid::from_fn(self.width, self.height, |x, y| {
                    // Checkerboard with the fill value so clamping is visible.
                    if (x + y + c) % 2 == 0 { self.fill } else { -self.fill }
                })
            })
            .collect();
        Ok(())
    }

    fn update(&mut self) -> Result<(), SystemError> {
        self.update_calls += 1;
        let next = self.step + 1;
        if self.fail_at == Some(next) {
            return Err(SystemError::Dynamics {
                step: next,
                channel: ChannelId::TPlus,
                reason: "scripted overflow".into(),
            });
        }
        for grid in &mut self.grids {
            for v in grid.as_mut_slice() {
                *v += 1.0;
            }
        }
        self.step = next;
        self.t += 1.0;
        Ok(())
    }

    fn draw(&self, target: &mut dyn Surface) {
        if let Some(grid) = self.grids.first() {
            target.draw_heatmap(grid, Colormap::Jet, Origin::Lower);
        }
        target.set_title(&format!("t = {:.2}", self.t));
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn channels(&self) -> Vec<Channel<'_>> {
        ChannelId::ALL
            .iter()
            .zip(&self.grids)
            .map(|(&id, grid)| Channel::new(id, grid))
            .collect()
    }
}
