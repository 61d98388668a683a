//! Three-species reaction-diffusion model.
//!
//! Advances all channels together with explicit Euler steps. One
//! [`StateSystem::update`] runs `substeps` integration steps and advances the
//! model time by one unit.

use log::trace;

use super::laplacian_into;
use crate::render::{Colormap, Origin, Surface};
use crate::schema::ModelConfig;
use crate::system::{Channel, ChannelId, Grid, StateSystem, SystemError};

/// Reaction-diffusion state system over [`ChannelId::ALL`].
pub struct TuringModel {
    config: ModelConfig,
    /// Channel grids, empty until initialised.
    channels: Vec<Grid>,
    /// Scratch buffers reused every substep.
    laplacians: Vec<Vec<f32>>,
    next: Vec<Vec<f32>>,
    t: f64,
    step: u64,
}

impl TuringModel {
    /// Create an uninitialised model. Configuration is checked by
    /// [`initialise`](StateSystem::initialise).
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            channels: Vec::new(),
            laplacians: Vec::new(),
            next: Vec::new(),
            t: 0.0,
            step: 0,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_initialised(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Completed updates since the last initialisation.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Grid of one channel, if initialised.
    pub fn channel(&self, id: ChannelId) -> Option<&Grid> {
        self.channels.get(id.index())
    }

    fn integrate(&mut self) {
        let ModelConfig {
            dt,
            dx,
            diffusion,
            reaction,
            saturation,
            ..
        } = self.config;

        for (grid, lap) in self.channels.iter().zip(self.laplacians.iter_mut()) {
            laplacian_into(grid, dx, lap);
        }

        let cells = self.channels[0].len();
        for cell in 0..cells {
            let u = [
                self.channels[0].as_slice()[cell],
                self.channels[1].as_slice()[cell],
                self.channels[2].as_slice()[cell],
            ];
            for i in 0..3 {
                let linear: f32 = (0..3).map(|j| reaction[i][j] * u[j]).sum();
                let rate =
                    diffusion[i] * self.laplacians[i][cell] + linear - saturation * u[i].powi(3);
                self.next[i][cell] = u[i] + dt * rate;
            }
        }

        for (grid, next) in self.channels.iter_mut().zip(&self.next) {
            grid.as_mut_slice().copy_from_slice(next);
        }
    }

    fn check_finite(&self, step: u64) -> Result<(), SystemError> {
        for (id, grid) in ChannelId::ALL.iter().zip(&self.channels) {
            if let Some(i) = grid.first_non_finite() {
                let (x, y) = (i % grid.width(), i / grid.width());
                return Err(SystemError::Dynamics {
                    step,
                    channel: *id,
                    reason: format!("non-finite value {} at ({x}, {y})", grid.as_slice()[i]),
                });
            }
        }
        Ok(())
    }
}

impl StateSystem for TuringModel {
    fn initialise(&mut self) -> Result<(), SystemError> {
        self.config.validate()?;
        let (width, height) = (self.config.width, self.config.height);

        self.channels = self.config.seed.generate(width, height).to_vec();
        self.laplacians = vec![vec![0.0; width * height]; 3];
        self.next = vec![vec![0.0; width * height]; 3];
        self.t = 0.0;
        self.step = 0;

        // A seed can still produce garbage (e.g. overflowing amplitudes).
        if let Err(SystemError::Dynamics { channel, reason, .. }) = self.check_finite(0) {
            self.channels.clear();
            return Err(SystemError::initialization(format!(
                "seed produced invalid {channel}: {reason}"
            )));
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), SystemError> {
        if !self.is_initialised() {
            return Err(SystemError::initialization(
                "update called before initialise",
            ));
        }
        let step = self.step + 1;
        for _ in 0..self.config.substeps {
            self.integrate();
        }
        self.check_finite(step)?;

        self.step = step;
        self.t += 1.0;
        trace!("model step {} (t = {:.2})", self.step, self.t);
        Ok(())
    }

    fn draw(&self, target: &mut dyn Surface) {
        let id = self.config.display_channel;
        if let Some(grid) = self.channel(id) {
            target.draw_heatmap(grid, Colormap::Jet, Origin::Lower);
        }
        target.set_title(&format!("{}, t = {:.2}", id.label(), self.t));
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn channels(&self) -> Vec<Channel<'_>> {
        ChannelId::ALL
            .iter()
            .zip(&self.channels)
            .map(|(&id, grid)| Channel::new(id, grid))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Backend, FigureSize, RasterBackend};
    use crate::schema::{Pattern, Seed};
    use crate::system::run;

    fn small_config() -> ModelConfig {
        ModelConfig {
            width: 16,
            height: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_initialise_sets_time_and_shape() {
        let mut model = TuringModel::new(small_config());
        assert!(!model.is_initialised());
        model.initialise().unwrap();
        assert_eq!(model.time(), 0.0);
        let channels = model.channels();
        assert_eq!(channels.len(), 3);
        for (channel, id) in channels.iter().zip(ChannelId::ALL) {
            assert_eq!(channel.id, id);
            assert_eq!(channel.grid.shape(), (16, 16));
        }
    }

    #[test]
    fn test_update_before_initialise_fails() {
        let mut model = TuringModel::new(small_config());
        let err = model.update().unwrap_err();
        assert!(err.is_initialization());
    }

    #[test]
    fn test_invalid_config_fails_initialise() {
        let mut model = TuringModel::new(ModelConfig {
            height: 0,
            ..Default::default()
        });
        assert!(matches!(
            model.initialise(),
            Err(SystemError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_state_is_fixed_point() {
        let mut model = TuringModel::new(ModelConfig {
            seed: Seed::uniform(0.0),
            ..small_config()
        });
        run(&mut model, 5).unwrap();
        for channel in model.channels() {
            assert!(channel.grid.as_slice().iter().all(|&v| v == 0.0));
        }
        assert_eq!(model.time(), 5.0);
        assert_eq!(model.step_count(), 5);
    }

    #[test]
    fn test_shape_is_constant_across_updates() {
        let mut model = TuringModel::new(small_config());
        run(&mut model, 3).unwrap();
        for channel in model.channels() {
            assert_eq!(channel.grid.shape(), (16, 16));
        }
    }

    #[test]
    fn test_pure_diffusion_conserves_mass() {
        let mut model = TuringModel::new(ModelConfig {
            reaction: [[0.0; 3]; 3],
            saturation: 0.0,
            seed: Seed {
                baseline: 0.0,
                patterns: vec![Pattern::GaussianBlob {
                    center: (0.5, 0.5),
                    radius: 0.2,
                    amplitude: 1.0,
                    channel: ChannelId::TPlus,
                }],
            },
            ..small_config()
        });
        model.initialise().unwrap();
        let before = model.channel(ChannelId::TPlus).unwrap().sum();
        model.update().unwrap();
        let after = model.channel(ChannelId::TPlus).unwrap().sum();
        assert!((before - after).abs() / before < 1e-4);
    }

    #[test]
    fn test_overflow_raises_dynamics_error() {
        // Strong linear growth without saturation blows up quickly.
        let mut model = TuringModel::new(ModelConfig {
            reaction: [[50.0, 0.0, 0.0], [0.0; 3], [0.0; 3]],
            saturation: 0.0,
            seed: Seed::uniform(1.0),
            ..small_config()
        });
        let err = run(&mut model, 1000).unwrap_err();
        match err {
            SystemError::Dynamics { channel, step, .. } => {
                assert_eq!(channel, ChannelId::TPlus);
                assert!(step >= 1);
                assert_eq!(model.step_count(), step - 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_reinitialise_resets() {
        let mut model = TuringModel::new(small_config());
        run(&mut model, 4).unwrap();
        let first = model.channel(ChannelId::TP).unwrap().clone();
        model.initialise().unwrap();
        assert_eq!(model.time(), 0.0);
        run(&mut model, 4).unwrap();
        assert_eq!(model.channel(ChannelId::TP).unwrap(), &first);
    }

    #[test]
    fn test_draw_titles_display_channel() {
        let mut model = TuringModel::new(ModelConfig {
            display_channel: ChannelId::TMinus,
            ..small_config()
        });
        run(&mut model, 2).unwrap();
        let mut figure = RasterBackend.new_surface(FigureSize::default());
        model.draw(&mut figure);
        assert_eq!(figure.title(), Some("T^-, t = 2.00"));
        assert!(figure.value_range().is_some());
    }
}
