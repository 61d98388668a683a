//! Evolution driver - runs the step loop of a [`StateSystem`].
//!
//! The loop is exposed two ways:
//!
//! - [`run`] / [`run_with_callback`]: run to completion, optionally observing
//!   every step.
//! - [`Evolution`]: a lazy, finite, non-restartable sequence of steps that an
//!   exporter pulls from synchronously.

use super::{StateSystem, SystemError};

/// Initialise `system` and update it exactly `n_steps` times.
pub fn run<S: StateSystem + ?Sized>(system: &mut S, n_steps: usize) -> Result<(), SystemError> {
    run_with_callback(system, n_steps, |_, _| {})
}

/// Like [`run`], invoking `on_step(index, system)` after every update.
///
/// `index` is the 1-based number of the step just completed. The first error
/// from `initialise` or `update` stops the loop and is returned unmodified.
pub fn run_with_callback<S, F>(
    system: &mut S,
    n_steps: usize,
    mut on_step: F,
) -> Result<(), SystemError>
where
    S: StateSystem + ?Sized,
    F: FnMut(usize, &S),
{
    let mut evolution = Evolution::start(system, n_steps)?;
    while let Some(step) = evolution.advance() {
        let step = step?;
        on_step(step.index, step.system);
    }
    Ok(())
}

/// View of the system right after one step.
pub struct StepView<'s, S: ?Sized> {
    /// 1-based step number.
    pub index: usize,
    /// Simulation time after the step.
    pub time: f64,
    pub system: &'s S,
}

/// A running evolution of a borrowed system.
///
/// Usage:
/// ```ignore
/// let mut evolution = Evolution::start(&mut system, 100)?;
/// while let Some(step) = evolution.advance() {
///     let step = step?;
///     step.system.draw(&mut surface);
/// }
/// ```
pub struct Evolution<'a, S: ?Sized> {
    system: &'a mut S,
    total: usize,
    completed: usize,
    halted: bool,
}

impl<'a, S: StateSystem + ?Sized> Evolution<'a, S> {
    /// Initialise `system` and prepare `n_steps` updates.
    pub fn start(system: &'a mut S, n_steps: usize) -> Result<Self, SystemError> {
        system.initialise()?;
        Ok(Self {
            system,
            total: n_steps,
            completed: 0,
            halted: false,
        })
    }

    /// Perform the next update.
    ///
    /// Returns `None` once all steps are done or after an error was yielded.
    pub fn advance(&mut self) -> Option<Result<StepView<'_, S>, SystemError>> {
        if self.halted || self.completed >= self.total {
            return None;
        }
        if let Err(e) = self.system.update() {
            self.halted = true;
            return Some(Err(e));
        }
        self.completed += 1;
        Some(Ok(StepView {
            index: self.completed,
            time: self.system.time(),
            system: &*self.system,
        }))
    }

    /// Current state of the system.
    pub fn system(&self) -> &S {
        &*self.system
    }

    /// Steps completed so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Steps still to run (zero after an error).
    pub fn remaining(&self) -> usize {
        if self.halted {
            0
        } else {
            self.total - self.completed
        }
    }
}
