//! Compute module - Numerics of the bundled reaction-diffusion model.

mod laplacian;
mod model;

pub use laplacian::*;
pub use model::*;
