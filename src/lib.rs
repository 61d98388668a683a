//! Turing patterns - Visualization harness for discrete-time state systems.
//!
//! A [`StateSystem`] owns some state that evolves in discrete steps, where
//! each step depends only on the previous one. This crate separates how that
//! state evolves from how it is drawn, and drives systems through two export
//! pipelines: an animated GIF of the whole evolution, or one PNG heat map per
//! channel of the final state.
//!
//! # Architecture
//!
//! - `system`: the [`StateSystem`] contract, grids and the evolution driver
//! - `render`: drawable surfaces, colormaps and the raster backend
//! - `export`: animation and snapshot pipelines
//! - `schema`: configuration types and seeding
//! - `compute`: the bundled three-species reaction-diffusion model
//!
//! # Example
//!
//! ```rust,no_run
//! use turing_viz::{
//!     compute::TuringModel,
//!     export::{export_animation, export_snapshot},
//!     schema::ModelConfig,
//! };
//!
//! let mut model = TuringModel::new(ModelConfig::default());
//!
//! // 30 steps as a looping GIF
//! let stats = export_animation(&mut model, "evolution.gif", 30)?;
//! println!("{}", stats);
//!
//! // Final state after 300 steps: plots/run_Tplus.png, run_Tp.png, run_Tminus.png
//! export_snapshot(&mut model, "plots", "run", 300)?;
//! # Ok::<(), turing_viz::export::ExportError>(())
//! ```

pub mod compute;
pub mod export;
pub mod render;
pub mod schema;
pub mod system;

// Re-export commonly used types
pub use compute::TuringModel;
pub use export::{AnimationExporter, ExportError, SnapshotExporter};
pub use schema::{ModelConfig, RunConfig};
pub use system::{ChannelId, Grid, StateSystem, SystemError};
