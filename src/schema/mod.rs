//! Schema module - Configuration and seeding types.

mod config;
mod seed;

pub use config::*;
pub use seed::*;
