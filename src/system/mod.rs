//! System module - The state system contract and the evolution driver.

mod driver;
mod grid;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::*;
pub use grid::*;
pub use state::*;
