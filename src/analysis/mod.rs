//! Structural analysis over a graph snapshot, independent of the tick loop.
mod clusters;
mod peripheral;

pub use clusters::*;
pub use peripheral::*;

#[cfg(test)]
mod peripheral_tests;
