mod orbital_worker;

pub use orbital_worker::*;

#[cfg(test)]
mod orbital_worker_tests;
