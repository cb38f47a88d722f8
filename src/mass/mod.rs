mod mass_decay;

pub use mass_decay::*;

#[cfg(test)]
mod mass_decay_tests;
