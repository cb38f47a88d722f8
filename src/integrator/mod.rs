mod euler;

pub use euler::*;

#[cfg(test)]
mod euler_tests;
