mod constants;
mod constants_config;
pub mod errors;
mod clock;

pub use constants::*;
pub use constants_config::*;
pub use errors::OrbitalError;
pub use clock::now_ms;
