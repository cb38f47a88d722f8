mod engine_state;
mod orbital_engine;

pub use engine_state::*;
pub use orbital_engine::*;
