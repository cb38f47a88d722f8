mod forces_2d;

pub use forces_2d::*;
