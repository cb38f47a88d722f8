mod barnes_hut;

pub use barnes_hut::*;
