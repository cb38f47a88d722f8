mod coordinates;
mod node;
mod link;
mod space;
mod source;

pub use coordinates::*;
pub use node::*;
pub use link::*;
pub use space::*;
pub use source::*;
