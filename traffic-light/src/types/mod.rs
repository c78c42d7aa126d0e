mod phase;
mod status;

pub use phase::*;
pub use status::*;
