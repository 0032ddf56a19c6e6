pub mod care;
pub mod plant;

pub use care::*;
pub use plant::*;
