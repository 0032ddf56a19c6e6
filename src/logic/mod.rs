pub mod due;
pub mod listing;
pub mod rules;

pub use due::plants_needing;
pub use listing::format_plants;
