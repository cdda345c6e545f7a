pub mod core;
pub mod roster;
pub mod seed;
pub mod survey;
