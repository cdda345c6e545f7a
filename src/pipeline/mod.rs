pub mod fetch;
pub mod filter;
pub mod reveal;
pub mod roster;
pub mod sort;
