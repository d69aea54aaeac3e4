pub mod fleet;
pub mod identity;
pub mod ride;
