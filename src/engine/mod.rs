pub mod assignment;
pub mod dispatch;
pub mod fleet;
pub mod random;
pub mod ride_id;
