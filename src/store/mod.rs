pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ride::{RideId, RideRecord};

pub use memory::MemoryRideStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ride {0} already exists with different contents")]
    DuplicateKey(RideId),

    #[error("ride store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for ride records, keyed by [`RideId`].
#[async_trait]
pub trait RideStore: Send + Sync {
    /// Inserts `record` if its id is absent.
    ///
    /// Replaying an identical record is a success; a different record under an
    /// existing id fails with [`StoreError::DuplicateKey`] and leaves the stored
    /// one untouched.
    async fn put(&self, record: &RideRecord) -> Result<(), StoreError>;

    async fn get(&self, ride_id: &RideId) -> Result<Option<RideRecord>, StoreError>;
}
