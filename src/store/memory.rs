use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::models::ride::{RideId, RideRecord};
use crate::store::{RideStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRideStore {
    rides: DashMap<RideId, RideRecord>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RideStore for MemoryRideStore {
    async fn put(&self, record: &RideRecord) -> Result<(), StoreError> {
        match self.rides.entry(record.ride_id.clone()) {
            Entry::Occupied(existing) if existing.get() == record => Ok(()),
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(record.ride_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, ride_id: &RideId) -> Result<Option<RideRecord>, StoreError> {
        Ok(self.rides.get(ride_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::MemoryRideStore;
    use crate::models::fleet::{FleetMember, Gender};
    use crate::models::ride::{RideId, RideRecord};
    use crate::store::{RideStore, StoreError};

    fn record(id: &str, user: &str) -> RideRecord {
        RideRecord {
            ride_id: RideId::new(id),
            user: user.to_string(),
            unicorn: FleetMember::new("Shadowfax", "White", Gender::Male),
            request_time: Utc::now(),
        }
    }

    #[tokio::test]
    async fn stores_and_reads_back_a_ride() {
        let store = MemoryRideStore::new();
        let ride = record("abc", "alice");

        store.put(&ride).await.unwrap();

        let loaded = store.get(&RideId::new("abc")).await.unwrap();
        assert_eq!(loaded, Some(ride));
    }

    #[tokio::test]
    async fn replaying_the_same_record_is_idempotent() {
        let store = MemoryRideStore::new();
        let ride = record("abc", "alice");

        store.put(&ride).await.unwrap();
        store.put(&ride).await.unwrap();

        assert_eq!(store.rides.len(), 1);
    }

    #[tokio::test]
    async fn conflicting_record_does_not_overwrite() {
        let store = MemoryRideStore::new();
        let original = record("abc", "alice");
        store.put(&original).await.unwrap();

        let err = store.put(&record("abc", "mallory")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(id) if id.as_str() == "abc"));

        let loaded = store.get(&RideId::new("abc")).await.unwrap().unwrap();
        assert_eq!(loaded.user, "alice");
    }

    #[tokio::test]
    async fn unknown_ride_is_none() {
        let store = MemoryRideStore::new();
        assert!(store.get(&RideId::new("nope")).await.unwrap().is_none());
    }
}
