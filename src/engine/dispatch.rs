use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::engine::assignment::Selector;
use crate::engine::ride_id::RideIdGenerator;
use crate::error::AppError;
use crate::models::identity::CallerIdentity;
use crate::models::ride::{DispatchedRide, RideId, RideRecord, RideRequest};
use crate::observability::metrics::Metrics;
use crate::store::RideStore;

/// Progress of a single ride request through the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Received,
    Authorized,
    Validated,
    Assigned,
    Persisted,
    Responded,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchStage::Received => "received",
            DispatchStage::Authorized => "authorized",
            DispatchStage::Validated => "validated",
            DispatchStage::Assigned => "assigned",
            DispatchStage::Persisted => "persisted",
            DispatchStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

struct Failure {
    stage: DispatchStage,
    error: AppError,
}

impl Failure {
    fn at(stage: DispatchStage) -> impl FnOnce(AppError) -> Failure {
        move |error| Failure { stage, error }
    }
}

pub struct Dispatcher {
    selector: Arc<dyn Selector>,
    ride_ids: RideIdGenerator,
    store: Arc<dyn RideStore>,
    store_timeout: Duration,
    metrics: Metrics,
}

impl Dispatcher {
    pub fn new(
        selector: Arc<dyn Selector>,
        ride_ids: RideIdGenerator,
        store: Arc<dyn RideStore>,
        store_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            selector,
            ride_ids,
            store,
            store_timeout,
            metrics,
        }
    }

    /// Handles one ride request end to end.
    ///
    /// Exactly one record is written when this returns `Ok`; no record is
    /// written on any error path before persistence.
    pub async fn dispatch(
        &self,
        identity: Option<&CallerIdentity>,
        body: &[u8],
        correlation_id: &str,
    ) -> Result<DispatchedRide, AppError> {
        let start = Instant::now();
        let result = self.run(identity, body, correlation_id).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(ride) => {
                self.metrics.record_outcome("success", elapsed);
                self.metrics
                    .unicorn_assignments_total
                    .with_label_values(&[ride.unicorn.name.as_str()])
                    .inc();
                info!(
                    correlation_id,
                    ride_id = %ride.ride_id,
                    rider = %ride.rider,
                    unicorn = %ride.unicorn.name,
                    stage = %DispatchStage::Responded,
                    "ride dispatched"
                );
                Ok(ride)
            }
            Err(Failure { stage, error: err }) => {
                self.metrics.record_outcome(err.kind(), elapsed);
                match &err {
                    AppError::PersistenceFailure(_) | AppError::Internal(_) => {
                        error!(correlation_id, %stage, error = %err, "ride dispatch failed")
                    }
                    _ => warn!(correlation_id, %stage, error = %err, "ride request rejected"),
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        identity: Option<&CallerIdentity>,
        body: &[u8],
        correlation_id: &str,
    ) -> Result<DispatchedRide, Failure> {
        let caller = identity
            .ok_or(AppError::Unauthenticated)
            .map_err(Failure::at(DispatchStage::Received))?;

        debug!(
            correlation_id,
            stage = %DispatchStage::Authorized,
            rider = caller.username(),
            "caller identified"
        );

        let request = parse_request(body).map_err(Failure::at(DispatchStage::Authorized))?;
        debug!(correlation_id, stage = %DispatchStage::Validated, "ride request parsed");

        let ride_id = self.ride_ids.generate();
        let unicorn = self.selector.select_for(&request.pickup_location);
        let record = RideRecord {
            ride_id,
            user: caller.username().to_string(),
            unicorn,
            request_time: Utc::now(),
        };
        debug!(
            correlation_id,
            stage = %DispatchStage::Assigned,
            ride_id = %record.ride_id,
            unicorn = %record.unicorn.name,
            "unicorn assigned"
        );

        self.persist(&record)
            .await
            .map_err(Failure::at(DispatchStage::Assigned))?;
        debug!(
            correlation_id,
            stage = %DispatchStage::Persisted,
            ride_id = %record.ride_id,
            "ride stored"
        );

        Ok(DispatchedRide::from(&record))
    }

    async fn persist(&self, record: &RideRecord) -> Result<(), AppError> {
        let timer = self.metrics.store_write_seconds.start_timer();
        let outcome = timeout(self.store_timeout, self.store.put(record)).await;
        timer.observe_duration();

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(AppError::PersistenceFailure(err.to_string())),
            Err(_) => Err(AppError::PersistenceFailure(format!(
                "store write timed out after {} ms",
                self.store_timeout.as_millis()
            ))),
        }
    }

    /// Fetches a ride owned by the caller. Rides of other users are reported
    /// as missing.
    pub async fn lookup(
        &self,
        identity: Option<&CallerIdentity>,
        ride_id: &RideId,
        correlation_id: &str,
    ) -> Result<RideRecord, AppError> {
        let caller = identity.ok_or(AppError::Unauthenticated)?;

        let record = timeout(self.store_timeout, self.store.get(ride_id))
            .await
            .map_err(|_| {
                error!(
                    correlation_id,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "ride lookup timed out"
                );
                AppError::PersistenceFailure("store read timed out".to_string())
            })?
            .map_err(|err| {
                error!(correlation_id, error = %err, "ride lookup failed");
                AppError::PersistenceFailure(err.to_string())
            })?;

        match record {
            Some(record) if record.user == caller.username() => Ok(record),
            _ => Err(AppError::NotFound(format!("ride {ride_id} not found"))),
        }
    }
}

fn parse_request(body: &[u8]) -> Result<RideRequest, AppError> {
    let request: RideRequest = serde_json::from_slice(body)
        .map_err(|err| AppError::InvalidInput(format!("malformed ride request: {err}")))?;

    if !request.pickup_location.is_in_range() {
        return Err(AppError::InvalidInput(
            "PickupLocation is outside valid latitude/longitude bounds".to_string(),
        ));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::Dispatcher;
    use crate::engine::assignment::UniformSelector;
    use crate::engine::fleet::FleetRegistry;
    use crate::engine::random::SeededRandom;
    use crate::engine::ride_id::RideIdGenerator;
    use crate::error::AppError;
    use crate::models::identity::CallerIdentity;
    use crate::models::ride::{RideId, RideRecord};
    use crate::observability::metrics::Metrics;
    use crate::store::{MemoryRideStore, RideStore, StoreError};

    const BODY: &[u8] = br#"{"PickupLocation":{"Latitude":47.6,"Longitude":-122.3}}"#;

    #[derive(Default)]
    struct RecordingStore {
        puts: AtomicUsize,
        records: Mutex<Vec<RideRecord>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl RideStore for RecordingStore {
        async fn put(&self, record: &RideRecord) -> Result<(), StoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(StoreError::Unavailable("table offline".to_string()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn get(&self, _ride_id: &RideId) -> Result<Option<RideRecord>, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(None)
        }
    }

    fn dispatcher(store: Arc<dyn RideStore>) -> Dispatcher {
        let fleet = Arc::new(FleetRegistry::default());
        Dispatcher::new(
            Arc::new(UniformSelector::new(fleet, Arc::new(SeededRandom::new(1)))),
            RideIdGenerator::new(Arc::new(SeededRandom::new(2))),
            store,
            Duration::from_millis(100),
            Metrics::new(),
        )
    }

    fn alice() -> CallerIdentity {
        CallerIdentity::new("alice").unwrap()
    }

    #[tokio::test]
    async fn successful_dispatch_persists_exactly_one_matching_record() {
        let store = Arc::new(RecordingStore::default());
        let ride = dispatcher(store.clone())
            .dispatch(Some(&alice()), BODY, "req-1")
            .await
            .unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
        let records = store.records.lock().unwrap();
        assert_eq!(records[0].ride_id, ride.ride_id);
        assert_eq!(records[0].user, "alice");
        assert_eq!(records[0].unicorn, ride.unicorn);
        assert_eq!(ride.rider, "alice");
        assert_eq!(ride.eta, "30 seconds");
    }

    #[tokio::test]
    async fn missing_identity_never_touches_the_store() {
        let store = Arc::new(RecordingStore::default());
        let err = dispatcher(store.clone())
            .dispatch(None, BODY, "req-2")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthenticated));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_body_never_touches_the_store() {
        let store = Arc::new(RecordingStore::default());
        let err = dispatcher(store.clone())
            .dispatch(Some(&alice()), br#"{"Dropoff":{}}"#, "req-3")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_error_becomes_persistence_failure() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });
        let err = dispatcher(store)
            .dispatch(Some(&alice()), BODY, "req-4")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailure(_)));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let store = Arc::new(RecordingStore {
            delay: Some(Duration::from_secs(5)),
            ..RecordingStore::default()
        });
        let err = dispatcher(store)
            .dispatch(Some(&alice()), BODY, "req-5")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailure(msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let store = Arc::new(RecordingStore {
            delay: Some(Duration::from_secs(5)),
            ..RecordingStore::default()
        });
        let err = dispatcher(store)
            .lookup(Some(&alice()), &RideId::new("abc"), "req-9")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PersistenceFailure(msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn lookup_hides_rides_of_other_users() {
        let store = Arc::new(MemoryRideStore::new());
        let dispatcher = dispatcher(store);
        let ride = dispatcher
            .dispatch(Some(&alice()), BODY, "req-6")
            .await
            .unwrap();

        let own = dispatcher
            .lookup(Some(&alice()), &ride.ride_id, "req-7")
            .await
            .unwrap();
        assert_eq!(own.ride_id, ride.ride_id);

        let bob = CallerIdentity::new("bob").unwrap();
        let err = dispatcher
            .lookup(Some(&bob), &ride.ride_id, "req-8")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
