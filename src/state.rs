use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};

use crate::api::rest::response::ResponseFormatter;
use crate::config::Config;
use crate::engine::assignment::UniformSelector;
use crate::engine::dispatch::Dispatcher;
use crate::engine::fleet::FleetRegistry;
use crate::engine::random::{RandomSource, ThreadRandom};
use crate::engine::ride_id::RideIdGenerator;
use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::store::RideStore;

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub fleet: Arc<FleetRegistry>,
    pub formatter: ResponseFormatter,
    pub identity_header: HeaderName,
    pub request_timeout: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        config: &Config,
        fleet: FleetRegistry,
        store: Arc<dyn RideStore>,
    ) -> Result<Self, AppError> {
        Self::with_random_sources(
            config,
            fleet,
            store,
            Arc::new(ThreadRandom),
            Arc::new(ThreadRandom),
        )
    }

    /// Like [`AppState::new`] but with explicit randomness for unicorn
    /// selection and ride id generation.
    pub fn with_random_sources(
        config: &Config,
        fleet: FleetRegistry,
        store: Arc<dyn RideStore>,
        selection: Arc<dyn RandomSource>,
        ride_ids: Arc<dyn RandomSource>,
    ) -> Result<Self, AppError> {
        let allowed_origin = HeaderValue::from_str(&config.allowed_origin)
            .map_err(|err| AppError::Configuration(format!("invalid ALLOWED_ORIGIN: {err}")))?;
        let identity_header = HeaderName::from_bytes(config.identity_header.as_bytes())
            .map_err(|err| AppError::Configuration(format!("invalid IDENTITY_HEADER: {err}")))?;

        let fleet = Arc::new(fleet);
        let metrics = Metrics::new();
        let dispatcher = Dispatcher::new(
            Arc::new(UniformSelector::new(fleet.clone(), selection)),
            RideIdGenerator::new(ride_ids),
            store,
            config.store_timeout,
            metrics.clone(),
        );

        Ok(Self {
            dispatcher,
            fleet,
            formatter: ResponseFormatter::new(allowed_origin),
            identity_header,
            request_timeout: config.request_timeout,
            metrics,
        })
    }
}
