use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::fleet::FleetMember;

/// Placeholder arrival estimate returned with every dispatched ride.
pub const DEFAULT_ETA: &str = "30 seconds";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RideRequest {
    pub pickup_location: Coordinates,
}

/// URL-safe identifier of a single ride, primary key of the ride store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(String);

impl RideId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RideRecord {
    pub ride_id: RideId,
    pub user: String,
    pub unicorn: FleetMember,
    pub request_time: DateTime<Utc>,
}

/// Success payload handed back to the rider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DispatchedRide {
    pub ride_id: RideId,
    pub unicorn: FleetMember,
    pub eta: String,
    pub rider: String,
}

impl From<&RideRecord> for DispatchedRide {
    fn from(record: &RideRecord) -> Self {
        Self {
            ride_id: record.ride_id.clone(),
            unicorn: record.unicorn.clone(),
            eta: DEFAULT_ETA.to_string(),
            rider: record.user.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Coordinates, RideRequest};

    #[test]
    fn parses_pascal_case_request_body() {
        let body = json!({ "PickupLocation": { "Latitude": 47.6, "Longitude": -122.3 } });
        let request: RideRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.pickup_location.latitude, 47.6);
        assert_eq!(request.pickup_location.longitude, -122.3);
    }

    #[test]
    fn rejects_body_missing_a_coordinate() {
        let body = json!({ "PickupLocation": { "Latitude": 47.6 } });
        assert!(serde_json::from_value::<RideRequest>(body).is_err());
    }

    #[test]
    fn out_of_range_coordinates_are_flagged() {
        let inside = Coordinates {
            latitude: -90.0,
            longitude: 180.0,
        };
        let outside = Coordinates {
            latitude: 91.0,
            longitude: 0.0,
        };

        assert!(inside.is_in_range());
        assert!(!outside.is_in_range());
    }
}
