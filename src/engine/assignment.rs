use std::sync::Arc;

use crate::engine::fleet::FleetRegistry;
use crate::engine::random::RandomSource;
use crate::models::fleet::FleetMember;
use crate::models::ride::Coordinates;

/// Picks the unicorn that will serve a ride.
pub trait Selector: Send + Sync {
    fn select_for(&self, pickup: &Coordinates) -> FleetMember;
}

/// Uniform draw over the whole fleet. The pickup location is not consulted.
pub struct UniformSelector {
    fleet: Arc<FleetRegistry>,
    source: Arc<dyn RandomSource>,
}

impl UniformSelector {
    pub fn new(fleet: Arc<FleetRegistry>, source: Arc<dyn RandomSource>) -> Self {
        Self { fleet, source }
    }
}

impl Selector for UniformSelector {
    fn select_for(&self, _pickup: &Coordinates) -> FleetMember {
        debug_assert!(!self.fleet.is_empty(), "fleet registry is never empty");
        let members = self.fleet.all_members();
        let index = self.source.index(members.len()) % members.len();
        members[index].clone()
    }
}
