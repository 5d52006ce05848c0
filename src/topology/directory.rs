use crate::sonos::{SonosApiContract, Speaker, Zone};
use crate::topology::desired::DesiredTopology;
use crate::topology::error::TopologyError;
use std::sync::Arc;
use tracing::{debug, error, instrument};

const DIRECTORY_LOG_TARGET: &str = "sonos_grouper::topology::directory";

/// Zones as the backend reported them at one instant.
///
/// Stale as soon as it is returned; re-query after any mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologySnapshot {
    zones: Vec<Zone>,
}

impl TopologySnapshot {
    pub fn new(zones: Vec<Zone>) -> Self {
        TopologySnapshot { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn coordinators(&self) -> impl Iterator<Item = &Speaker> {
        self.zones.iter().map(|z| &z.coordinator)
    }

    /// Every speaker in the fleet, zone by zone, coordinator first.
    pub fn speakers(&self) -> Vec<Speaker> {
        self.zones.iter().flat_map(|z| z.speakers().cloned()).collect()
    }

    pub fn zone_of(&self, speaker: &Speaker) -> Option<&Zone> {
        self.zones.iter().find(|z| z.contains(speaker))
    }

    /// True when a zone led by the desired coordinator holds exactly the desired members.
    pub fn satisfies(&self, desired: &DesiredTopology) -> bool {
        self.zones.iter().any(|zone| {
            zone.coordinator == *desired.coordinator()
                && zone.members.len() == desired.members().len()
                && desired.members().iter().all(|m| zone.members.contains(m))
        })
    }
}

/// Read-only view of the backend's current zones.
#[derive(Clone)]
pub struct ZoneDirectory {
    api: Arc<dyn SonosApiContract>,
}

impl ZoneDirectory {
    pub fn new(api: Arc<dyn SonosApiContract>) -> Self {
        ZoneDirectory { api }
    }

    /// Queries the backend. Each call is independent.
    #[instrument(skip(self))]
    pub async fn list_zones(&self) -> Result<TopologySnapshot, TopologyError> {
        match self.api.list_zones().await {
            Ok(zones) => {
                debug!(target: DIRECTORY_LOG_TARGET, "Directory returned {} zones", zones.len());
                Ok(TopologySnapshot::new(zones))
            }
            Err(e) => {
                error!(target: DIRECTORY_LOG_TARGET, "Zone directory query failed: {}", e);
                Err(TopologyError::BackendUnavailable(e))
            }
        }
    }
}
