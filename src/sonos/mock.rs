//! Recording test double for `SonosApiContract`

use crate::sonos::api::{SonosApiContract, SonosError};
use crate::sonos::models::{Speaker, Zone};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Call {
    ListZones,
    Ungroup(String),
    Join(String, String),
    Play(String),
    ClearQueue(String),
    Queue(String, String),
}

/// Answers `list_zones` from a queue of snapshots (the last one repeats) and
/// records every call in order, with the tokio clock reading at the call.
pub(crate) struct RecordingApi {
    snapshots: Mutex<VecDeque<Vec<Zone>>>,
    calls: Mutex<Vec<(Call, Instant)>>,
    failing: Mutex<Vec<Call>>,
    zones_unavailable: bool,
    joins_in_flight: AtomicUsize,
    max_joins_in_flight: AtomicUsize,
}

impl RecordingApi {
    pub(crate) fn new(zones: Vec<Zone>) -> Self {
        RecordingApi {
            snapshots: Mutex::new(VecDeque::from(vec![zones])),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(Vec::new()),
            zones_unavailable: false,
            joins_in_flight: AtomicUsize::new(0),
            max_joins_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn unavailable() -> Self {
        RecordingApi {
            zones_unavailable: true,
            ..RecordingApi::new(Vec::new())
        }
    }

    /// Queue a snapshot to be returned after the ones already queued.
    pub(crate) fn then_zones(self, zones: Vec<Zone>) -> Self {
        self.snapshots.lock().unwrap().push_back(zones);
        self
    }

    pub(crate) fn failing_on(self, call: Call) -> Self {
        self.failing.lock().unwrap().push(call);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.timeline().into_iter().map(|(call, _)| call).collect()
    }

    pub(crate) fn timeline(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    /// When `call` was last made.
    pub(crate) fn last_at(&self, call: &Call) -> Option<Instant> {
        self.timeline()
            .into_iter()
            .rev()
            .find(|(c, _)| c == call)
            .map(|(_, at)| at)
    }

    pub(crate) fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::ListZones)
            .collect()
    }

    pub(crate) fn max_joins_in_flight(&self) -> usize {
        self.max_joins_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) -> Result<(), SonosError> {
        self.calls.lock().unwrap().push((call.clone(), Instant::now()));
        if self.failing.lock().unwrap().contains(&call) {
            return Err(SonosError::InvalidResponse(format!("injected failure for {:?}", call)));
        }
        Ok(())
    }
}

#[async_trait]
impl SonosApiContract for RecordingApi {
    async fn list_zones(&self) -> Result<Vec<Zone>, SonosError> {
        self.record(Call::ListZones)?;
        if self.zones_unavailable {
            return Err(SonosError::InvalidResponse("backend unreachable".to_string()));
        }
        let mut snapshots = self.snapshots.lock().unwrap();
        if snapshots.len() > 1 {
            Ok(snapshots.pop_front().unwrap_or_default())
        } else {
            Ok(snapshots.front().cloned().unwrap_or_default())
        }
    }

    async fn ungroup(&self, speaker: &Speaker) -> Result<(), SonosError> {
        tokio::task::yield_now().await;
        self.record(Call::Ungroup(speaker.room_name().to_string()))
    }

    async fn join(&self, speaker: &Speaker, coordinator: &Speaker) -> Result<(), SonosError> {
        let now = self.joins_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_joins_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let result = self.record(Call::Join(
            speaker.room_name().to_string(),
            coordinator.room_name().to_string(),
        ));
        self.joins_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn play(&self, speaker: &Speaker) -> Result<(), SonosError> {
        self.record(Call::Play(speaker.room_name().to_string()))
    }

    async fn clear_queue(&self, speaker: &Speaker) -> Result<(), SonosError> {
        self.record(Call::ClearQueue(speaker.room_name().to_string()))
    }

    async fn queue_uri(&self, speaker: &Speaker, uri: &str) -> Result<(), SonosError> {
        self.record(Call::Queue(speaker.room_name().to_string(), uri.to_string()))
    }
}

pub(crate) fn zone(coordinator: &str, members: &[&str]) -> Zone {
    Zone {
        coordinator: Speaker::new(coordinator),
        members: members.iter().map(|m| Speaker::new(*m)).collect(),
    }
}
