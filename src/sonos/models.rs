//! Data models for the Sonos HTTP control surface

use serde::{Deserialize, Serialize};
use std::fmt;

/// A speaker, addressed by its room name.
///
/// Room names are unique within a household and case-sensitive; the backend
/// uses them directly as routing keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speaker(String);

impl Speaker {
    pub fn new(room_name: impl Into<String>) -> Self {
        Speaker(room_name.into())
    }

    pub fn room_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Speaker {
    fn from(room_name: &str) -> Self {
        Speaker::new(room_name)
    }
}

impl From<String> for Speaker {
    fn from(room_name: String) -> Self {
        Speaker(room_name)
    }
}

/// A player entry as it appears in the `/zones` payload
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ZonePlayer {
    #[serde(rename = "roomName")]
    pub room_name: String,
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Raw zone object returned by `GET /zones`.
///
/// The backend lists the coordinator inside `members` as well.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ZoneResponse {
    #[serde(default)]
    pub uuid: Option<String>,
    pub coordinator: ZonePlayer,
    #[serde(default)]
    pub members: Vec<ZonePlayer>,
}

/// One independent group: a coordinator plus the speakers joined to it.
///
/// `members` never contains the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub coordinator: Speaker,
    pub members: Vec<Speaker>,
}

impl Zone {
    pub fn lone(coordinator: impl Into<Speaker>) -> Self {
        Zone {
            coordinator: coordinator.into(),
            members: Vec::new(),
        }
    }

    /// Coordinator first, then members in backend order.
    pub fn speakers(&self) -> impl Iterator<Item = &Speaker> {
        std::iter::once(&self.coordinator).chain(self.members.iter())
    }

    pub fn contains(&self, speaker: &Speaker) -> bool {
        self.speakers().any(|s| s == speaker)
    }
}

impl From<ZoneResponse> for Zone {
    fn from(raw: ZoneResponse) -> Self {
        let coordinator = Speaker::new(raw.coordinator.room_name);
        let mut members: Vec<Speaker> = Vec::with_capacity(raw.members.len());
        for member in raw.members {
            let speaker = Speaker::new(member.room_name);
            if speaker != coordinator && !members.contains(&speaker) {
                members.push(speaker);
            }
        }
        Zone { coordinator, members }
    }
}
