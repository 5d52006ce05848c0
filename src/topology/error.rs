use crate::sonos::{SonosError, Speaker};
use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Error types for topology orchestration.
#[derive(Debug)]
pub enum TopologyError {
    /// The zone directory could not be queried or decoded.
    BackendUnavailable(SonosError),
    /// An ungroup or join call failed. Earlier calls of the same flow may
    /// already be in effect; nothing is rolled back.
    Mutation { speaker: Speaker, cause: SonosError },
    /// Operator input did not resolve to a candidate. Raised before any mutation.
    InvalidSelection(String),
    /// A desired topology broke the coordinator/member invariants.
    InvalidTopology(String),
    /// Polling never observed the desired zone.
    ConvergenceTimeout { coordinator: Speaker, waited: Duration },
    /// An explicitly requested playback call failed.
    Playback { speaker: Speaker, cause: SonosError },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::BackendUnavailable(e) => write!(f, "Backend unavailable: {}", e),
            TopologyError::Mutation { speaker, cause } => write!(
                f,
                "Topology change failed at '{}': {} (the group may be partially applied)",
                speaker, cause
            ),
            TopologyError::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),
            TopologyError::InvalidTopology(msg) => write!(f, "Invalid topology: {}", msg),
            TopologyError::ConvergenceTimeout { coordinator, waited } => write!(
                f,
                "Group around '{}' not observed after {:?}",
                coordinator, waited
            ),
            TopologyError::Playback { speaker, cause } => {
                write!(f, "Playback failed on '{}': {}", speaker, cause)
            }
        }
    }
}

impl Error for TopologyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TopologyError::BackendUnavailable(e) => Some(e),
            TopologyError::Mutation { cause, .. } => Some(cause),
            TopologyError::Playback { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Non-fatal outcome of a failed playback resume.
#[derive(Debug)]
pub struct ResumeWarning {
    pub speaker: Speaker,
    pub cause: String,
}

impl fmt::Display for ResumeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not resume playback on '{}' ({}); start it manually",
            self.speaker, self.cause
        )
    }
}
