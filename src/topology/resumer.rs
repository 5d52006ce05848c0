use crate::sonos::{SonosApiContract, Speaker};
use crate::topology::error::{ResumeWarning, TopologyError};
use crate::topology::mutator::SettleDelays;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

const RESUMER_LOG_TARGET: &str = "sonos_grouper::topology::resumer";

/// Starts audio on a coordinator once a new group has settled.
#[derive(Clone)]
pub struct PlaybackResumer {
    api: Arc<dyn SonosApiContract>,
    delays: SettleDelays,
}

impl PlaybackResumer {
    pub fn new(api: Arc<dyn SonosApiContract>, delays: SettleDelays) -> Self {
        PlaybackResumer { api, delays }
    }

    /// Waits the resume settle, then plays. Failure is only ever a warning.
    #[instrument(skip_all, fields(coordinator = %coordinator))]
    pub async fn resume(&self, coordinator: &Speaker) -> Result<(), ResumeWarning> {
        sleep(self.delays.resume).await;
        match self.api.play(coordinator).await {
            Ok(()) => {
                info!(target: RESUMER_LOG_TARGET, "Playback resumed on {}", coordinator);
                Ok(())
            }
            Err(e) => {
                warn!(target: RESUMER_LOG_TARGET, "Could not resume playback on {}: {}", coordinator, e);
                Err(ResumeWarning {
                    speaker: coordinator.clone(),
                    cause: e.to_string(),
                })
            }
        }
    }

    /// Replaces the coordinator's queue with `uri` and plays it.
    #[instrument(skip_all, fields(coordinator = %coordinator))]
    pub async fn play_uri(&self, coordinator: &Speaker, uri: &str) -> Result<(), TopologyError> {
        let playback_error = |cause| TopologyError::Playback {
            speaker: coordinator.clone(),
            cause,
        };

        info!(target: RESUMER_LOG_TARGET, "Attempting to play {} on {}", uri, coordinator);
        self.api.clear_queue(coordinator).await.map_err(playback_error)?;
        sleep(self.delays.queue).await;

        self.api.queue_uri(coordinator, uri).await.map_err(playback_error)?;
        sleep(self.delays.queue).await;

        self.api.play(coordinator).await.map_err(playback_error)?;
        info!(target: RESUMER_LOG_TARGET, "Successfully queued {} on {}", uri, coordinator);
        Ok(())
    }

    /// `play_uri` after the resume settle, with failure downgraded to a warning.
    pub async fn resume_with(&self, coordinator: &Speaker, uri: &str) -> Result<(), ResumeWarning> {
        sleep(self.delays.resume).await;
        self.play_uri(coordinator, uri).await.map_err(|e| {
            warn!(target: RESUMER_LOG_TARGET, "Direct play failed on {}: {}", coordinator, e);
            ResumeWarning {
                speaker: coordinator.clone(),
                cause: e.to_string(),
            }
        })
    }
}
