use crate::sonos::{SonosApiContract, Speaker};
use crate::topology::desired::DesiredTopology;
use crate::topology::directory::{TopologySnapshot, ZoneDirectory};
use crate::topology::error::TopologyError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument, warn};

const MUTATOR_LOG_TARGET: &str = "sonos_grouper::topology::mutator";

/// Fixed waits that let the backend converge after calls it acknowledges early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After all ungroup calls.
    pub dissolve: Duration,
    /// After all join calls. Longer than `dissolve`.
    pub formation: Duration,
    /// Before resuming playback. Longer than `formation`.
    pub resume: Duration,
    /// Between the queue calls of a direct play.
    pub queue: Duration,
}

impl Default for SettleDelays {
    fn default() -> Self {
        SettleDelays {
            dissolve: Duration::from_secs(1),
            formation: Duration::from_secs(2),
            resume: Duration::from_secs(3),
            queue: Duration::from_secs(1),
        }
    }
}

impl SettleDelays {
    pub fn none() -> Self {
        SettleDelays {
            dissolve: Duration::ZERO,
            formation: Duration::ZERO,
            resume: Duration::ZERO,
            queue: Duration::ZERO,
        }
    }
}

/// How the mutator decides the new group has formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Trust the formation settle delay.
    #[default]
    Fixed,
    /// After the settle delay, re-query the directory until the group is seen.
    Poll { interval: Duration, timeout: Duration },
}

/// Drives the fleet to a desired topology: dissolve everything, then form one group.
#[derive(Clone)]
pub struct TopologyMutator {
    api: Arc<dyn SonosApiContract>,
    directory: ZoneDirectory,
    delays: SettleDelays,
    convergence: ConvergencePolicy,
}

impl TopologyMutator {
    pub fn new(api: Arc<dyn SonosApiContract>, delays: SettleDelays) -> Self {
        TopologyMutator {
            directory: ZoneDirectory::new(api.clone()),
            api,
            delays,
            convergence: ConvergencePolicy::Fixed,
        }
    }

    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.convergence = convergence;
        self
    }

    /// Applies `desired` against the live fleet.
    ///
    /// Joins are issued one at a time in member order and the first failing
    /// join aborts the rest. Nothing is rolled back, so on error the fleet may
    /// hold a partial group.
    #[instrument(skip_all, fields(desired = %desired))]
    pub async fn apply_topology(&self, desired: &DesiredTopology) -> Result<(), TopologyError> {
        info!(target: MUTATOR_LOG_TARGET, "Applying topology: {}", desired);
        self.dissolve_all().await?;

        if desired.is_solo() {
            debug!(target: MUTATOR_LOG_TARGET, "'{}' stands alone, nothing to join", desired.coordinator());
            return Ok(());
        }

        self.form_group(desired).await?;

        if let ConvergencePolicy::Poll { interval, timeout } = self.convergence {
            self.await_convergence(desired, interval, timeout).await?;
        }

        info!(target: MUTATOR_LOG_TARGET, "Topology applied: {}", desired);
        Ok(())
    }

    /// Ungroups every zone coordinator in the current snapshot, then waits the dissolve settle.
    ///
    /// One failing coordinator does not stop the others; the first failure is
    /// returned once every call has completed.
    #[instrument(skip(self))]
    pub async fn dissolve_all(&self) -> Result<TopologySnapshot, TopologyError> {
        let snapshot = self.directory.list_zones().await?;
        let coordinators: Vec<&Speaker> = snapshot.coordinators().collect();
        debug!(target: MUTATOR_LOG_TARGET, "Dissolving {} zones", coordinators.len());

        let results = join_all(coordinators.iter().map(|coordinator| async move {
            let result = self.api.ungroup(coordinator).await;
            match &result {
                Ok(()) => debug!(target: MUTATOR_LOG_TARGET, "{} ungrouped", coordinator),
                Err(e) => warn!(target: MUTATOR_LOG_TARGET, "Failed to ungroup {}: {}", coordinator, e),
            }
            (*coordinator, result)
        }))
        .await;

        sleep(self.delays.dissolve).await;

        let first_failure = results.into_iter().find_map(|(speaker, result)| {
            result.err().map(|cause| TopologyError::Mutation {
                speaker: speaker.clone(),
                cause,
            })
        });
        match first_failure {
            Some(err) => Err(err),
            None => Ok(snapshot),
        }
    }

    async fn form_group(&self, desired: &DesiredTopology) -> Result<(), TopologyError> {
        let coordinator = desired.coordinator();
        for member in desired.members() {
            if let Err(cause) = self.api.join(member, coordinator).await {
                error!(target: MUTATOR_LOG_TARGET, "Failed to join {} to {}: {}", member, coordinator, cause);
                return Err(TopologyError::Mutation {
                    speaker: member.clone(),
                    cause,
                });
            }
            info!(target: MUTATOR_LOG_TARGET, "{} grouped with {}", member, coordinator);
        }
        sleep(self.delays.formation).await;
        Ok(())
    }

    async fn await_convergence(
        &self,
        desired: &DesiredTopology,
        interval: Duration,
        timeout: Duration,
    ) -> Result<(), TopologyError> {
        let started = Instant::now();
        loop {
            let snapshot = self.directory.list_zones().await?;
            if snapshot.satisfies(desired) {
                debug!(target: MUTATOR_LOG_TARGET, "Group observed after {:?}", started.elapsed());
                return Ok(());
            }
            if started.elapsed() >= timeout {
                warn!(target: MUTATOR_LOG_TARGET, "Group around {} not observed within {:?}", desired.coordinator(), timeout);
                return Err(TopologyError::ConvergenceTimeout {
                    coordinator: desired.coordinator().clone(),
                    waited: started.elapsed(),
                });
            }
            sleep(interval).await;
        }
    }
}
