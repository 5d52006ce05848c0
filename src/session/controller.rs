use crate::config::Preset;
use crate::session::operator::Operator;
use crate::sonos::{SonosApiContract, Speaker};
use crate::topology::{
    generate, parse_manual_selection, select_combination, Combination, ConvergencePolicy,
    DesiredTopology, PlaybackResumer, ResumeWarning, SettleDelays, TopologyError,
    TopologyMutator, TopologySnapshot, ZoneDirectory,
};
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const SESSION_LOG_TARGET: &str = "sonos_grouper::session";

/// Error types for a session flow
#[derive(Debug)]
pub enum SessionError {
    Topology(TopologyError),
    /// Reading operator input failed.
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Topology(e) => write!(f, "{}", e),
            SessionError::Io(e) => write!(f, "Input error: {}", e),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Topology(e) => Some(e),
            SessionError::Io(e) => Some(e),
        }
    }
}

impl From<TopologyError> for SessionError {
    fn from(err: TopologyError) -> Self {
        SessionError::Topology(err)
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::Io(err)
    }
}

/// What to do on the coordinator once the group is formed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackRequest {
    Skip,
    Resume,
    Track(String),
}

/// Result of a successful grouping flow.
#[derive(Debug)]
pub struct SessionOutcome {
    pub topology: DesiredTopology,
    /// Set when playback was requested but could not be started.
    pub resume_warning: Option<ResumeWarning>,
}

/// Entries of the interactive menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateGroup,
    ManualGroup,
    PresetGroup,
    UngroupAll,
    ShowZones,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 6] = [
        MenuChoice::CreateGroup,
        MenuChoice::ManualGroup,
        MenuChoice::PresetGroup,
        MenuChoice::UngroupAll,
        MenuChoice::ShowZones,
        MenuChoice::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::CreateGroup => "Create group",
            MenuChoice::ManualGroup => "Create group from speaker numbers",
            MenuChoice::PresetGroup => "Preset group",
            MenuChoice::UngroupAll => "Ungroup all",
            MenuChoice::ShowZones => "Show zones",
            MenuChoice::Exit => "Exit",
        }
    }

    /// Parses a 1-based menu number.
    pub fn parse(input: &str) -> Option<MenuChoice> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }
}

/// Sequences operator intent into directory queries, mutation and resume.
///
/// Every grouping flow starts by dissolving all groups, whatever the operator
/// picks afterwards.
pub struct SessionController {
    directory: ZoneDirectory,
    mutator: TopologyMutator,
    resumer: PlaybackResumer,
    presets: Vec<Preset>,
    track_uri: Option<String>,
}

impl SessionController {
    pub fn new(api: Arc<dyn SonosApiContract>, delays: SettleDelays) -> Self {
        SessionController {
            directory: ZoneDirectory::new(api.clone()),
            mutator: TopologyMutator::new(api.clone(), delays),
            resumer: PlaybackResumer::new(api, delays),
            presets: Vec::new(),
            track_uri: None,
        }
    }

    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.mutator = self.mutator.with_convergence(convergence);
        self
    }

    pub fn with_presets(mut self, presets: Vec<Preset>) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_track_uri(mut self, track_uri: Option<String>) -> Self {
        self.track_uri = track_uri;
        self
    }

    /// Playback to use when the operator asks for audio after grouping.
    pub fn playback_for(&self, wanted: bool) -> PlaybackRequest {
        match (&self.track_uri, wanted) {
            (_, false) => PlaybackRequest::Skip,
            (Some(uri), true) => PlaybackRequest::Track(uri.clone()),
            (None, true) => PlaybackRequest::Resume,
        }
    }

    pub async fn zones(&self) -> Result<TopologySnapshot, TopologyError> {
        self.directory.list_zones().await
    }

    #[instrument(skip(self))]
    pub async fn ungroup_all(&self) -> Result<TopologySnapshot, TopologyError> {
        info!(target: SESSION_LOG_TARGET, "Ungrouping all speakers");
        self.mutator.dissolve_all().await
    }

    /// Dissolves all groups, then lists the fleet and its groupable combinations.
    #[instrument(skip(self))]
    pub async fn prepare_candidates(&self) -> Result<(Vec<Speaker>, Vec<Combination>), TopologyError> {
        self.ungroup_all().await?;
        let snapshot = self.directory.list_zones().await?;
        let speakers = snapshot.speakers();
        let combinations = generate(&speakers);
        debug!(target: SESSION_LOG_TARGET, "{} speakers give {} candidate groups", speakers.len(), combinations.len());
        Ok((speakers, combinations))
    }

    /// Applies `desired` and, if asked, starts playback on its coordinator.
    ///
    /// Mutation failures are errors; playback failures only produce a warning.
    #[instrument(skip_all, fields(desired = %desired))]
    pub async fn apply(
        &self,
        desired: DesiredTopology,
        playback: PlaybackRequest,
    ) -> Result<SessionOutcome, TopologyError> {
        self.mutator.apply_topology(&desired).await?;

        let coordinator = desired.coordinator();
        let resume_result = match &playback {
            PlaybackRequest::Skip => Ok(()),
            PlaybackRequest::Resume => self.resumer.resume(coordinator).await,
            PlaybackRequest::Track(uri) => self.resumer.resume_with(coordinator, uri).await,
        };

        let resume_warning = resume_result.err();
        if let Some(warning) = &resume_warning {
            warn!(target: SESSION_LOG_TARGET, "{}", warning);
        }
        Ok(SessionOutcome {
            topology: desired,
            resume_warning,
        })
    }

    /// Applies the group picked by speaker numbers or room names (e.g. `"1,3"`).
    ///
    /// Numbers follow `describe_speakers` over the current snapshot, and are
    /// resolved before anything is dissolved.
    pub async fn group_by_numbers(
        &self,
        input: &str,
        playback: PlaybackRequest,
    ) -> Result<SessionOutcome, TopologyError> {
        let snapshot = self.directory.list_zones().await?;
        let desired = parse_manual_selection(input, &snapshot.speakers())?;
        self.ungroup_all().await?;
        self.apply(desired, playback).await
    }

    pub async fn apply_preset(
        &self,
        name: &str,
        playback: PlaybackRequest,
    ) -> Result<SessionOutcome, TopologyError> {
        let preset = self
            .presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| TopologyError::InvalidSelection(format!("no preset named '{}'", name)))?;
        self.ungroup_all().await?;
        self.apply(preset.topology.clone(), playback).await
    }

    /// Interactive flow over the generated combinations.
    pub async fn create_group<O: Operator>(&self, operator: &mut O) -> Result<SessionOutcome, SessionError> {
        let (_, combinations) = self.prepare_candidates().await?;
        let labels: Vec<String> = combinations.iter().map(|c| c.to_string()).collect();
        operator.show_list("Possible groups", &labels);

        let input = operator.ask(&format!("Select a group (1-{}): ", combinations.len()))?;
        let desired = select_combination(&combinations, parse_number(&input)?)?;
        self.finish(operator, desired).await
    }

    /// Interactive flow where the operator types speaker numbers.
    pub async fn manual_group<O: Operator>(&self, operator: &mut O) -> Result<SessionOutcome, SessionError> {
        let (speakers, _) = self.prepare_candidates().await?;
        let labels: Vec<String> = speakers.iter().map(|s| s.to_string()).collect();
        operator.show_list("Available speakers", &labels);

        let input = operator.ask("Enter speaker numbers or room names to group (comma-separated, e.g. 1,2,3): ")?;
        let desired = parse_manual_selection(&input, &speakers)?;
        self.finish(operator, desired).await
    }

    /// Interactive flow over the configured presets.
    pub async fn preset_group<O: Operator>(&self, operator: &mut O) -> Result<SessionOutcome, SessionError> {
        self.ungroup_all().await?;
        let labels: Vec<String> = self
            .presets
            .iter()
            .map(|p| format!("{}: {}", p.name, p.topology))
            .collect();
        operator.show_list("Presets", &labels);

        let input = operator.ask(&format!("Select a preset (1-{}): ", self.presets.len()))?;
        let number = parse_number(&input)?;
        let preset = number
            .checked_sub(1)
            .and_then(|index| self.presets.get(index))
            .ok_or_else(|| {
                TopologyError::InvalidSelection(format!(
                    "{} is not between 1 and {}",
                    number,
                    self.presets.len()
                ))
            })?;
        self.finish(operator, preset.topology.clone()).await
    }

    async fn finish<O: Operator>(
        &self,
        operator: &mut O,
        desired: DesiredTopology,
    ) -> Result<SessionOutcome, SessionError> {
        let wanted = operator.confirm(&format!("Start playback on {} afterwards?", desired.coordinator()))?;
        let outcome = self.apply(desired, self.playback_for(wanted)).await?;
        Ok(outcome)
    }

    /// Runs the menu until the operator exits. Flow errors are reported and the menu shown again.
    pub async fn run_menu<O: Operator>(&self, operator: &mut O) -> Result<(), SessionError> {
        let labels: Vec<String> = MenuChoice::ALL.iter().map(|c| c.label().to_string()).collect();
        loop {
            operator.show_list("Menu", &labels);
            let input = operator.ask("Choose an option: ")?;
            let choice = match MenuChoice::parse(&input) {
                Some(choice) => choice,
                None => {
                    operator.report_error(&TopologyError::InvalidSelection(format!(
                        "'{}' is not a menu option",
                        input.trim()
                    )));
                    continue;
                }
            };

            let result = match choice {
                MenuChoice::CreateGroup => self.create_group(operator).await.map(Some),
                MenuChoice::ManualGroup => self.manual_group(operator).await.map(Some),
                MenuChoice::PresetGroup => self.preset_group(operator).await.map(Some),
                MenuChoice::UngroupAll => self.ungroup_all().await.map(|_| None).map_err(SessionError::from),
                MenuChoice::ShowZones => match self.zones().await {
                    Ok(snapshot) => {
                        operator.show_list("Speakers", &describe_speakers(&snapshot));
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                },
                MenuChoice::Exit => return Ok(()),
            };

            match result {
                Ok(Some(outcome)) => {
                    operator.report_success(&outcome);
                    if let Some(warning) = &outcome.resume_warning {
                        operator.report_warning(warning);
                    }
                }
                Ok(None) => {}
                Err(SessionError::Io(e)) => return Err(SessionError::Io(e)),
                Err(e) => operator.report_error(&e),
            }
        }
    }
}

fn parse_number(input: &str) -> Result<usize, TopologyError> {
    let trimmed = input.trim();
    trimmed
        .parse()
        .map_err(|_| TopologyError::InvalidSelection(format!("'{}' is not a number", trimmed)))
}

/// One line per speaker, in `TopologySnapshot::speakers` order, naming its group.
pub fn describe_speakers(snapshot: &TopologySnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    for zone in snapshot.zones() {
        if zone.members.is_empty() {
            lines.push(zone.coordinator.to_string());
            continue;
        }
        let members: Vec<&str> = zone.members.iter().map(|m| m.room_name()).collect();
        lines.push(format!("{} (coordinator of {})", zone.coordinator, members.join(", ")));
        lines.extend(
            zone.members
                .iter()
                .map(|m| format!("{} (member of {})", m, zone.coordinator)),
        );
    }
    lines
}
