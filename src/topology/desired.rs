use crate::sonos::Speaker;
use crate::topology::combinations::Combination;
use crate::topology::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Target state for one mutation: a coordinator and the members to join to it, in order.
///
/// The coordinator never appears among the members and members never repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDesiredTopology", into = "RawDesiredTopology")]
pub struct DesiredTopology {
    coordinator: Speaker,
    members: Vec<Speaker>,
}

#[derive(Serialize, Deserialize)]
struct RawDesiredTopology {
    coordinator: Speaker,
    #[serde(default)]
    members: Vec<Speaker>,
}

impl TryFrom<RawDesiredTopology> for DesiredTopology {
    type Error = TopologyError;

    fn try_from(raw: RawDesiredTopology) -> Result<Self, Self::Error> {
        DesiredTopology::new(raw.coordinator, raw.members)
    }
}

impl From<DesiredTopology> for RawDesiredTopology {
    fn from(desired: DesiredTopology) -> Self {
        RawDesiredTopology {
            coordinator: desired.coordinator,
            members: desired.members,
        }
    }
}

impl DesiredTopology {
    pub fn new(coordinator: Speaker, members: Vec<Speaker>) -> Result<Self, TopologyError> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if *member == coordinator {
                return Err(TopologyError::InvalidTopology(format!(
                    "'{}' cannot be a member of its own group",
                    coordinator
                )));
            }
            if !seen.insert(member) {
                return Err(TopologyError::InvalidTopology(format!(
                    "'{}' is listed more than once",
                    member
                )));
            }
        }
        Ok(DesiredTopology { coordinator, members })
    }

    /// A single speaker playing on its own.
    pub fn solo(coordinator: Speaker) -> Self {
        DesiredTopology {
            coordinator,
            members: Vec::new(),
        }
    }

    /// The first speaker of the combination becomes coordinator.
    pub fn from_combination(combination: &Combination) -> Result<Self, TopologyError> {
        let (first, rest) = combination
            .speakers()
            .split_first()
            .ok_or_else(|| TopologyError::InvalidSelection("empty combination".to_string()))?;
        DesiredTopology::new(first.clone(), rest.to_vec())
    }

    pub fn coordinator(&self) -> &Speaker {
        &self.coordinator
    }

    pub fn members(&self) -> &[Speaker] {
        &self.members
    }

    pub fn is_solo(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Display for DesiredTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coordinator)?;
        if !self.members.is_empty() {
            let members: Vec<&str> = self.members.iter().map(|m| m.room_name()).collect();
            write!(f, " + {}", members.join(", "))?;
        }
        Ok(())
    }
}

/// Resolves a 1-based menu number against the offered combinations.
pub fn select_combination(
    combinations: &[Combination],
    selection: usize,
) -> Result<DesiredTopology, TopologyError> {
    if selection == 0 || selection > combinations.len() {
        return Err(TopologyError::InvalidSelection(format!(
            "{} is not between 1 and {}",
            selection,
            combinations.len()
        )));
    }
    DesiredTopology::from_combination(&combinations[selection - 1])
}

/// Parses operator input such as `"1, 3"` or `"Kök, 3"` into a topology over `speakers`.
///
/// Each entry is a 1-based number into `speakers` or an exact room name. The
/// first entry names the coordinator and the rest are joined in typed order.
pub fn parse_manual_selection(
    input: &str,
    speakers: &[Speaker],
) -> Result<DesiredTopology, TopologyError> {
    let mut chosen: Vec<Speaker> = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let speaker = match part.parse::<usize>() {
            Ok(number) if number == 0 || number > speakers.len() => {
                return Err(TopologyError::InvalidSelection(format!(
                    "{} is not between 1 and {}",
                    number,
                    speakers.len()
                )));
            }
            Ok(number) => speakers[number - 1].clone(),
            Err(_) => speakers
                .iter()
                .find(|s| s.room_name() == part)
                .cloned()
                .ok_or_else(|| {
                    TopologyError::InvalidSelection(format!("'{}' is neither a speaker number nor a room", part))
                })?,
        };
        if chosen.contains(&speaker) {
            return Err(TopologyError::InvalidSelection(format!(
                "'{}' was chosen twice",
                speaker
            )));
        }
        chosen.push(speaker);
    }

    let mut chosen = chosen.into_iter();
    let coordinator = chosen
        .next()
        .ok_or_else(|| TopologyError::InvalidSelection("no speakers chosen".to_string()))?;
    DesiredTopology::new(coordinator, chosen.collect())
}
