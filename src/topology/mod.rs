//! Topology orchestration engine
//!
//! Reads the current zones, enumerates groupable speaker sets, and drives the
//! fleet to a chosen group through ungroup and join calls. The backend settles
//! asynchronously, so every mutating phase ends with a fixed settle delay.

pub mod combinations;
pub mod desired;
pub mod directory;
mod error;
pub mod mutator;
pub mod resumer;

pub use combinations::{generate, Combination};
pub use desired::{parse_manual_selection, select_combination, DesiredTopology};
pub use directory::{TopologySnapshot, ZoneDirectory};
pub use error::*;
pub use mutator::{ConvergencePolicy, SettleDelays, TopologyMutator};
pub use resumer::PlaybackResumer;
