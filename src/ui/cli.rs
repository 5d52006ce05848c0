//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::session::{describe_speakers, Operator, SessionOutcome};
use crate::topology::{ResumeWarning, TopologySnapshot};

/// Command-line arguments for sonos-grouper
#[derive(Parser, Debug)]
#[command(author, version, about = "Group Sonos speakers through the Sonos HTTP API", long_about = None)]
pub struct Args {
    /// Base URL of the Sonos HTTP API
    #[arg(short = 'u', long, env = "SONOS_API_URL")]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(short, long, env = "SONOS_GROUPER_CONFIG")]
    pub config: Option<String>,

    /// Track to play after grouping, e.g. spotify:track:...
    #[arg(short, long, env = "SONOS_GROUPER_TRACK")]
    pub track_uri: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive menu (default)
    Menu,
    /// Print the current speakers, numbered as `group` expects them
    Zones,
    /// Dissolve every group
    Ungroup,
    /// Group speakers by their numbers in the `zones` listing or by room name, first one coordinates
    Group {
        /// Comma-separated speaker numbers or room names, e.g. 1,3 or "Kök,Hall"
        numbers: String,
        /// Start playback on the coordinator afterwards
        #[arg(long)]
        play: bool,
    },
    /// Apply a preset from the config file
    Preset {
        name: String,
        /// Start playback on the coordinator afterwards
        #[arg(long)]
        play: bool,
    },
}

/// Terminal operator reading from stdin
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    pub fn command(&self) -> Command {
        self.args.command.clone().unwrap_or(Command::Menu)
    }

    pub fn display_zones(&self, snapshot: &TopologySnapshot) {
        println!("\nSpeakers:");
        for (index, line) in describe_speakers(snapshot).iter().enumerate() {
            println!("{:<4} {}", index + 1, line);
        }
        println!();
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

impl Operator for Cli {
    fn show_list(&mut self, title: &str, items: &[String]) {
        println!("\n{}:", title);
        println!("{}", "-".repeat(40));
        for (index, item) in items.iter().enumerate() {
            println!("{:<4} {}", index + 1, item);
        }
        println!();
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn report_success(&mut self, outcome: &SessionOutcome) {
        println!("Grouped: {}", outcome.topology);
    }

    fn report_warning(&mut self, warning: &ResumeWarning) {
        eprintln!("Warning: {}", warning);
    }

    fn report_error(&mut self, error: &dyn Error) {
        self.display_error(error);
    }
}
