use sonos_grouper::config::Settings;
use sonos_grouper::logging::init_logging;
use sonos_grouper::session::{SessionController, SessionOutcome};
use sonos_grouper::sonos::SonosClient;
use sonos_grouper::ui::{Cli, Command};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut cli = Cli::new();
    init_logging(cli.args.verbose)?;

    let config_path = match &cli.args.config {
        Some(path) => PathBuf::from(path),
        None => Settings::default_path(),
    };
    debug!("Loading settings from {}", config_path.display());
    let mut settings = Settings::load(&config_path)?;

    // Command-line arguments and environment win over the config file
    if let Some(api_url) = &cli.args.api_url {
        settings.api_url = api_url.clone();
    }
    if let Some(track_uri) = &cli.args.track_uri {
        settings.track_uri = Some(track_uri.clone());
    }
    settings.validate()?;

    info!("Using Sonos HTTP API at {}", settings.api_url);
    let client = SonosClient::new(&settings.api_url, settings.request_timeout());
    let controller = SessionController::new(Arc::new(client), settings.settle_delays())
        .with_convergence(settings.convergence_policy())
        .with_presets(settings.presets.clone())
        .with_track_uri(settings.track_uri.clone());

    match cli.command() {
        Command::Menu => controller.run_menu(&mut cli).await?,
        Command::Zones => {
            let snapshot = controller.zones().await?;
            cli.display_zones(&snapshot);
        }
        Command::Ungroup => {
            controller.ungroup_all().await?;
            println!("All speakers ungrouped");
        }
        Command::Group { numbers, play } => {
            let outcome = controller
                .group_by_numbers(&numbers, controller.playback_for(play))
                .await?;
            print_outcome(&outcome);
        }
        Command::Preset { name, play } => {
            let outcome = controller
                .apply_preset(&name, controller.playback_for(play))
                .await?;
            print_outcome(&outcome);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SessionOutcome) {
    println!("Grouped: {}", outcome.topology);
    if let Some(warning) = &outcome.resume_warning {
        eprintln!("Warning: {}", warning);
    }
}
