// tests/integration/live_api_test.rs

use sonos_grouper::sonos::{SonosApiContract, SonosClient};
use sonos_grouper::topology::{generate, TopologySnapshot};
use std::env;
use std::time::Duration;

use crate::test_utils::constants::TEST_API_URL;

// Helper function to load the API URL from the environment or a .env file.
fn load_test_url() -> String {
    dotenv::dotenv().ok();

    let url = env::var("SONOS_TEST_URL").unwrap_or_else(|_| TEST_API_URL.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        panic!("SONOS_TEST_URL must start with http:// or https://. Found: {}", url);
    }
    url
}

#[tokio::test]
#[ignore] // Requires a running Sonos HTTP API; read-only
async fn test_live_zone_listing() {
    let url = load_test_url();
    println!("Querying zones at {}", url);

    let client = SonosClient::new(&url, Duration::from_secs(10));
    let zones = client.list_zones().await.expect("list zones");
    assert!(!zones.is_empty(), "household should have at least one zone");

    let snapshot = TopologySnapshot::new(zones);
    for zone in snapshot.zones() {
        assert!(!zone.members.contains(&zone.coordinator));
    }

    let speakers = snapshot.speakers();
    println!("{} speakers, {} candidate groups", speakers.len(), generate(&speakers).len());
}
