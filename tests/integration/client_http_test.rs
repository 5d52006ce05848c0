//! The real HTTP client against a mock control surface

use mockito::{Mock, Server, ServerGuard};
use sonos_grouper::session::{PlaybackRequest, SessionController};
use sonos_grouper::sonos::{SonosApiContract, SonosClient, SonosError, Speaker, Zone};
use sonos_grouper::topology::{DesiredTopology, SettleDelays, TopologyError, TopologyMutator, ZoneDirectory};
use std::sync::Arc;
use std::time::Duration;

const TWO_ZONES: &str = r#"[
  {
    "uuid": "RINCON_000E58A1",
    "coordinator": { "uuid": "RINCON_000E58A1", "roomName": "Living Room", "state": { "playbackState": "PLAYING" } },
    "members": [
      { "uuid": "RINCON_000E58A1", "roomName": "Living Room" },
      { "uuid": "RINCON_000E58B2", "roomName": "Kök" }
    ]
  },
  {
    "uuid": "RINCON_000E58C3",
    "coordinator": { "uuid": "RINCON_000E58C3", "roomName": "Hall" },
    "members": [ { "uuid": "RINCON_000E58C3", "roomName": "Hall" } ]
  }
]"#;

const SUCCESS: &str = r#"{"status":"success"}"#;

fn client(server: &ServerGuard) -> SonosClient {
    SonosClient::new(&server.url(), Duration::from_secs(5))
}

async fn zones_mock(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("GET", "/zones")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn command_mock(server: &mut ServerGuard, path: &str, status: usize, hits: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(if status == 200 { SUCCESS } else { r#"{"status":"error","error":"boom"}"# })
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_list_zones_over_http() {
    let mut server = Server::new_async().await;
    let mock = zones_mock(&mut server, 200, TWO_ZONES).await;

    let zones = client(&server).list_zones().await.unwrap();

    assert_eq!(
        zones,
        vec![
            Zone { coordinator: Speaker::new("Living Room"), members: vec![Speaker::new("Kök")] },
            Zone::lone("Hall"),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_commands_encode_room_names() {
    let mut server = Server::new_async().await;
    let join = command_mock(&mut server, "/K%C3%B6k/join/Living%20Room", 200, 1).await;
    let ungroup = command_mock(&mut server, "/Living%20Room/ungroup", 200, 1).await;
    let queue = command_mock(&mut server, "/Hall/queue/spotify%3Atrack%3A1wFFFzJ5EsKbBWZriAcubN", 200, 1).await;
    let client = client(&server);

    client.join(&Speaker::new("Kök"), &Speaker::new("Living Room")).await.unwrap();
    client.ungroup(&Speaker::new("Living Room")).await.unwrap();
    client.queue_uri(&Speaker::new("Hall"), "spotify:track:1wFFFzJ5EsKbBWZriAcubN").await.unwrap();

    join.assert_async().await;
    ungroup.assert_async().await;
    queue.assert_async().await;
}

#[tokio::test]
async fn test_error_status_is_backend_unavailable() {
    let mut server = Server::new_async().await;
    let _zones = zones_mock(&mut server, 500, r#"{"status":"error","error":"boom"}"#).await;
    let directory = ZoneDirectory::new(Arc::new(client(&server)));

    match directory.list_zones().await {
        Err(TopologyError::BackendUnavailable(SonosError::Status { status, body })) => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_payload_is_backend_unavailable() {
    let mut server = Server::new_async().await;
    let _zones = zones_mock(&mut server, 200, r#"{"not":"an array"}"#).await;
    let directory = ZoneDirectory::new(Arc::new(client(&server)));

    assert!(matches!(
        directory.list_zones().await,
        Err(TopologyError::BackendUnavailable(SonosError::InvalidResponse(_)))
    ));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let client = SonosClient::new("http://127.0.0.1:1", Duration::from_secs(2));
    assert!(matches!(client.list_zones().await, Err(SonosError::Network(_))));
}

#[tokio::test]
async fn test_failing_ungroup_endpoint_is_mutation_error() {
    let mut server = Server::new_async().await;
    let _zones = zones_mock(&mut server, 200, TWO_ZONES).await;
    let living_room = command_mock(&mut server, "/Living%20Room/ungroup", 500, 1).await;
    let hall = command_mock(&mut server, "/Hall/ungroup", 200, 1).await;
    let join = command_mock(&mut server, "/K%C3%B6k/join/Hall", 200, 0).await;
    let mutator = TopologyMutator::new(Arc::new(client(&server)), SettleDelays::none());
    let desired = DesiredTopology::new(Speaker::new("Hall"), vec![Speaker::new("Kök")]).unwrap();

    match mutator.apply_topology(&desired).await {
        Err(TopologyError::Mutation { speaker, cause: SonosError::Status { status, .. } }) => {
            assert_eq!(speaker, Speaker::new("Living Room"));
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    living_room.assert_async().await;
    hall.assert_async().await;
    join.assert_async().await;
}

#[tokio::test]
async fn test_failing_join_endpoint_is_mutation_error() {
    let mut server = Server::new_async().await;
    let _zones = zones_mock(&mut server, 200, TWO_ZONES).await;
    let _ungroups = [
        command_mock(&mut server, "/Living%20Room/ungroup", 200, 1).await,
        command_mock(&mut server, "/Hall/ungroup", 200, 1).await,
    ];
    let join = command_mock(&mut server, "/K%C3%B6k/join/Hall", 500, 1).await;
    let play = command_mock(&mut server, "/Hall/play", 200, 0).await;
    let controller = SessionController::new(Arc::new(client(&server)), SettleDelays::none());
    let desired = DesiredTopology::new(Speaker::new("Hall"), vec![Speaker::new("Kök")]).unwrap();

    match controller.apply(desired, PlaybackRequest::Resume).await {
        Err(TopologyError::Mutation { speaker, cause: SonosError::Status { status, .. } }) => {
            assert_eq!(speaker, Speaker::new("Kök"));
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    join.assert_async().await;
    play.assert_async().await;
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let mut server = Server::new_async().await;
    let zones = zones_mock(&mut server, 200, TWO_ZONES).await;
    let ungroups = [
        command_mock(&mut server, "/Living%20Room/ungroup", 200, 1).await,
        command_mock(&mut server, "/Hall/ungroup", 200, 1).await,
    ];
    let join = command_mock(&mut server, "/K%C3%B6k/join/Hall", 200, 1).await;
    let play = command_mock(&mut server, "/Hall/play", 200, 1).await;
    let controller = SessionController::new(Arc::new(client(&server)), SettleDelays::none());
    let desired = DesiredTopology::new(Speaker::new("Hall"), vec![Speaker::new("Kök")]).unwrap();

    let outcome = controller.apply(desired, PlaybackRequest::Resume).await.unwrap();

    assert!(outcome.resume_warning.is_none());
    zones.assert_async().await;
    for ungroup in &ungroups {
        ungroup.assert_async().await;
    }
    join.assert_async().await;
    play.assert_async().await;
}
