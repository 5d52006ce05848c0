//! Sonos HTTP control surface client

use crate::sonos::models::{Speaker, Zone, ZoneResponse};
use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, instrument, trace, warn};

const API_LOG_TARGET: &str = "sonos_grouper::sonos::api";

/// Error types for control surface operations
#[derive(Debug)]
pub enum SonosError {
    /// Transport failure: connection refused, timeout, DNS.
    Network(ReqwestError),
    /// The backend answered with a non-success status.
    Status { status: StatusCode, body: String },
    InvalidResponse(String),
}

impl fmt::Display for SonosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SonosError::Network(e) => write!(f, "Network error: {}", e),
            SonosError::Status { status, body } => {
                write!(f, "Request failed with status {}: {}", status, body)
            }
            SonosError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl Error for SonosError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SonosError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for SonosError {
    fn from(err: ReqwestError) -> Self {
        SonosError::Network(err)
    }
}

/// The read and write primitives the orchestration engine needs from the backend.
///
/// The backend owns the real topology and converges asynchronously: a
/// successful `ungroup` or `join` only means the request was accepted.
#[async_trait]
pub trait SonosApiContract: Send + Sync {
    /// Current zones, one per independent group.
    async fn list_zones(&self) -> Result<Vec<Zone>, SonosError>;

    /// Detach `speaker`'s zone.
    async fn ungroup(&self, speaker: &Speaker) -> Result<(), SonosError>;

    /// Make `speaker` a member of `coordinator`'s zone.
    async fn join(&self, speaker: &Speaker, coordinator: &Speaker) -> Result<(), SonosError>;

    /// Resume playback on `speaker`.
    async fn play(&self, speaker: &Speaker) -> Result<(), SonosError>;

    async fn clear_queue(&self, speaker: &Speaker) -> Result<(), SonosError>;

    /// Append `uri` (e.g. `spotify:track:...`) to `speaker`'s queue.
    async fn queue_uri(&self, speaker: &Speaker, uri: &str) -> Result<(), SonosError>;
}

/// Client for the node-sonos-http-api style control surface
#[derive(Clone)]
pub struct SonosClient {
    client: Client,
    base_url: String,
}

impl SonosClient {
    /// Create a new client for the control surface at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        debug!(target: API_LOG_TARGET, "Creating new SonosClient with base_url: {}", base_url);

        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(target: API_LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
                Client::new()
            }
        };

        SonosClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for a path made of raw segments, percent-encoding each one.
    fn build_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get(&self, segments: &[&str]) -> Result<Response, SonosError> {
        let url = self.build_url(segments);
        debug!(target: API_LOG_TARGET, "Sending GET request to: {}", url);
        let response = self.client.get(&url).send().await?;
        Self::check_status(response).await
    }

    /// Sends a GET for a command endpoint; the response body is not needed.
    async fn command(&self, segments: &[&str]) -> Result<(), SonosError> {
        let response = self.get(segments).await?;
        trace!(target: API_LOG_TARGET, "Command accepted with status {}", response.status());
        Ok(())
    }

    async fn check_status(response: Response) -> Result<Response, SonosError> {
        let status = response.status();
        trace!(target: API_LOG_TARGET, "Response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        error!(target: API_LOG_TARGET, "Request failed. Status: {}, Body: {}", status, body);
        Err(SonosError::Status { status, body })
    }
}

#[async_trait]
impl SonosApiContract for SonosClient {
    #[instrument(skip(self))]
    async fn list_zones(&self) -> Result<Vec<Zone>, SonosError> {
        let response = self.get(&["zones"]).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Err(SonosError::InvalidResponse("Empty /zones body".to_string()));
        }
        let raw: Vec<ZoneResponse> = serde_json::from_str(&text).map_err(|e| {
            error!(target: API_LOG_TARGET, "JSON parsing error: {}. Full response text:\n{}", e, text);
            SonosError::InvalidResponse(format!("Failed to parse /zones response: {}", e))
        })?;
        debug!(target: API_LOG_TARGET, "Fetched {} zones", raw.len());
        Ok(raw.into_iter().map(Zone::from).collect())
    }

    #[instrument(skip_all, fields(speaker = %speaker))]
    async fn ungroup(&self, speaker: &Speaker) -> Result<(), SonosError> {
        self.command(&[speaker.room_name(), "ungroup"]).await
    }

    #[instrument(skip_all, fields(speaker = %speaker, coordinator = %coordinator))]
    async fn join(&self, speaker: &Speaker, coordinator: &Speaker) -> Result<(), SonosError> {
        self.command(&[speaker.room_name(), "join", coordinator.room_name()]).await
    }

    #[instrument(skip_all, fields(speaker = %speaker))]
    async fn play(&self, speaker: &Speaker) -> Result<(), SonosError> {
        self.command(&[speaker.room_name(), "play"]).await
    }

    #[instrument(skip_all, fields(speaker = %speaker))]
    async fn clear_queue(&self, speaker: &Speaker) -> Result<(), SonosError> {
        self.command(&[speaker.room_name(), "clearqueue"]).await
    }

    #[instrument(skip_all, fields(speaker = %speaker))]
    async fn queue_uri(&self, speaker: &Speaker, uri: &str) -> Result<(), SonosError> {
        self.command(&[speaker.room_name(), "queue", uri]).await
    }
}

#[cfg(test)]
impl SonosClient {
    pub(crate) fn url_for(&self, segments: &[&str]) -> String {
        self.build_url(segments)
    }
}
