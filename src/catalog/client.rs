//! HTTP client for the music catalog API.
//!
//! Authenticates with the client-credentials grant: the first lookup
//! requests a bearer token from the accounts host, and the token is held
//! with its expiry and renewed on demand. Token renewal is transport
//! state, not a connection-state transition — the connection itself is
//! established once.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ResolvedCatalogConfig;
use crate::telemetry;
use crate::types::{Artist, Track};
use crate::{JukeboxError, Result};

/// Network-level timeout for catalog calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Renew the token this long before the server-reported expiry, so a
/// token never goes stale mid-request.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Catalog API client.
pub struct CatalogClient {
    client_id: String,
    client_secret: String,
    api_base: String,
    auth_base: String,
    http: Client,
    token: Mutex<Option<BearerToken>>,
}

struct BearerToken {
    access_token: String,
    expires_at: Instant,
}

impl CatalogClient {
    /// Build a client from resolved configuration.
    ///
    /// The base URLs double as the test seam — point them at a mock
    /// server to exercise the wire protocol offline.
    pub(crate) fn new(config: ResolvedCatalogConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            auth_base: config.auth_base.trim_end_matches('/').to_string(),
            http,
            token: Mutex::new(None),
        }
    }

    /// Fetch full track metadata by ID.
    pub async fn track(&self, track_id: &str) -> Result<Track> {
        self.get_json(&format!("/v1/tracks/{track_id}"), "track", track_id)
            .await
    }

    /// Fetch full artist metadata by ID.
    pub async fn artist(&self, artist_id: &str) -> Result<Artist> {
        self.get_json(&format!("/v1/artists/{artist_id}"), "artist", artist_id)
            .await
    }

    /// A bearer token that is valid now, renewing it if needed.
    async fn bearer(&self) -> Result<String> {
        let mut slot = self.token.lock().await;

        if let Some(token) = slot.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting catalog access token");
        let url = format!("{}/api/token", self.auth_base);
        let outcome = self.request_token(&url).await;
        record_request("token", outcome.is_ok());
        let grant = outcome?;

        let lifetime = Duration::from_secs(grant.expires_in)
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        let access_token = grant.access_token.clone();
        *slot = Some(BearerToken {
            access_token: grant.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(access_token)
    }

    async fn request_token(&self, url: &str) -> Result<TokenResponse> {
        let response = self
            .http
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))?;

        handle_response_errors(&response, "token grant")?;

        response
            .json()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
        entity_id: &str,
    ) -> Result<T> {
        let token = self.bearer().await?;
        let url = format!("{}{}", self.api_base, path);

        let outcome = self.dispatch(&url, &token, action, entity_id).await;
        record_request(action, outcome.is_ok());
        outcome
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        action: &str,
        entity_id: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))?;

        handle_response_errors(&response, &format!("{action} {entity_id}"))?;

        response
            .json()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))
    }
}

fn record_request(action: &str, ok: bool) {
    metrics::counter!(
        telemetry::CATALOG_REQUESTS_TOTAL,
        "action" => action.to_string(),
        "status" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

/// Map non-success statuses onto the crate error taxonomy.
fn handle_response_errors(response: &reqwest::Response, context: &str) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 | 403 => Err(JukeboxError::AuthenticationFailed),
        404 => Err(JukeboxError::NotFound(context.to_string())),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(JukeboxError::RateLimited { retry_after })
        }
        code => Err(JukeboxError::Api {
            status: code,
            message: format!("catalog error: {status}"),
        }),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}
