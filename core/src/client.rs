//! HTTP client for the player backend.
//!
//! [`BackendClient`] is the seam the rest of the console talks to;
//! [`HttpBackend`] is the reqwest implementation used at runtime.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::connections::ConnectionQuery;
use crate::error::LookupError;
use crate::error::LookupResult;
use crate::model::ConnectionView;
use crate::model::Note;
use crate::model::PlayerKey;
use crate::model::PlayerRecord;
use crate::notes::NoteSubmission;

const USER_AGENT: &str = concat!("warden/", env!("CARGO_PKG_VERSION"));

/// Outcome of resolving a key. A missing player is an expected answer, not
/// an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Box<PlayerRecord>),
    NotFound,
}

#[async_trait]
pub trait BackendClient: Send + Sync {
    /// `GET /User?ckey=` or `GET /User?discordId=`. A 404 maps to
    /// [`Resolution::NotFound`].
    async fn resolve(&self, key: &PlayerKey) -> LookupResult<Resolution>;

    async fn connections(
        &self,
        query: ConnectionQuery,
        ckey: &str,
    ) -> LookupResult<ConnectionView>;

    /// Notes the given admin has placed on other players.
    async fn applied_notes(&self, player_id: i64) -> LookupResult<Vec<Note>>;

    /// Returns whether the backend acknowledged the note with a non-empty
    /// body.
    async fn submit_note(
        &self,
        player_id: i64,
        submission: &NoteSubmission,
    ) -> LookupResult<bool>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> LookupResult<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Self::with_client(client, base_url)
    }

    /// Useful for tests or custom TLS/proxy setups.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> LookupResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| LookupError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(LookupError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn resolve(&self, key: &PlayerKey) -> LookupResult<Resolution> {
        let (name, value) = key.query_pair();
        tracing::debug!("resolving player by {name}");
        let response = self
            .client
            .get(self.endpoint("/User"))
            .query(&[(name, value.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("player {key} not found");
            return Ok(Resolution::NotFound);
        }
        let record: PlayerRecord = decode_json(expect_success(response).await?).await?;
        Ok(Resolution::Found(Box::new(record)))
    }

    async fn connections(
        &self,
        query: ConnectionQuery,
        ckey: &str,
    ) -> LookupResult<ConnectionView> {
        tracing::debug!("fetching {query:?} connections for {ckey}");
        let response = self
            .client
            .get(self.endpoint(query.path()))
            .query(&[("ckey", ckey)])
            .send()
            .await?;
        decode_json(expect_success(response).await?).await
    }

    async fn applied_notes(&self, player_id: i64) -> LookupResult<Vec<Note>> {
        let response = self
            .client
            .get(self.endpoint(&format!("/User/{player_id}/AppliedNotes")))
            .send()
            .await?;
        let notes: Option<Vec<Note>> = decode_json(expect_success(response).await?).await?;
        Ok(notes.unwrap_or_default())
    }

    async fn submit_note(
        &self,
        player_id: i64,
        submission: &NoteSubmission,
    ) -> LookupResult<bool> {
        let fields = submission.form_fields();
        let response = self
            .client
            .post(self.endpoint(&format!("/User/{player_id}/Note")))
            .form(&fields[..])
            .send()
            .await?;
        let body = expect_success(response).await?.text().await?;
        let acknowledged = !body.is_empty();
        tracing::info!(player_id, acknowledged, "note submitted");
        Ok(acknowledged)
    }
}

async fn expect_success(response: reqwest::Response) -> LookupResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("backend request to {path} failed with {status}");
    Err(LookupError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> LookupResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
}
