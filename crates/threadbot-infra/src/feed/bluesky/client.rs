//! BlueskyClient -- [`FeedClient`] implementation over AT Protocol XRPC.
//!
//! Holds at most one session at a time. `authenticate` replaces it, so every
//! post is written as whichever persona logged in last.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use threadbot_core::feed::FeedClient;
use threadbot_types::error::FeedError;
use threadbot_types::persona::PersonaCredentials;
use threadbot_types::thread::{ReplyRefs, StrongRef};

use super::types::{
    CreateRecordRequest, CreateRecordResponse, CreateSessionRequest, CreateSessionResponse,
    PostRecord, XrpcErrorBody, POST_COLLECTION,
};

struct Session {
    access_jwt: SecretString,
    did: String,
}

/// Bluesky feed client.
pub struct BlueskyClient {
    client: reqwest::Client,
    service: String,
    session: Mutex<Option<Session>>,
}

impl BlueskyClient {
    /// Create a client for the PDS at `service`, e.g. `https://bsky.social`.
    pub fn new(service: &str) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            service: service.trim_end_matches('/').to_string(),
            session: Mutex::new(None),
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{method}", self.service)
    }

    /// The DID of the current session, if logged in.
    pub async fn session_did(&self) -> Option<String> {
        self.session.lock().await.as_ref().map(|s| s.did.clone())
    }
}

async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<XrpcErrorBody>(&body)
        .ok()
        .and_then(|b| b.describe())
        .unwrap_or_else(|| format!("HTTP {status}: {body}"))
}

impl FeedClient for BlueskyClient {
    async fn authenticate(&self, credentials: &PersonaCredentials) -> Result<(), FeedError> {
        let body = CreateSessionRequest {
            identifier: &credentials.identifier,
            password: credentials.password.expose_secret(),
        };

        let response = self
            .client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Drop any previous session so nothing is posted as the wrong persona.
            self.session.lock().await.take();
            return Err(FeedError::Authentication(error_detail(response).await));
        }

        let created: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Deserialization(format!("createSession: {e}")))?;

        tracing::debug!(
            identifier = %credentials.identifier,
            did = %created.did,
            "feed session created"
        );

        *self.session.lock().await = Some(Session {
            access_jwt: SecretString::from(created.access_jwt),
            did: created.did,
        });
        Ok(())
    }

    async fn submit_post(
        &self,
        text: &str,
        reply: Option<&ReplyRefs>,
    ) -> Result<StrongRef, FeedError> {
        let (token, did) = {
            let guard = self.session.lock().await;
            let session = guard.as_ref().ok_or(FeedError::NotAuthenticated)?;
            (
                SecretString::from(session.access_jwt.expose_secret().to_string()),
                session.did.clone(),
            )
        };

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let body = CreateRecordRequest {
            repo: &did,
            collection: POST_COLLECTION,
            record: PostRecord::new(text, created_at, reply),
        };

        let response = self
            .client
            .post(self.xrpc_url("com.atproto.repo.createRecord"))
            .bearer_auth(token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FeedError::Authentication(error_detail(response).await));
        }
        if !status.is_success() {
            return Err(FeedError::Rejected(error_detail(response).await));
        }

        let created: CreateRecordResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Deserialization(format!("createRecord: {e}")))?;

        Ok(StrongRef {
            uri: created.uri,
            cid: created.cid,
        })
    }
}
