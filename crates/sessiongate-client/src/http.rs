//! `SessionApi` over the HTTP surface, using reqwest.

use async_trait::async_trait;
use reqwest::{Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use sessiongate_core::types::SessionId;

use crate::api::{DeviceSession, RegisterReply, RemoteStatus, SessionApi};
use crate::error::ClientError;

/// HTTP client bound to one server and one bearer token.
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    status: String,
    #[serde(default)]
    active_devices: Option<Vec<DeviceSession>>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: RemoteStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl HttpSessionApi {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The bearer token sent with every call.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to parse response: {e}")))
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.message),
            Err(_) => (status.to_string(), text),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn register(
        &self,
        session_id: &SessionId,
        device_info: Option<&str>,
    ) -> Result<RegisterReply, ClientError> {
        let url = self.endpoint(&["api", "session", "register"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "session_id": session_id, "device_info": device_info }))
            .send()
            .await?;
        let body: RegisterBody = Self::read_json(response).await?;
        debug!(session_id = %session_id, status = %body.status, "Register answered");

        match body.status.as_str() {
            "success" => Ok(RegisterReply::Success),
            "limit_reached" => Ok(RegisterReply::LimitReached {
                active_devices: body.active_devices.unwrap_or_default(),
            }),
            other => Err(ClientError::Decode(format!(
                "unknown registration status '{other}'"
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<DeviceSession>, ClientError> {
        let url = self.endpoint(&["api", "sessions"])?;
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        Self::read_json(response).await
    }

    async fn status(&self, session_id: &SessionId) -> Result<RemoteStatus, ClientError> {
        let mut url = self.endpoint(&["api", "session", "status"])?;
        url.query_pairs_mut()
            .append_pair("session_id", session_id.as_str());
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        let body: StatusBody = Self::read_json(response).await?;
        Ok(body.status)
    }

    async fn evict(&self, session_id: &SessionId) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "session", session_id.as_str()])?;
        let response = self.http.delete(url).bearer_auth(&self.token).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn logout(&self, session_id: &SessionId) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "session", "logout"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "session_id": session_id }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
