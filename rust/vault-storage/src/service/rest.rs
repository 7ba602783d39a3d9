//! REST transport for a remote storage service.

use crate::{ContentId, Service, ServiceError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use vault_capability::{Delegation, Did};

/// Header carrying the base64 DAG-CBOR encoded proof of a write.
pub const DELEGATION_HEADER: &str = "X-Delegation";

/// Request timeout used unless configured otherwise. Blob writes carry
/// whole files, so this is well above a typical API call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// How the gateway identifies itself to the storage service.
///
/// Writes are authorized by their delegation regardless; this only
/// identifies the caller, for services that meter or rate limit by account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthMethod {
    #[default]
    None,

    /// An API token, sent as `Authorization: Bearer {token}`.
    Bearer(String),
}

/// Where and how to reach a storage service over HTTP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestServiceConfig {
    /// Root of the storage API. Space routes live under
    /// `{endpoint}/spaces`; a trailing slash is ignored.
    pub endpoint: String,

    pub auth_method: AuthMethod,

    /// Per request timeout, `None` to wait indefinitely.
    pub timeout_seconds: Option<u64>,

    /// Extra headers for every request, such as a tenant or API version.
    pub headers: Vec<(String, String)>,
}

impl RestServiceConfig {
    /// Reach the service at `endpoint`, anonymously, with the
    /// [`DEFAULT_TIMEOUT_SECONDS`].
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_method: AuthMethod::None,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            headers: Vec::new(),
        }
    }

    pub fn with_auth(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Give up on requests after `seconds`.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Wait on requests for as long as the service takes.
    pub fn without_timeout(mut self) -> Self {
        self.timeout_seconds = None;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Body of `PUT /spaces/{space}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// The agent that owns the space.
    pub agent: Did,
}

/// Body of `POST /spaces/{space}/uploads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUpload {
    /// Root of the upload.
    pub root: ContentId,
}

/// Body of `GET /spaces/{space}/uploads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadList {
    /// Registered uploads, oldest first.
    pub uploads: Vec<ContentId>,
}

/// Encode a delegation for the [`DELEGATION_HEADER`].
pub fn encode_proof(proof: &Delegation) -> Result<String, ServiceError> {
    let bytes = proof
        .to_bytes()
        .map_err(|error| ServiceError::Rejected(error.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

/// Decode a delegation from the [`DELEGATION_HEADER`].
pub fn decode_proof(header: &str) -> Result<Delegation, ServiceError> {
    let bytes = STANDARD
        .decode(header.trim())
        .map_err(|error| ServiceError::Unauthorized(format!("invalid proof encoding: {error}")))?;
    Delegation::from_bytes(&bytes).map_err(|error| ServiceError::Unauthorized(error.to_string()))
}

/// A [`Service`] reached over HTTP:
///
/// - PUT `{endpoint}/spaces/{space}` - provision a space
/// - PUT `{endpoint}/spaces/{space}/blobs/{cid}` - store raw bytes
/// - POST `{endpoint}/spaces/{space}/uploads` - register an upload root
/// - GET `{endpoint}/spaces/{space}/uploads` - list uploads
///
/// Writes carry their proof in the [`DELEGATION_HEADER`]. A `403` whose body
/// mentions verification is reported as [`ServiceError::VerificationRequired`].
#[derive(Clone)]
pub struct RestService {
    config: RestServiceConfig,
    client: Client,
}

impl RestService {
    /// Create a new REST service with the given configuration
    pub fn new(config: RestServiceConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout_seconds {
            client_builder = client_builder.timeout(std::time::Duration::from_secs(timeout));
        }

        let client = client_builder.build().unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn url_for_space(&self, space: &Did) -> String {
        format!("{}/spaces/{}", self.config.endpoint.trim_end_matches('/'), space)
    }

    /// Build a request with authentication and custom headers
    fn build_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;

        match &self.config.auth_method {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                builder = builder.bearer_auth(token);
            }
        }

        for (key, value) in &self.config.headers {
            builder = builder.header(key, value);
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = self
            .build_request(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Unreachable(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %body, "storage service refused request");

        Err(match status {
            StatusCode::FORBIDDEN if body.to_lowercase().contains("verif") => {
                ServiceError::VerificationRequired(body)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(body),
            StatusCode::NOT_FOUND => ServiceError::NotFound(body),
            status if status.is_server_error() => ServiceError::Unreachable(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )),
            status => ServiceError::Rejected(format!("HTTP {} - {}", status.as_u16(), body)),
        })
    }
}

#[async_trait]
impl Service for RestService {
    async fn provision(&self, space: &Did, agent: &Did) -> Result<(), ServiceError> {
        let request = self
            .client
            .put(self.url_for_space(space))
            .json(&ProvisionRequest {
                agent: agent.clone(),
            });
        self.send(request).await?;
        Ok(())
    }

    async fn add_blob(
        &self,
        space: &Did,
        content: &ContentId,
        bytes: Vec<u8>,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        let url = format!("{}/blobs/{}", self.url_for_space(space), content);
        let request = self
            .client
            .put(url)
            .header(DELEGATION_HEADER, encode_proof(proof)?)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        self.send(request).await?;
        Ok(())
    }

    async fn register_upload(
        &self,
        space: &Did,
        root: &ContentId,
        proof: &Delegation,
    ) -> Result<(), ServiceError> {
        let url = format!("{}/uploads", self.url_for_space(space));
        let request = self
            .client
            .post(url)
            .header(DELEGATION_HEADER, encode_proof(proof)?)
            .json(&RegisterUpload { root: *root });
        self.send(request).await?;
        Ok(())
    }

    async fn uploads(&self, space: &Did) -> Result<Vec<ContentId>, ServiceError> {
        let url = format!("{}/uploads", self.url_for_space(space));
        let response = self.send(self.client.get(url)).await?;
        let list: UploadList = response
            .json()
            .await
            .map_err(|e| ServiceError::Rejected(format!("Invalid upload list: {}", e)))?;
        Ok(list.uploads)
    }
}
