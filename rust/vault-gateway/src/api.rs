//! HTTP endpoints of the gateway.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use vault_capability::Did;
use vault_ledger::{Confirmation, Ledger};
use vault_storage::StorageNetwork;
use vault_upload::{Pipeline, PipelineError, UploadRequest, UploadSource};

/// Largest request body accepted, base64 overhead included.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// The pipeline as wired by the gateway: any ledger, any storage session.
pub type GatewayPipeline = Pipeline<Arc<dyn Ledger>, Arc<dyn StorageNetwork>>;

/// Shared state of all handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<GatewayPipeline>,
    operator_token: Option<Arc<str>>,
}

impl AppState {
    /// Serve `pipeline`. Access grants stay disabled until an operator
    /// token is set.
    pub fn new(pipeline: GatewayPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            operator_token: None,
        }
    }

    /// Accept `POST /access` from callers presenting `token` as a bearer
    /// credential.
    pub fn with_operator_token(mut self, token: impl Into<String>) -> Self {
        self.operator_token = Some(Arc::from(token.into()));
        self
    }

    fn authorize_operator(&self, headers: &HeaderMap) -> Result<(), (StatusCode, Json<ApiError>)> {
        let Some(expected) = self.operator_token.as_deref() else {
            return Err(reject(
                StatusCode::FORBIDDEN,
                "Access grants are disabled on this gateway.",
            ));
        };

        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match presented {
            Some(token) if tokens_match(token, expected) => Ok(()),
            _ => Err(reject(
                StatusCode::UNAUTHORIZED,
                "Operator credentials are required to grant access.",
            )),
        }
    }
}

/// Compare without returning early on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |difference, (a, b)| difference | (a ^ b))
            == 0
}

/// Body of `POST /upload`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    /// File content, base64 encoded.
    pub file: String,
    /// The agent receiving the upload delegation.
    pub agent_did: String,
    /// The on-chain account that must be authorized.
    pub account: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub content_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AccessRequest {
    pub account: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AccessStatus {
    pub authorized: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GrantResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::MalformedPrincipal(_) => StatusCode::BAD_REQUEST,
        PipelineError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/access", post(request_access))
        .route("/access/:address", get(access_status))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn upload(
    State(state): State<AppState>,
    Json(body): Json<UploadBody>,
) -> ApiResult<UploadResponse> {
    let content = STANDARD
        .decode(body.file.as_bytes())
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "File must be base64 encoded."))?;
    let agent: Did = body
        .agent_did
        .parse()
        .map_err(|_| reject(StatusCode::BAD_REQUEST, "Invalid agent DID."))?;

    let request = UploadRequest {
        account: body.account,
        agent,
        source: UploadSource::Bytes(content),
    };

    match state.pipeline.run(request).await {
        Ok(receipt) => Ok(Json(UploadResponse {
            content_id: receipt.content_id.to_string(),
        })),
        Err(error) => {
            tracing::error!(%error, "upload failed");
            Err(reject(status_for(&error), error.user_message()))
        }
    }
}

async fn access_status(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<AccessStatus> {
    match state.pipeline.is_authorized(&address).await {
        Ok(authorized) => Ok(Json(AccessStatus { authorized })),
        Err(error) => {
            tracing::warn!(%address, %error, "authorization check failed");
            Err(reject(status_for(&error), error.to_string()))
        }
    }
}

async fn request_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AccessRequest>,
) -> ApiResult<GrantResponse> {
    if let Err(rejection) = state.authorize_operator(&headers) {
        tracing::warn!(account = %body.account, "access request without operator credentials");
        return Err(rejection);
    }

    match state.pipeline.request_access(&body.account).await {
        Ok(Confirmation::Unchanged) => Ok(Json(GrantResponse {
            status: "already-authorized".into(),
            transaction: None,
        })),
        Ok(Confirmation::Confirmed(receipt)) => Ok(Json(GrantResponse {
            status: "granted".into(),
            transaction: Some(receipt.transaction.to_string()),
        })),
        Err(error) => {
            tracing::warn!(account = %body.account, %error, "access request failed");
            Err(reject(status_for(&error), error.to_string()))
        }
    }
}
