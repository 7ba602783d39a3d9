use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use vault_capability::{Abilities, Did, Ed25519Signer, Principal};
use vault_storage::{
    Client, ContentId, DELEGATION_HEADER, MemoryService, ProvisionRequest, RegisterUpload,
    RestService, RestServiceConfig, Service, ServiceError, StorageError, StorageNetwork,
    UploadList, decode_proof,
};

fn into_response(error: ServiceError) -> Response {
    match error {
        ServiceError::VerificationRequired(_) => (
            StatusCode::FORBIDDEN,
            "Please verify your email address before uploading",
        )
            .into_response(),
        ServiceError::Unauthorized(reason) => (StatusCode::FORBIDDEN, reason).into_response(),
        ServiceError::NotFound(reason) => (StatusCode::NOT_FOUND, reason).into_response(),
        ServiceError::Rejected(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
        ServiceError::Unreachable(reason) => {
            (StatusCode::SERVICE_UNAVAILABLE, reason).into_response()
        }
    }
}

fn parse_space(space: &str) -> Result<Did, Response> {
    space
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid space").into_response())
}

fn proof(headers: &HeaderMap) -> Result<vault_capability::Delegation, Response> {
    let header = headers
        .get(DELEGATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "missing proof").into_response())?;
    decode_proof(header).map_err(into_response)
}

/// Handle PUT /spaces/:space
async fn handle_provision(
    State(service): State<MemoryService>,
    Path(space): Path<String>,
    Json(request): Json<ProvisionRequest>,
) -> Response {
    let space = match parse_space(&space) {
        Ok(space) => space,
        Err(response) => return response,
    };
    match service.provision(&space, &request.agent).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => into_response(error),
    }
}

/// Handle PUT /spaces/:space/blobs/:cid
async fn handle_blob(
    State(service): State<MemoryService>,
    Path((space, cid)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (space, proof) = match (parse_space(&space), proof(&headers)) {
        (Ok(space), Ok(proof)) => (space, proof),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    let Ok(content) = cid.parse::<ContentId>() else {
        return (StatusCode::BAD_REQUEST, "invalid cid").into_response();
    };
    match service.add_blob(&space, &content, body.to_vec(), &proof).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => into_response(error),
    }
}

/// Handle POST /spaces/:space/uploads
async fn handle_register(
    State(service): State<MemoryService>,
    Path(space): Path<String>,
    headers: HeaderMap,
    Json(request): Json<RegisterUpload>,
) -> Response {
    let (space, proof) = match (parse_space(&space), proof(&headers)) {
        (Ok(space), Ok(proof)) => (space, proof),
        (Err(response), _) | (_, Err(response)) => return response,
    };
    match service.register_upload(&space, &request.root, &proof).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => into_response(error),
    }
}

/// Handle GET /spaces/:space/uploads
async fn handle_list(State(service): State<MemoryService>, Path(space): Path<String>) -> Response {
    let space = match parse_space(&space) {
        Ok(space) => space,
        Err(response) => return response,
    };
    match service.uploads(&space).await {
        Ok(uploads) => Json(UploadList { uploads }).into_response(),
        Err(error) => into_response(error),
    }
}

/// Create and start test server, return the URL
async fn start_test_server(service: MemoryService) -> String {
    let app = Router::new()
        .route("/spaces/:space", put(handle_provision))
        .route("/spaces/:space/blobs/:cid", put(handle_blob))
        .route(
            "/spaces/:space/uploads",
            get(handle_list).post(handle_register),
        )
        .with_state(service);

    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn client(url: String) -> Client<RestService> {
    let agent = Ed25519Signer::import(&[5; 32]).unwrap();
    Client::new(agent, RestService::new(RestServiceConfig::new(url).with_timeout(5)))
}

#[tokio::test]
async fn it_uploads_through_the_rest_service() -> anyhow::Result<()> {
    let service = MemoryService::new();
    let client = client(start_test_server(service.clone()).await);

    let space = client.create_space("MySpace").await?;
    client.set_current_space(&space.did).await?;
    let proof = client
        .create_delegation(&client.agent(), Abilities::upload())
        .await?;

    let root = client.upload_bytes(b"hello".to_vec(), &proof).await?;

    assert_eq!(root, ContentId::for_bytes(b"hello"));
    assert_eq!(service.blob(&space.did, &root).await, Some(b"hello".to_vec()));
    assert_eq!(service.owner(&space.did).await, Some(client.agent()));
    assert_eq!(client.service().uploads(&space.did).await?, vec![root]);
    Ok(())
}

#[tokio::test]
async fn verification_requirements_are_recognised() -> anyhow::Result<()> {
    let service = MemoryService::new();
    let client = client(start_test_server(service.clone()).await);

    let space = client.create_space("MySpace").await?;
    client.set_current_space(&space.did).await?;
    let proof = client
        .create_delegation(&client.agent(), Abilities::upload())
        .await?;
    service.set_verification_required(true).await;

    let result = client.upload_bytes(b"hello".to_vec(), &proof).await;

    assert!(matches!(
        result,
        Err(StorageError::Service(ServiceError::VerificationRequired(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn foreign_proofs_are_unauthorized() -> anyhow::Result<()> {
    let service = MemoryService::new();
    let client = client(start_test_server(service).await);

    let space = client.create_space("MySpace").await?;
    client.set_current_space(&space.did).await?;

    let stranger = Ed25519Signer::import(&[6; 32])?;
    let forged =
        vault_capability::Delegation::issue(&stranger, &client.agent(), Abilities::upload())?;

    let result = client.upload_bytes(b"hello".to_vec(), &forged).await;

    assert!(matches!(
        result,
        Err(StorageError::Service(ServiceError::Unauthorized(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn unknown_spaces_are_not_found() -> anyhow::Result<()> {
    let url = start_test_server(MemoryService::new()).await;
    let rest = RestService::new(RestServiceConfig::new(url));
    let space = Ed25519Signer::import(&[8; 32])?.did();

    assert!(matches!(
        rest.uploads(&space).await,
        Err(ServiceError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn server_errors_are_reported_as_unreachable() -> anyhow::Result<()> {
    let app = Router::new().route(
        "/spaces/:space",
        put(|| async { StatusCode::BAD_GATEWAY }),
    );
    let rest = RestService::new(RestServiceConfig::new(serve(app).await));
    let space = Ed25519Signer::import(&[8; 32])?;

    assert!(matches!(
        rest.provision(&space.did(), &space.did()).await,
        Err(ServiceError::Unreachable(_))
    ));
    Ok(())
}

#[tokio::test]
async fn closed_endpoints_are_unreachable() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let rest = RestService::new(RestServiceConfig::new(format!("http://{}", addr)));
    let space = Ed25519Signer::import(&[8; 32])?;

    assert!(matches!(
        rest.provision(&space.did(), &space.did()).await,
        Err(ServiceError::Unreachable(_))
    ));
    Ok(())
}

#[tokio::test]
async fn configured_headers_are_sent() -> anyhow::Result<()> {
    async fn require_token(headers: HeaderMap) -> StatusCode {
        let bearer = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let tenant = headers.get("x-tenant").and_then(|value| value.to_str().ok());
        match (bearer, tenant) {
            (Some("Bearer secret"), Some("vault")) => StatusCode::NO_CONTENT,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    let url = serve(Router::new().route("/spaces/:space", put(require_token))).await;
    let space = Ed25519Signer::import(&[8; 32])?;

    let anonymous = RestService::new(RestServiceConfig::new(url.clone()));
    assert!(matches!(
        anonymous.provision(&space.did(), &space.did()).await,
        Err(ServiceError::Unauthorized(_))
    ));

    let authenticated = RestService::new(
        RestServiceConfig::new(url)
            .with_auth(vault_storage::AuthMethod::Bearer("secret".into()))
            .with_header("x-tenant", "vault"),
    );
    authenticated.provision(&space.did(), &space.did()).await?;
    Ok(())
}
