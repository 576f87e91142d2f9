//! Fake Pet Manager API served by axum on a random local port.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use parking_lot::Mutex;
use serde_json::{Value, json};

use petmanager_infrastructure::AppConfig;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin";

#[derive(Debug, Default)]
pub struct ServerState {
    /// Access token currently accepted; empty accepts nothing.
    pub valid_token: String,
    /// Refresh token currently accepted.
    pub valid_refresh: String,
    /// Whether the refresh endpoint honours a valid refresh token.
    pub refresh_enabled: bool,
    pub issued: u32,
    pub refresh_calls: usize,
    /// Bearer tokens seen on resource requests, in arrival order.
    pub bearers: Vec<String>,
    /// Last multipart upload: (content type, body).
    pub last_upload: Option<(String, Vec<u8>)>,
}

#[derive(Clone, Default)]
pub struct FakeApi {
    pub state: Arc<Mutex<ServerState>>,
}

impl FakeApi {
    /// Invalidates the current access token, as if it expired.
    pub fn expire_access_token(&self) {
        self.state.lock().valid_token.clear();
    }

    pub fn disable_refresh(&self) {
        self.state.lock().refresh_enabled = false;
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().refresh_calls
    }

    pub fn bearers(&self) -> Vec<String> {
        self.state.lock().bearers.clone()
    }

    pub fn last_upload(&self) -> Option<(String, Vec<u8>)> {
        self.state.lock().last_upload.clone()
    }

    /// Accepts `access` and `refresh` as if they had been issued earlier.
    pub fn accept(&self, access: &str, refresh: &str) {
        let mut state = self.state.lock();
        state.valid_token = access.to_string();
        state.valid_refresh = refresh.to_string();
    }

    fn issue(&self) -> Value {
        let mut state = self.state.lock();
        state.issued += 1;
        state.valid_token = format!("T{}", state.issued);
        state.valid_refresh = format!("R{}", state.issued);
        json!({
            "access_token": state.valid_token,
            "refreshToken": state.valid_refresh,
            "expires_in": 300,
            "refresh_expires_in": 1800
        })
    }

    /// Records the bearer and returns true if it is the valid token.
    fn authorize(&self, headers: &HeaderMap) -> bool {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default()
            .to_string();
        let mut state = self.state.lock();
        let ok = !state.valid_token.is_empty() && bearer == state.valid_token;
        state.bearers.push(bearer);
        ok
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, axum::Json(json!({"message": "token inválido"}))).into_response()
}

async fn login(State(api): State<FakeApi>, axum::Json(body): axum::Json<Value>) -> Response {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        axum::Json(api.issue()).into_response()
    } else {
        unauthorized()
    }
}

async fn refresh(State(api): State<FakeApi>, axum::Json(body): axum::Json<Value>) -> Response {
    let accepted = {
        let mut state = api.state.lock();
        state.refresh_calls += 1;
        state.refresh_enabled && body["refreshToken"] == state.valid_refresh.as_str()
    };
    if accepted {
        axum::Json(api.issue()).into_response()
    } else {
        unauthorized()
    }
}

async fn list_pets(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    axum::Json(json!({
        "page": 0,
        "size": 10,
        "total": 2,
        "pageCount": 1,
        "content": [
            {"id": 1, "nome": "Rex", "raca": "Labrador", "idade": 3},
            {"id": 2, "nome": "Mel", "raca": "SRD", "idade": 2}
        ]
    }))
    .into_response()
}

async fn list_tutors(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    axum::Json(json!({
        "page": 0,
        "size": 10,
        "total": 1,
        "pageCount": 1,
        "content": [{"id": 9, "nome": "Ana", "telefone": "65999990000", "endereco": "Rua A"}]
    }))
    .into_response()
}

async fn update_pet(
    State(api): State<FakeApi>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    axum::Json(json!({
        "id": id,
        "nome": body["nome"],
        "raca": body["raca"],
        "idade": body["idade"]
    }))
    .into_response()
}

async fn upload_pet_photo(
    State(api): State<FakeApi>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !api.authorize(&headers) {
        return unauthorized();
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    api.state.lock().last_upload = Some((content_type, body.to_vec()));
    axum::Json(json!({
        "id": id,
        "nome": "Rex",
        "raca": "Labrador",
        "idade": 3,
        "urlFoto": format!("https://cdn.example/pets/{id}.jpg")
    }))
    .into_response()
}

/// Starts the fake API and returns it with a config pointing at it.
pub async fn spawn_api() -> (FakeApi, AppConfig) {
    let api = FakeApi::default();
    api.state.lock().refresh_enabled = true;

    let app = Router::new()
        .route("/autenticacao/login", post(login))
        .route("/autenticacao/refresh", put(refresh))
        .route("/v1/pets", get(list_pets))
        .route("/v1/pets/{id}", put(update_pet))
        .route("/v1/pets/{id}/fotos", post(upload_pet_photo))
        .route("/v1/tutores", get(list_tutors))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let env = [("PETMANAGER_API_URL".to_string(), format!("http://{addr}"))]
        .into_iter()
        .collect();
    let config = AppConfig::from_sources(None, Some(env)).unwrap();
    (api, config)
}
