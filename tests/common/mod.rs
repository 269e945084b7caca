#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use person_manager::auth::SessionStore;
use person_manager::backend::HttpGateway;
use person_manager::config::ApiConfig;
use person_manager::models::PersonDraft;
use person_manager::storage::KeyValueStore;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const VALID_USERNAME: &str = "admin";
pub const VALID_PASSWORD: &str = "secret";
pub const ISSUED_TOKEN: &str = "issued-token-123";

/// Request as seen by the fake backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// In-memory stand-in for the person API
///
/// `/v1` is open; `/v2` answers 401 unless the bearer token matches one the
/// backend issued (or was told to accept).
#[derive(Default)]
pub struct FakeState {
    pub requests: Vec<RecordedRequest>,
    pub people: BTreeMap<i64, Value>,
    pub next_id: i64,
    pub accepted_tokens: Vec<String>,
    /// Canned (status, raw body) for the next request
    pub next_response: Option<(u16, String)>,
}

pub type SharedState = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub base_url: String,
    pub state: SharedState,
}

impl FakeBackend {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub fn seed(&self, person: Value) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let mut person = person;
        person["id"] = json!(id);
        state.people.insert(id, person);
        id
    }

    pub fn accept_token(&self, token: &str) {
        self.state
            .lock()
            .unwrap()
            .accepted_tokens
            .push(token.to_string());
    }

    pub fn respond_next(&self, status: u16, body: &str) {
        self.state.lock().unwrap().next_response = Some((status, body.to_string()));
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::with_base_url(&self.base_url)
    }

    pub fn gateway(&self, session: Arc<SessionStore>) -> Arc<HttpGateway> {
        Arc::new(HttpGateway::new(&self.api_config(), session).unwrap())
    }
}

pub async fn spawn_backend() -> FakeBackend {
    let state: SharedState = Arc::new(Mutex::new(FakeState::default()));
    state
        .lock()
        .unwrap()
        .accepted_tokens
        .push(ISSUED_TOKEN.to_string());

    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend {
        base_url: format!("http://{}/api", addr),
        state,
    }
}

/// Base URL of a port nobody listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

pub fn session_with(storage: Arc<dyn KeyValueStore>) -> Arc<SessionStore> {
    Arc::new(SessionStore::open(storage))
}

pub fn sample_person() -> Value {
    json!({
        "name": "Maria Silva",
        "cpf": "52998224725",
        "birthDate": "1990-05-12T00:00:00.000Z",
        "email": "maria@example.com",
        "placeOfBirth": "Recife",
        "address": "Rua das Flores, 10"
    })
}

pub fn complete_draft() -> PersonDraft {
    PersonDraft {
        name: "João Souza".to_string(),
        cpf: "111.444.777-35".to_string(),
        birth_date: Some("1985-11-30".to_string()),
        email: Some("joao@example.com".to_string()),
        nationality: Some("Brasileira".to_string()),
        ..Default::default()
    }
}

fn text(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

async fn handle(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let path = uri.path().to_string();

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if let Some((status, raw)) = state.next_response.take() {
        let status = StatusCode::from_u16(status).unwrap();
        return text(status, &raw);
    }

    let segments: Vec<&str> = path
        .trim_start_matches("/api/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        ["v1", "auth", "login"] if method == Method::POST => {
            let body = body.unwrap_or_default();
            if body["username"] == VALID_USERNAME && body["password"] == VALID_PASSWORD {
                (
                    StatusCode::OK,
                    Json(json!({
                        "token": ISSUED_TOKEN,
                        "username": VALID_USERNAME,
                        "role": "Admin"
                    })),
                )
                    .into_response()
            } else {
                text(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
        }
        ["v1", "auth", "register"] if method == Method::POST => (
            StatusCode::CREATED,
            Json(json!({ "message": "User registered successfully" })),
        )
            .into_response(),
        [version @ ("v1" | "v2"), "person", rest @ ..] => {
            if *version == "v2" {
                let authorized = authorization
                    .as_deref()
                    .and_then(|h| h.strip_prefix("Bearer "))
                    .is_some_and(|t| state.accepted_tokens.iter().any(|a| a == t));
                if !authorized {
                    return text(StatusCode::UNAUTHORIZED, "Unauthorized");
                }
            }
            let id = rest.first().and_then(|s| s.parse::<i64>().ok());
            person_route(&mut state, &method, id, body)
        }
        _ => text(StatusCode::NOT_FOUND, "No route"),
    }
}

fn person_route(state: &mut FakeState, method: &Method, id: Option<i64>, body: Option<Value>) -> Response {
    match (method.clone(), id) {
        (Method::GET, None) => {
            let people: Vec<Value> = state.people.values().cloned().collect();
            Json(people).into_response()
        }
        (Method::POST, None) => {
            let mut person = body.unwrap_or_default();
            state.next_id += 1;
            let id = state.next_id;
            person["id"] = json!(id);
            person["createdAt"] = json!("2024-06-15T12:00:00");
            state.people.insert(id, person.clone());
            (StatusCode::CREATED, Json(person)).into_response()
        }
        (Method::GET, Some(id)) => match state.people.get(&id) {
            Some(person) => Json(person.clone()).into_response(),
            None => text(StatusCode::NOT_FOUND, "Person not found"),
        },
        (Method::PUT, Some(id)) => {
            if !state.people.contains_key(&id) {
                return text(StatusCode::NOT_FOUND, "Person not found");
            }
            let mut person = body.unwrap_or_default();
            if person["id"] != json!(id) {
                return text(StatusCode::BAD_REQUEST, "Id mismatch");
            }
            person["updatedAt"] = json!("2024-06-16T08:30:00");
            state.people.insert(id, person.clone());
            Json(person).into_response()
        }
        (Method::DELETE, Some(id)) => match state.people.remove(&id) {
            Some(_) => StatusCode::NO_CONTENT.into_response(),
            None => text(StatusCode::NOT_FOUND, "Person not found"),
        },
        _ => text(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
    }
}
