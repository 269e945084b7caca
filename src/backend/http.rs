//! `reqwest` implementation of the dual-surface gateway

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use super::{ApiSurface, AuthApi, PersonApi};
use crate::auth::TokenProvider;
use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::logging::{log_exchange, log_transport_failure};
use crate::models::{AuthRequest, AuthResponse, Person, RegisterRequest};

pub const LOGIN_PATH: &str = "/v1/auth/login";
pub const REGISTER_PATH: &str = "/v1/auth/register";

/// HTTP gateway to the person API
///
/// Stateless apart from the token provider, which is consulted on every
/// authenticated call. Each request is attempted exactly once.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenProvider>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn person_url(&self, surface: ApiSurface, id: Option<i64>) -> String {
        match id {
            Some(id) => format!("{}{}/{}", self.base_url, surface.person_path(), id),
            None => format!("{}{}", self.base_url, surface.person_path()),
        }
    }

    /// Send one request and map the response
    ///
    /// Non-2xx becomes `RequestFailed`, 204 becomes `None`, any other 2xx
    /// body is decoded as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
        surface: ApiSurface,
    ) -> AppResult<Option<T>> {
        let mut request = self.client.request(method.clone(), &url);

        let mut authorized = false;
        if surface.requires_token() {
            match self.tokens.bearer_token() {
                Some(token) => {
                    request = request.bearer_auth(token);
                    authorized = true;
                }
                None => warn!("No session token for authenticated call to {}", url),
            }
        }

        if let Some(body) = &body {
            request = request.json(body);
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log_transport_failure(&method, &url, start.elapsed(), &e.to_string());
                return Err(AppError::Network(e.to_string()));
            }
        };

        let status = response.status();
        log_exchange(&method, &url, status.as_u16(), start.elapsed(), authorized);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl PersonApi for HttpGateway {
    async fn list(&self, surface: ApiSurface) -> AppResult<Vec<Person>> {
        let url = self.person_url(surface, None);
        let people = self.execute(Method::GET, url, None, surface).await?;
        Ok(people.unwrap_or_default())
    }

    async fn get(&self, surface: ApiSurface, id: i64) -> AppResult<Option<Person>> {
        let url = self.person_url(surface, Some(id));
        self.execute(Method::GET, url, None, surface).await
    }

    async fn create(&self, surface: ApiSurface, person: &Person) -> AppResult<Option<Person>> {
        let url = self.person_url(surface, None);
        let body = serde_json::to_value(person)?;
        self.execute(Method::POST, url, Some(body), surface).await
    }

    async fn update(
        &self,
        surface: ApiSurface,
        id: i64,
        person: &Person,
    ) -> AppResult<Option<Person>> {
        // Path id wins over whatever the record carried
        let body = Person {
            id: Some(id),
            ..person.clone()
        };
        let url = self.person_url(surface, Some(id));
        let body = serde_json::to_value(&body)?;
        self.execute(Method::PUT, url, Some(body), surface).await
    }

    async fn delete(&self, surface: ApiSurface, id: i64) -> AppResult<Option<Person>> {
        let url = self.person_url(surface, Some(id));
        self.execute(Method::DELETE, url, None, surface).await
    }
}

#[async_trait]
impl AuthApi for HttpGateway {
    async fn login(&self, credentials: &AuthRequest) -> AppResult<AuthResponse> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let body = serde_json::to_value(credentials)?;

        match self
            .execute::<AuthResponse>(Method::POST, url, Some(body), ApiSurface::Public)
            .await
        {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(AppError::AuthRejected {
                status: StatusCode::NO_CONTENT.as_u16(),
                body: "login returned no session".to_string(),
            }),
            Err(AppError::RequestFailed { status, body }) => {
                Err(AppError::AuthRejected { status, body })
            }
            Err(e) => Err(e),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<Option<Value>> {
        let url = format!("{}{}", self.base_url, REGISTER_PATH);
        let body = serde_json::to_value(request)?;
        self.execute(Method::POST, url, Some(body), ApiSurface::Public)
            .await
    }
}
