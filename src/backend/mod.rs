use async_trait::async_trait;
use std::fmt;

use crate::error::AppResult;
use crate::models::{AuthRequest, AuthResponse, Person, RegisterRequest};

pub mod http;

pub use http::HttpGateway;

/// Which of the two REST surfaces a call targets
///
/// The public surface (`/v1`) is open and carries no address; the
/// authenticated surface (`/v2`) requires a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSurface {
    Public,
    Authenticated,
}

impl ApiSurface {
    pub fn from_authenticated(authenticated: bool) -> Self {
        if authenticated {
            ApiSurface::Authenticated
        } else {
            ApiSurface::Public
        }
    }

    /// Collection path of person records on this surface
    pub fn person_path(&self) -> &'static str {
        match self {
            ApiSurface::Public => "/v1/person",
            ApiSurface::Authenticated => "/v2/person",
        }
    }

    pub fn requires_token(&self) -> bool {
        matches!(self, ApiSurface::Authenticated)
    }
}

impl fmt::Display for ApiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiSurface::Public => write!(f, "public"),
            ApiSurface::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Person CRUD against either surface
///
/// The caller picks the surface; implementations route and attach
/// credentials but never decide the mode themselves. `None` results stand
/// for a `204 No Content` answer.
#[async_trait]
pub trait PersonApi: Send + Sync {
    async fn list(&self, surface: ApiSurface) -> AppResult<Vec<Person>>;

    async fn get(&self, surface: ApiSurface, id: i64) -> AppResult<Option<Person>>;

    async fn create(&self, surface: ApiSurface, person: &Person) -> AppResult<Option<Person>>;

    /// Full replacement; the submitted body always carries `id`
    async fn update(
        &self,
        surface: ApiSurface,
        id: i64,
        person: &Person,
    ) -> AppResult<Option<Person>>;

    async fn delete(&self, surface: ApiSurface, id: i64) -> AppResult<Option<Person>>;
}

/// Account endpoints, public surface only
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &AuthRequest) -> AppResult<AuthResponse>;

    async fn register(&self, request: &RegisterRequest) -> AppResult<Option<serde_json::Value>>;
}
