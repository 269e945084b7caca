//! Bearer-token session lifecycle
//!
//! The token and the principal travel together: they are persisted in one
//! atomic write, restored together, and cleared together. Any persisted state
//! that cannot be decoded is discarded and the client falls back to the
//! public surface.

use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::backend::{ApiSurface, AuthApi};
use crate::error::{AppError, AppResult};
use crate::models::{AuthRequest, Principal, RegisterRequest};
use crate::storage::KeyValueStore;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized principal
pub const USER_KEY: &str = "user";

/// Source of the bearer token attached to authenticated calls
///
/// Read on every request so a rotated token is picked up without rebuilding
/// the gateway.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
}

/// Holds the current session and mirrors it to persistent storage
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Create an empty store; call [`SessionStore::restore`] to load
    /// persisted state
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// Create a store and restore any persisted session
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.restore();
        store
    }

    /// Reload the session from storage
    ///
    /// A principal that does not parse, or a token without a principal (or
    /// the reverse), wipes the persisted keys and leaves the store logged
    /// out.
    pub fn restore(&self) -> Option<Session> {
        let restored = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding persisted session: {}", e);
                if let Err(e) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
                    warn!("Failed to clear persisted session: {}", e);
                }
                None
            }
        };

        if let Some(session) = &restored {
            debug!("Restored session for {}", session.principal.username);
        }

        self.replace_current(restored.clone());
        restored
    }

    fn read_persisted(&self) -> AppResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) => {
                let principal = decode_principal(&user)?;
                if token.trim().is_empty() {
                    return Err(AppError::MalformedSession("empty token".to_string()));
                }
                Ok(Some(Session { token, principal }))
            }
            (Some(_), None) => Err(AppError::MalformedSession(
                "token stored without principal".to_string(),
            )),
            (None, Some(_)) => Err(AppError::MalformedSession(
                "principal stored without token".to_string(),
            )),
        }
    }

    /// Exchange credentials for a session
    ///
    /// On rejection the previous session, if any, stays in place.
    pub async fn login(&self, auth: &dyn AuthApi, credentials: &AuthRequest) -> AppResult<Session> {
        let response = auth.login(credentials).await?;

        let session = Session {
            token: response.token.clone(),
            principal: response.principal(),
        };

        let user = serde_json::to_string(&session.principal)?;
        self.storage
            .set_all(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user.as_str())])?;

        self.replace_current(Some(session.clone()));
        info!("Logged in as {} ({})", session.principal.username, session.principal.role);
        Ok(session)
    }

    /// Create an account; the current session is not touched
    pub async fn register(
        &self,
        auth: &dyn AuthApi,
        request: &RegisterRequest,
    ) -> AppResult<Option<serde_json::Value>> {
        let created = auth.register(request).await?;
        info!("Registered account {}", request.username);
        Ok(created)
    }

    /// Drop the session everywhere; safe to call when logged out
    pub fn logout(&self) -> AppResult<()> {
        self.replace_current(None);
        self.storage.remove_all(&[TOKEN_KEY, USER_KEY])?;
        debug!("Session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_current().is_some()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.read_current().map(|s| s.principal)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.read_current()
    }

    /// Surface the workflow should target right now
    pub fn current_surface(&self) -> ApiSurface {
        ApiSurface::from_authenticated(self.is_authenticated())
    }

    fn read_current(&self) -> Option<Session> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_current(&self, session: Option<Session>) {
        match self.current.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

impl TokenProvider for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.read_current().map(|s| s.token)
    }
}

/// Parse a persisted principal
pub fn decode_principal(raw: &str) -> AppResult<Principal> {
    serde_json::from_str(raw).map_err(|e| AppError::MalformedSession(e.to_string()))
}
