pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod resource;
pub mod schema;
pub mod storage;
pub mod utils;

// Re-export commonly used types for easier access
pub use auth::{Session, SessionStore, TokenProvider};
pub use backend::{ApiSurface, AuthApi, HttpGateway, PersonApi};
pub use error::{AppError, AppResult};
pub use models::{Person, PersonDraft, Principal};
pub use resource::PersonWorkflow;
