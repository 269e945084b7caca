mod common;

use common::{sample_person, spawn_backend, ISSUED_TOKEN, VALID_PASSWORD, VALID_USERNAME};
use person_manager::auth::{SessionStore, TokenProvider, TOKEN_KEY, USER_KEY};
use person_manager::backend::{ApiSurface, PersonApi};
use person_manager::models::AuthRequest;
use person_manager::storage::{FileStore, KeyValueStore};
use std::sync::Arc;

fn credentials(password: &str) -> AuthRequest {
    AuthRequest {
        username: VALID_USERNAME.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_survives_restart() {
    let backend = spawn_backend().await;
    backend.seed(sample_person());
    let dir = tempfile::tempdir().unwrap();

    {
        let session = Arc::new(SessionStore::open(Arc::new(FileStore::new(dir.path()))));
        assert!(!session.is_authenticated());

        let gateway = backend.gateway(session.clone());
        let logged_in = session
            .login(gateway.as_ref(), &credentials(VALID_PASSWORD))
            .await
            .unwrap();
        assert_eq!(logged_in.token, ISSUED_TOKEN);
        assert_eq!(logged_in.principal.role, "Admin");
    }

    // New process: same directory, fresh store
    let session = Arc::new(SessionStore::open(Arc::new(FileStore::new(dir.path()))));
    assert!(session.is_authenticated());
    assert_eq!(session.current_principal().unwrap().username, VALID_USERNAME);
    assert_eq!(session.current_surface(), ApiSurface::Authenticated);

    let gateway = backend.gateway(session.clone());
    let people = gateway.list(session.current_surface()).await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(
        backend.last_request().authorization.as_deref(),
        Some(format!("Bearer {}", ISSUED_TOKEN).as_str())
    );
}

#[tokio::test]
async fn test_malformed_principal_on_disk_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    storage
        .set_all(&[(TOKEN_KEY, ISSUED_TOKEN), (USER_KEY, "{\"username\": ")])
        .unwrap();

    let session = SessionStore::new(storage.clone());
    assert!(session.restore().is_none());
    assert!(!session.is_authenticated());
    assert_eq!(session.bearer_token(), None);

    // No orphaned token left behind
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn test_corrupt_session_document_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    std::fs::write(storage.path(), "garbage").unwrap();

    let session = SessionStore::open(storage.clone());
    assert!(!session.is_authenticated());
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn test_rejected_login_keeps_prior_session() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    let session = Arc::new(SessionStore::open(storage.clone()));
    let gateway = backend.gateway(session.clone());

    session
        .login(gateway.as_ref(), &credentials(VALID_PASSWORD))
        .await
        .unwrap();

    let err = session
        .login(gateway.as_ref(), &credentials("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "AUTH_REJECTED");

    assert!(session.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some(ISSUED_TOKEN));
}

#[tokio::test]
async fn test_rejected_first_login_persists_nothing() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    let session = Arc::new(SessionStore::open(storage.clone()));
    let gateway = backend.gateway(session.clone());

    assert!(session
        .login(gateway.as_ref(), &credentials("wrong"))
        .await
        .is_err());
    assert!(!session.is_authenticated());
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn test_logout_drops_authorization_header() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let session = Arc::new(SessionStore::open(Arc::new(FileStore::new(dir.path()))));
    let gateway = backend.gateway(session.clone());

    session
        .login(gateway.as_ref(), &credentials(VALID_PASSWORD))
        .await
        .unwrap();
    session.logout().unwrap();
    session.logout().unwrap();

    assert_eq!(session.current_surface(), ApiSurface::Public);
    let err = gateway.list(ApiSurface::Authenticated).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(backend.last_request().authorization, None);

    let reopened = SessionStore::open(Arc::new(FileStore::new(dir.path())));
    assert!(!reopened.is_authenticated());
}

#[tokio::test]
async fn test_login_over_corrupt_session_document() {
    let backend = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::new(dir.path()));
    let session = Arc::new(SessionStore::open(storage.clone()));
    let gateway = backend.gateway(session.clone());

    // Document damaged after the store was opened
    std::fs::write(storage.path(), "garbage").unwrap();

    let logged_in = session
        .login(gateway.as_ref(), &credentials(VALID_PASSWORD))
        .await
        .unwrap();
    assert_eq!(logged_in.token, ISSUED_TOKEN);
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some(ISSUED_TOKEN));

    let reopened = SessionStore::open(Arc::new(FileStore::new(dir.path())));
    assert_eq!(
        reopened.current_principal().unwrap().username,
        VALID_USERNAME
    );
}
