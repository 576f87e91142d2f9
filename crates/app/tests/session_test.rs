//! End-to-end session handling against a fake API server.
//!
//! These tests exercise login, transparent refresh on 401, logout on
//! refresh failure and session restore through the real reqwest transport.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use petmanager::PetManager;
use petmanager_application::ports::{DurableStorage, REFRESH_TOKEN_KEY, TOKEN_KEY};
use petmanager_application::{ApiError, AuthEvent};
use petmanager_domain::{AuthError, Credentials, PageRequest};
use petmanager_infrastructure::{FileStorage, MemoryStorage};

use common::{PASSWORD, USERNAME, spawn_api};

fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD)
}

#[tokio::test]
async fn test_login_then_list() {
    let (api, config) = spawn_api().await;
    let app = PetManager::with_storage(&config, Arc::new(MemoryStorage::new())).unwrap();
    assert!(!app.guard.require_authenticated("/pets").is_allowed());

    app.auth.login(&credentials()).await.unwrap();
    let pets = app.pets.list(&PageRequest::first()).await.unwrap();

    assert_eq!(pets.total, 2);
    assert_eq!(pets.content[0].nome, "Rex");
    assert_eq!(api.bearers(), vec!["T1".to_string()]);
    assert!(app.guard.require_authenticated("/pets").is_allowed());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let (_api, config) = spawn_api().await;
    let app = PetManager::with_storage(&config, Arc::new(MemoryStorage::new())).unwrap();

    let err = app
        .auth
        .login(&Credentials::new(USERNAME, "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    assert!(!app.store.is_authenticated());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let (api, config) = spawn_api().await;
    let app = PetManager::with_storage(&config, Arc::new(MemoryStorage::new())).unwrap();
    app.auth.login(&credentials()).await.unwrap();
    api.expire_access_token();

    let pets = app.pets.list(&PageRequest::first()).await.unwrap();

    assert_eq!(pets.content.len(), 2);
    assert_eq!(api.refresh_calls(), 1);
    assert_eq!(api.bearers(), vec!["T1".to_string(), "T2".to_string()]);
    assert_eq!(app.store.access_token().as_deref(), Some("T2"));
    assert_eq!(app.store.refresh_token().as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_concurrent_requests_share_one_refresh() {
    let (api, config) = spawn_api().await;
    let app = PetManager::with_storage(&config, Arc::new(MemoryStorage::new())).unwrap();
    app.auth.login(&credentials()).await.unwrap();
    api.expire_access_token();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let pets = app.pets.clone();
            tokio::spawn(async move { pets.list(&PageRequest::first()).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(api.refresh_calls(), 1);
    assert!(!app.coordinator().is_refreshing());
    assert_eq!(
        api.bearers().iter().filter(|b| b.as_str() == "T2").count(),
        5
    );
}

#[tokio::test]
async fn test_refresh_failure_logs_out() {
    let (api, config) = spawn_api().await;
    let storage = Arc::new(MemoryStorage::new());
    let app = PetManager::with_storage(&config, storage.clone()).unwrap();
    app.auth.login(&credentials()).await.unwrap();
    let mut events = app.auth.subscribe();
    api.disable_refresh();
    api.expire_access_token();

    let err = app.tutors.list(&PageRequest::first()).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Auth(AuthError::Rejected { status: 401, .. })
    ));
    assert!(!app.store.is_authenticated());
    assert!(storage.is_empty());
    assert_eq!(
        events.recv().await.unwrap(),
        AuthEvent::LoggedOut {
            redirect_to: "/auth/login".to_string()
        }
    );
    assert_eq!(
        app.guard.require_authenticated("/tutores").location().as_deref(),
        Some("/auth/login?returnUrl=%2Ftutores")
    );
}

#[tokio::test]
async fn test_session_restored_from_file() {
    let (api, config) = spawn_api().await;
    let dir = tempdir().unwrap();
    let storage = FileStorage::in_dir(dir.path());
    storage.set(TOKEN_KEY, "T7").unwrap();
    storage.set(REFRESH_TOKEN_KEY, "R7").unwrap();
    api.accept("T7", "R7");

    let app = PetManager::with_storage(&config, Arc::new(FileStorage::in_dir(dir.path()))).unwrap();

    assert!(app.store.is_authenticated());
    assert_eq!(app.store.current_user().unwrap().username, "user");
    app.pets.list(&PageRequest::first()).await.unwrap();
    assert_eq!(api.bearers(), vec!["T7".to_string()]);
}

#[tokio::test]
async fn test_refreshed_tokens_are_persisted() {
    let (api, config) = spawn_api().await;
    let dir = tempdir().unwrap();
    let app = PetManager::with_storage(&config, Arc::new(FileStorage::in_dir(dir.path()))).unwrap();
    app.auth.login(&credentials()).await.unwrap();
    api.expire_access_token();

    app.pets.list(&PageRequest::first()).await.unwrap();

    let reopened = FileStorage::in_dir(dir.path());
    assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("T2"));
    assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_logout_in_one_tab_reaches_the_other() {
    let (_api, config) = spawn_api().await;
    let first_storage = MemoryStorage::new();
    let second_storage = first_storage.sibling();
    let first = PetManager::with_storage(&config, Arc::new(first_storage)).unwrap();
    let second = PetManager::with_storage(&config, Arc::new(second_storage)).unwrap();

    first.auth.login(&credentials()).await.unwrap();
    let mut second_state = second.store.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        second_state.wait_for(|state| state.is_authenticated()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(second.store.access_token().as_deref(), Some("T1"));

    first.auth.logout();
    tokio::time::timeout(
        Duration::from_secs(5),
        second_state.wait_for(|state| !state.is_authenticated()),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(second.store.current_user().is_none());
}
