//! Login, logout and session restoration tests

use std::net::SocketAddr;

use chrono::{Duration, Utc};
use guard::{Access, Outcome, View};

use crate::model::auth::Token;
use crate::model::auth::tests::jwt;
use crate::service::navigator::Navigator;
use crate::service::resolver;
use crate::service::session::{Restored, TOKEN_KEY};
use crate::service::tests::{Backend, gate, setup};
use crate::service::Error;
use crate::storage::Storage;

/// Nothing listens there
const UNREACHABLE: ([u8; 4], u16) = ([127, 0, 0, 1], 9);

#[tokio::test]
async fn user_is_not_authorized_for_admin_panel() {
    let (gate, backend, storage) = setup().await;
    let mut navigator = Navigator::new(gate.store());

    let user = gate.login("user@x.com", "secret").await.unwrap();
    assert_eq!(user.email, "user@x.com");
    assert!(!user.is_admin);

    let session = gate.store().current();
    assert_eq!(session.token(), Some(&Token::new("T1")));
    assert_eq!(session.access(), Access::Authenticated);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some("T1"));
    assert_eq!(backend.hits("POST", "/auth/login"), 1);
    assert_eq!(backend.hits("GET", "/auth/me"), 1);

    assert_eq!(
        navigator.navigate(View::Admin),
        Outcome::Unauthorized(View::Admin)
    );
}

#[tokio::test]
async fn admin_is_granted_admin_panel() {
    let (gate, _, _) = setup().await;
    let mut navigator = Navigator::new(gate.store());

    let admin = gate.login("admin@x.com", "secret").await.unwrap();
    assert!(admin.is_admin);
    assert_eq!(gate.store().current().access(), Access::AuthenticatedAdmin);

    assert_eq!(navigator.after_login(), Outcome::Render(View::Admin));
    assert_eq!(navigator.navigate(View::Admin), Outcome::Render(View::Admin));
}

#[tokio::test]
async fn invalid_credentials_leave_session_anonymous() {
    let (gate, backend, storage) = setup().await;

    let err = gate.login("user@x.com", "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(resolver::Error::InvalidCredentials)
    ));

    assert_eq!(gate.store().current().access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(backend.hits("GET", "/auth/me"), 0);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let storage = Storage::test().await.unwrap();
    let gate = gate(SocketAddr::from(UNREACHABLE), storage.clone());

    let err = gate.login("user@x.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Auth(resolver::Error::Network(_))));
    assert_eq!(gate.store().current().access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn login_returns_to_requested_view() {
    let (gate, _, _) = setup().await;
    let mut navigator = Navigator::new(gate.store());

    assert_eq!(
        navigator.open("/orders"),
        Outcome::Redirect {
            to: View::Login,
            from: View::Orders
        }
    );

    gate.login("user@x.com", "secret").await.unwrap();
    assert_eq!(navigator.after_login(), Outcome::Render(View::Orders));
    assert_eq!(
        navigator.links(),
        vec![View::Products, View::Cart, View::Orders, View::Profile]
    );
}

#[tokio::test]
async fn session_is_restored_on_start() {
    let backend = Backend::new();
    let id = backend.account("admin@x.com", "secret", true);
    let token = backend.issue_token(id);

    let storage = Storage::test().await.unwrap();
    storage.set(TOKEN_KEY, &token).await.unwrap();

    let gate = gate(backend.start(), storage);
    let Restored::User(user) = gate.start().await else {
        panic!("Session not restored");
    };
    assert_eq!(user.email, "admin@x.com");
    assert!(user.created_at.is_some());

    let session = gate.store().current();
    assert_eq!(session.token(), Some(&Token::new(token)));
    assert_eq!(session.access(), Access::AuthenticatedAdmin);
}

#[tokio::test]
async fn nothing_to_restore() {
    let (gate, backend, _) = setup().await;

    assert_eq!(gate.start().await, Restored::Anonymous);
    assert_eq!(backend.hits("GET", "/auth/me"), 0);
}

#[tokio::test]
async fn revoked_token_is_discarded_on_start() {
    let backend = Backend::new();
    let id = backend.account("user@x.com", "secret", false);
    let token = backend.issue_token(id);
    backend.revoke(&token);

    let storage = Storage::test().await.unwrap();
    storage.set(TOKEN_KEY, &token).await.unwrap();

    let gate = gate(backend.start(), storage.clone());
    assert_eq!(gate.start().await, Restored::Expired);

    let session = gate.store().current();
    assert_eq!(session.token(), None);
    assert_eq!(session.access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn expired_token_is_discarded_without_backend() {
    let (gate, backend, storage) = setup().await;
    let token = jwt("user@x.com", Utc::now() - Duration::hours(1));
    storage.set(TOKEN_KEY, token.as_str()).await.unwrap();

    assert_eq!(gate.start().await, Restored::Expired);
    assert_eq!(backend.hits("GET", "/auth/me"), 0);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn token_is_kept_while_offline() {
    let storage = Storage::test().await.unwrap();
    storage.set(TOKEN_KEY, "T1").await.unwrap();

    let gate = gate(SocketAddr::from(UNREACHABLE), storage.clone());
    assert_eq!(gate.start().await, Restored::Offline);

    let session = gate.store().current();
    assert_eq!(session.token(), Some(&Token::new("T1")));
    assert_eq!(session.user(), None);
    assert_eq!(session.access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some("T1"));
}

#[tokio::test]
async fn malformed_profile_discards_token_on_start() {
    let backend = Backend::new();
    let id = backend.account("user@x.com", "secret", false);
    let token = backend.issue_token(id);
    backend.break_profiles();

    let storage = Storage::test().await.unwrap();
    storage.set(TOKEN_KEY, &token).await.unwrap();

    let gate = gate(backend.start(), storage.clone());
    assert_eq!(gate.start().await, Restored::Expired);
    assert_eq!(backend.hits("GET", "/auth/me"), 1);

    let session = gate.store().current();
    assert_eq!(session.token(), None);
    assert_eq!(session.access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn malformed_profile_fails_login() {
    let (gate, backend, storage) = setup().await;
    backend.break_profiles();

    let err = gate.login("user@x.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Auth(resolver::Error::Protocol(_))));

    let session = gate.store().current();
    assert_eq!(session.token(), None);
    assert_eq!(session.access(), Access::Anonymous);
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn logout_discards_session() {
    let (gate, _, storage) = setup().await;
    gate.login("user@x.com", "secret").await.unwrap();

    let mut navigator = Navigator::new(gate.store());
    navigator.navigate(View::Profile);

    gate.logout().await;
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(gate.store().current().access(), Access::Anonymous);

    assert_eq!(
        navigator.changed().await,
        Some(Outcome::Redirect {
            to: View::Login,
            from: View::Profile
        })
    );
    assert_eq!(navigator.after_logout(), Outcome::Render(View::Home));
}

#[tokio::test]
async fn superseded_login_is_discarded() {
    let (gate, _, storage) = setup().await;

    let (first, second) = tokio::join!(
        gate.login("user@x.com", "secret"),
        gate.login("admin@x.com", "secret")
    );
    assert!(matches!(first, Err(Error::Superseded)));
    assert!(second.unwrap().is_admin);

    let session = gate.store().current();
    assert_eq!(session.access(), Access::AuthenticatedAdmin);
    assert_eq!(
        storage.get(TOKEN_KEY).await.unwrap().as_deref(),
        session.token().map(Token::as_str)
    );
}

#[tokio::test]
async fn register_creates_account() {
    let (gate, _, _) = setup().await;

    let user = gate.register("new@x.com", "secret").await.unwrap();
    assert_eq!(user.email, "new@x.com");
    assert!(!user.is_admin);
    // Registration doesn't log in
    assert_eq!(gate.store().current().access(), Access::Anonymous);

    let err = gate.register("new@x.com", "other").await.unwrap_err();
    assert_eq!(err.to_string(), "Email already registered");

    gate.login("new@x.com", "secret").await.unwrap();
    assert_eq!(gate.store().current().access(), Access::Authenticated);
}
