//! Token expiry detection
//!
//! Follows the session and clears it once the token expires, so the navigation guard can
//! evict the user before the backend starts rejecting requests. Only tokens exposing an `exp`
//! claim are tracked; opaque tokens are left to the backend `401` handling.

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::model::auth::Token;
use crate::service::session::SessionStore;

/// Spawns the expiry watcher for the store
pub fn spawn(store: SessionStore) -> JoinHandle<()> {
    tokio::spawn(watch(store))
}

#[instrument(skip_all)]
async fn watch(store: SessionStore) {
    let mut session = store.subscribe();

    loop {
        let (epoch, expires_at) = {
            let session = session.borrow_and_update();
            (session.epoch(), session.token().and_then(Token::expires_at))
        };

        let Some(expires_at) = expires_at else {
            if session.changed().await.is_err() {
                return;
            }
            continue;
        };

        let left = (expires_at - Utc::now()).to_std().unwrap_or_default();
        debug!(%expires_at, ?left, "Tracking token expiry");

        tokio::select! {
            _ = tokio::time::sleep(left) => {
                if store.clear_session_if(epoch).await {
                    info!(%expires_at, "Session token expired");
                }
            }
            changed = session.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::auth::tests::jwt;
    use crate::model::users::User;
    use crate::service::navigator::Navigator;
    use crate::storage::Storage;
    use guard::{Access, Outcome, View};

    async fn store() -> SessionStore {
        SessionStore::new(Storage::test().await.unwrap())
    }

    #[tokio::test]
    async fn expired_token_is_cleared() {
        let store = store().await;
        let watcher = spawn(store.clone());

        let token = jwt("user@x.com", Utc::now() - chrono::Duration::minutes(1));
        store
            .set_session(token, User::new(1, "user@x.com", false))
            .await;

        let mut session = store.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            session.wait_for(|session| session.token().is_none()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(store.current().access(), Access::Anonymous);

        watcher.abort();
    }

    #[tokio::test]
    async fn token_is_cleared_at_expiry() {
        let store = store().await;
        let watcher = spawn(store.clone());

        let token = jwt("user@x.com", Utc::now() + chrono::Duration::seconds(2));
        store
            .set_session(token, User::new(1, "user@x.com", false))
            .await;
        assert_eq!(store.current().access(), Access::Authenticated);

        let mut session = store.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            session.wait_for(|session| session.access() == Access::Anonymous),
        )
        .await
        .unwrap()
        .unwrap();

        watcher.abort();
    }

    #[tokio::test]
    async fn expiry_leaves_protected_view() {
        let store = store().await;
        let watcher = spawn(store.clone());

        let token = jwt("user@x.com", Utc::now() + chrono::Duration::seconds(2));
        store
            .set_session(token, User::new(1, "user@x.com", false))
            .await;

        let mut navigator = Navigator::new(&store);
        assert_eq!(navigator.navigate(View::Cart), Outcome::Render(View::Cart));

        let outcome = tokio::time::timeout(Duration::from_secs(5), navigator.changed())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Some(Outcome::Redirect {
                to: View::Login,
                from: View::Cart
            })
        );
        assert_eq!(store.current().token(), None);

        watcher.abort();
    }

    #[tokio::test]
    async fn replaced_session_is_not_cleared() {
        let store = store().await;
        let watcher = spawn(store.clone());

        let token = jwt("user@x.com", Utc::now() + chrono::Duration::seconds(1));
        store
            .set_session(token, User::new(1, "user@x.com", false))
            .await;
        store
            .set_session(Token::new("T2"), User::new(2, "admin@x.com", true))
            .await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.current().access(), Access::AuthenticatedAdmin);

        watcher.abort();
    }

    #[tokio::test]
    async fn opaque_tokens_are_left_alone() {
        let store = store().await;
        let watcher = spawn(store.clone());

        store
            .set_session(Token::new("T1"), User::new(1, "user@x.com", false))
            .await;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.current().access(), Access::Authenticated);

        watcher.abort();
    }
}
