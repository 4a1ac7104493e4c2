//! Session & authorization gate

pub mod expiry;
pub mod navigator;
pub mod resolver;
pub mod session;
pub mod shop;


use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::client::Client;
use crate::model::users::User;
use crate::storage::Storage;
use resolver::Resolver;
use session::{Restored, SessionStore};
use shop::Shop;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] resolver::Error),
    #[error("Another login took over")]
    Superseded,
}

struct GateInner {
    /// Authentication resolver
    resolver: Resolver,
    /// Current session
    store: SessionStore,
    /// Protected resources
    shop: Shop,
}

/// Gate handle shared by everything acting on behalf of the user
#[derive(Clone)]
pub struct Gate(Arc<GateInner>);

impl Gate {
    pub fn new(client: Client, storage: Storage) -> Self {
        let store = SessionStore::new(storage);

        Self(Arc::new(GateInner {
            resolver: Resolver::new(client.clone()),
            shop: Shop::new(client, store.clone()),
            store,
        }))
    }

    /// Access to the session
    pub fn store(&self) -> &SessionStore {
        &self.0.store
    }

    /// Access to protected resources
    pub fn shop(&self) -> &Shop {
        &self.0.shop
    }

    /// Restores the session persisted by the previous run
    pub async fn start(&self) -> Restored {
        self.0.store.load(&self.0.resolver).await
    }

    /// Logs in, replacing the session with the one of the resolved user
    ///
    /// The session stays untouched on failure. A login superseded by a later one (or by a
    /// logout) while in flight fails with [`Error::Superseded`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, Error> {
        let ticket = self.0.store.ticket();

        let token = self.0.resolver.login(email, password).await?;
        let user = self.0.resolver.resolve_current_user(&token).await?;

        if !self
            .0
            .store
            .set_session_with(ticket, token, user.clone())
            .await
        {
            info!("Login superseded, discarding");
            return Err(Error::Superseded);
        }

        info!(user = %user.id, role = user.role(), "Logged in");
        Ok(user)
    }

    /// Logs out, discarding the persisted token
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.0.store.clear_session().await;
        info!("Logged out");
    }

    /// Creates an account. The session is not affected.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self.0.resolver.register(email, password).await?;
        info!(user = %user.id, "Account created");
        Ok(user)
    }
}
