//! Session store
//!
//! Single source of truth for the session token and the resolved user. The session lives in a
//! watch channel: the store is the only writer, and every consumer (navigation, expiry
//! detection, views) either takes a snapshot or follows the changes through a receiver.
//!
//! Every mutation bumps the session epoch. Work suspended on the network captures the epoch
//! before the request and applies its result only if the epoch did not move in the meantime.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use guard::Access;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::model::auth::Token;
use crate::model::users::User;
use crate::service::resolver::{self, Resolver};
use crate::storage::Storage;

/// Storage key of the persisted token
pub const TOKEN_KEY: &str = "token";

/// Client held session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    /// Number of mutations so far
    epoch: u64,
    token: Option<Token>,
    /// Present only if `token` is
    user: Option<User>,
    /// Derived from `user` on every mutation
    access: Access,
}

impl Session {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    fn replace(&mut self, token: Option<Token>, user: Option<User>) {
        debug_assert!(user.is_none() || token.is_some());

        self.epoch += 1;
        self.access = Access::of(user.as_ref());
        self.token = token;
        self.user = user;
    }
}

/// Permission to apply the result of a login attempt
///
/// Only the most recent ticket may apply its result, and only if the session did not change
/// since the ticket was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    attempt: u64,
    epoch: u64,
}

/// Result of restoring the persisted session on startup
#[derive(Debug, Clone, PartialEq)]
pub enum Restored {
    /// No token was persisted
    Anonymous,
    /// Persisted token resolved into the user
    User(User),
    /// Persisted token is no longer valid and was discarded
    Expired,
    /// Backend is unreachable. The token is kept, but no user is resolved.
    Offline,
    /// Session changed while the token was being resolved
    Superseded,
}

struct Inner {
    /// Current session
    state: watch::Sender<Session>,
    /// Durable token storage
    storage: Storage,
    /// Serializes mutations, so the persisted token always follows the in-memory one
    writer: Mutex<()>,
    /// Login attempts started so far
    attempts: AtomicU64,
}

/// Session store handle
#[derive(Clone)]
pub struct SessionStore(Arc<Inner>);

impl SessionStore {
    /// Creates an empty session backed by `storage`
    pub fn new(storage: Storage) -> Self {
        let (state, _) = watch::channel(Session::default());

        Self(Arc::new(Inner {
            state,
            storage,
            writer: Mutex::new(()),
            attempts: AtomicU64::new(0),
        }))
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Session {
        self.0.state.borrow().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.0.state.borrow().epoch
    }

    /// Follows session changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.0.state.subscribe()
    }

    /// Restores the persisted session
    ///
    /// Never fails: a token that does not resolve anymore is discarded silently, and the
    /// session degrades to anonymous. So is a token resolving into a malformed profile. Only
    /// an unreachable backend keeps the token.
    #[instrument(skip_all)]
    pub async fn load(&self, resolver: &Resolver) -> Restored {
        let token = match self.0.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) => Token::new(token),
            Ok(None) => return Restored::Anonymous,
            Err(err) => {
                warn!(?err, "Cannot read the persisted token");
                return Restored::Anonymous;
            }
        };

        if let Some(expires_at) = token.expires_at().filter(|exp| *exp <= Utc::now()) {
            info!(%expires_at, "Persisted token expired");
            self.clear_session().await;
            return Restored::Expired;
        }

        let epoch = self.restore(token.clone()).await;

        match resolver.resolve_current_user(&token).await {
            Ok(user) => {
                if self.set_session_if(epoch, token, user.clone()).await {
                    info!(user = %user.id, "Session restored");
                    Restored::User(user)
                } else {
                    Restored::Superseded
                }
            }
            Err(err @ (resolver::Error::InvalidToken | resolver::Error::Protocol(_))) => {
                info!(%err, "Persisted token rejected, logging out");
                if self.clear_session_if(epoch).await {
                    Restored::Expired
                } else {
                    Restored::Superseded
                }
            }
            Err(err) => {
                warn!(%err, "Cannot resolve the persisted session");
                Restored::Offline
            }
        }
    }

    /// Replaces the session
    pub async fn set_session(&self, token: Token, user: User) {
        self.apply(|_| true, Some(token), Some(user)).await;
    }

    /// Discards the session
    pub async fn clear_session(&self) {
        self.apply(|_| true, None, None).await;
    }

    /// Replaces the session, unless it changed since `epoch`
    pub async fn set_session_if(&self, epoch: u64, token: Token, user: User) -> bool {
        self.apply(|session| session.epoch == epoch, Some(token), Some(user))
            .await
    }

    /// Discards the session, unless it changed since `epoch`
    pub async fn clear_session_if(&self, epoch: u64) -> bool {
        self.apply(|session| session.epoch == epoch, None, None)
            .await
    }

    /// Starts a login attempt, superseding any attempt still in flight
    pub fn ticket(&self) -> Ticket {
        let attempt = self.0.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            attempt,
            epoch: self.epoch(),
        }
    }

    /// Replaces the session with the result of the login attempt holding `ticket`
    ///
    /// Returns `false` without touching the session if the attempt was superseded.
    pub async fn set_session_with(&self, ticket: Ticket, token: Token, user: User) -> bool {
        let attempts = &self.0.attempts;
        self.apply(
            |session| {
                session.epoch == ticket.epoch && attempts.load(Ordering::SeqCst) == ticket.attempt
            },
            Some(token),
            Some(user),
        )
        .await
    }

    /// Puts the persisted token in place before it is resolved
    async fn restore(&self, token: Token) -> u64 {
        self.apply(|_| true, Some(token), None).await;
        self.epoch()
    }

    /// Applies the mutation if `condition` holds for the current session, then persists the
    /// token
    async fn apply(
        &self,
        condition: impl FnOnce(&Session) -> bool,
        token: Option<Token>,
        user: Option<User>,
    ) -> bool {
        let _writer = self.0.writer.lock().await;

        let persisted = token.clone();
        let applied = self.0.state.send_if_modified(|session| {
            if !condition(session) {
                return false;
            }

            session.replace(token, user);
            true
        });

        if !applied {
            debug!("Session changed in the meantime, discarding the update");
            return false;
        }

        let storage = &self.0.storage;
        let result = match persisted {
            Some(token) => storage.set(TOKEN_KEY, token.as_str()).await,
            None => storage.remove(TOKEN_KEY).await,
        };

        if let Err(err) = result {
            warn!(?err, "Cannot persist the session token");
        }

        true
    }
}
