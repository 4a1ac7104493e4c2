//! Authentication resolver
//!
//! Turns credentials into a token, and a token into the profile it identifies. The resolver
//! never touches the session; callers decide what to do with the results.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::client::{self, Client};
use crate::model::auth::{Credentials, Token};
use crate::model::users::User;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Session token is no longer valid")]
    InvalidToken,
    #[error("{0}")]
    Rejected(String),
    /// Backend answered with something that is not a valid response
    #[error("Unexpected backend response: {0}")]
    Protocol(#[source] client::Error),
    #[error("Backend unavailable: {0}")]
    Network(#[source] client::Error),
}

/// Authentication resolver
#[derive(Debug, Clone)]
pub struct Resolver {
    client: Client,
}

impl Resolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a token
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, Error> {
        let credentials = Credentials::new(email, password);

        self.client.login(&credentials).await.map_err(|err| {
            debug!(%err, "Login failed");
            match err {
                err @ client::Error::Decode(_) => Error::Protocol(err),
                err if err.is_retryable() => Error::Network(err),
                _ => Error::InvalidCredentials,
            }
        })
    }

    /// Resolves the token into the profile of its owner
    #[instrument(skip_all)]
    pub async fn resolve_current_user(&self, token: &Token) -> Result<User, Error> {
        self.client.me(token).await.map_err(|err| {
            debug!(%err, "Token resolution failed");
            match err {
                err @ client::Error::Decode(_) => Error::Protocol(err),
                err if err.is_retryable() => Error::Network(err),
                _ => Error::InvalidToken,
            }
        })
    }

    /// Creates a new account
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User, Error> {
        let credentials = Credentials::new(email, password);

        self.client
            .register(&credentials)
            .await
            .map_err(|err| match err {
                err @ client::Error::Decode(_) => Error::Protocol(err),
                err if err.is_retryable() => Error::Network(err),
                client::Error::Status {
                    detail: Some(detail),
                    ..
                } => Error::Rejected(detail),
                err => Error::Rejected(err.to_string()),
            })
    }
}
