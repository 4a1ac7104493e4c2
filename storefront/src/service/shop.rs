//! Storefront resources
//!
//! Every protected call carries the token of the current session. A `401` means the session
//! is no longer valid and clears it. Responses arriving after the session changed are
//! discarded. All the other failures are reported uniformly, leaving it to the caller how to
//! present them.

use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::client::{self, Client};
use crate::model::assistant::Answer;
use crate::model::auth::Token;
use crate::model::orders::{Cart, NewCartItem, Order};
use crate::model::products::{NewProduct, Page, Product, ProductId};
use crate::model::users::UserId;
use crate::service::session::{Session, SessionStore};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not logged in")]
    NotAuthenticated,
    #[error("Session expired, please log in again")]
    SessionExpired,
    #[error("Session changed while the request was in flight")]
    Stale,
    #[error("Not authorized")]
    Forbidden,
    #[error("{0}")]
    Rejected(String),
    #[error("Backend unavailable: {0}")]
    Network(#[source] client::Error),
}

impl From<client::Error> for Error {
    fn from(err: client::Error) -> Self {
        match err {
            err if err.is_retryable() => Error::Network(err),
            client::Error::Status {
                status: StatusCode::FORBIDDEN,
                ..
            } => Error::Forbidden,
            client::Error::Status {
                detail: Some(detail),
                ..
            } => Error::Rejected(detail),
            err => Error::Rejected(err.to_string()),
        }
    }
}

/// Storefront resources access
#[derive(Clone)]
pub struct Shop {
    client: Client,
    store: SessionStore,
}

impl Shop {
    pub fn new(client: Client, store: SessionStore) -> Self {
        Self { client, store }
    }

    /// Product list page
    #[instrument(skip(self))]
    pub async fn products(&self, page: Page) -> Result<Vec<Product>, Error> {
        Ok(self.client.products(page).await?)
    }

    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, Error> {
        Ok(self.client.product(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.create_product(&token, product).await;
        self.settle(epoch, result).await
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.update_product(&token, id, product).await;
        self.settle(epoch, result).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.delete_product(&token, id).await;
        self.settle(epoch, result).await
    }

    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.cart(&token).await;
        self.settle(epoch, result).await
    }

    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<Cart, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.add_to_cart(&token, item).await;
        self.settle(epoch, result).await
    }

    /// Removes a line from the cart, returning the refreshed cart
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, item_id: i64) -> Result<Cart, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.remove_from_cart(&token, item_id).await;
        self.settle(epoch, result).await?;

        self.cart().await
    }

    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<Order, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.checkout(&token).await;
        let order = self.settle(epoch, result).await?;

        info!(order = order.id, total = order.total(), "Order placed");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.orders(&token).await;
        self.settle(epoch, result).await
    }

    /// Asks the shopping assistant
    #[instrument(skip(self))]
    pub async fn ask(&self, message: &str) -> Result<Answer, Error> {
        let (token, epoch) = self.authorize()?;
        let result = self.client.ask(&token, message).await;
        self.settle(epoch, result).await
    }

    /// Example questions for the assistant
    #[instrument(skip(self))]
    pub async fn suggestions(&self) -> Result<Vec<String>, Error> {
        Ok(self.client.suggestions().await?)
    }

    #[instrument(skip(self))]
    pub async fn similar(&self, id: ProductId) -> Result<Vec<ProductId>, Error> {
        Ok(self.client.similar(id).await?)
    }

    /// Recommendations for `user`, or for the logged in user if not given
    ///
    /// Only administrators may ask for recommendations of other users.
    #[instrument(skip(self))]
    pub async fn recommendations(&self, user: Option<UserId>) -> Result<Vec<ProductId>, Error> {
        let session = self.store.current();
        let (token, epoch) = Self::credentials(&session)?;
        let user = user
            .or_else(|| session.user().map(|user| user.id))
            .ok_or(Error::NotAuthenticated)?;

        let result = self.client.recommendations(&token, user).await;
        self.settle(epoch, result).await
    }

    /// Token and epoch of the current session
    fn authorize(&self) -> Result<(Token, u64), Error> {
        Self::credentials(&self.store.current())
    }

    fn credentials(session: &Session) -> Result<(Token, u64), Error> {
        let token = session.token().cloned().ok_or(Error::NotAuthenticated)?;
        Ok((token, session.epoch()))
    }

    /// Applies the response of a request issued at `epoch`
    async fn settle<T>(&self, epoch: u64, result: Result<T, client::Error>) -> Result<T, Error> {
        if self.store.epoch() != epoch {
            debug!(epoch, "Session changed, discarding the response");
            return Err(Error::Stale);
        }

        match result {
            Ok(value) => Ok(value),
            Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => {
                if self.store.clear_session_if(epoch).await {
                    info!("Session rejected by the backend, logging out");
                }
                Err(Error::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }
}
