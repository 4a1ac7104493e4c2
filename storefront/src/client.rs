//! Storefront backend REST client
//!
//! Thin typed layer over the backend endpoints. It knows nothing about the session: protected
//! calls take the token explicitly, and every failure is returned as is for the caller to
//! classify.

use color_eyre::eyre::WrapErr;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config;
use crate::model::assistant::{Answer, Query, Suggestions};
use crate::model::auth::{Credentials, LoginResponse, Token};
use crate::model::orders::{Cart, NewCartItem, Order};
use crate::model::products::{NewProduct, Page, Product, ProductId};
use crate::model::users::{User, UserId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend responded with {status}: {}", .detail.as_deref().unwrap_or("no details"))]
    Status {
        status: StatusCode,
        /// `detail` field of the error body, if any
        detail: Option<String>,
    },
    /// Successful response with a body that does not match the endpoint schema
    #[error("Unexpected response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl Error {
    /// Response status, if the backend responded at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport(err) => err.status(),
            Error::Status { status, .. } => Some(*status),
            Error::Decode(_) => None,
        }
    }

    /// Checks if the failure is worth retrying: no response, or a server side failure
    ///
    /// A body that cannot be decoded is never retryable, the backend would answer the same.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Decode(_) => false,
            err => err.status().is_none_or(|status| status.is_server_error()),
        }
    }
}

/// Error body emitted by the backend
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Backend client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    /// Backend base URL; its path is a prefix of every endpoint
    base: Url,
}

impl Client {
    /// Creates a client from configuration
    pub fn new(config: &config::Api) -> color_eyre::Result<Self> {
        let base = Url::parse(&config.base_url)
            .wrap_err_with(|| format!("Invalid backend URL: {}", config.base_url))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, base })
    }

    /// Exchanges credentials for a token
    pub async fn login(&self, credentials: &Credentials) -> Result<Token, Error> {
        let request = self.request(Method::POST, "/auth/login", None);
        let response: LoginResponse = self.send(request.json(credentials)).await?;
        debug!(token_type = ?response.token_type, "Token issued");
        Ok(response.access_token)
    }

    /// Creates a new account
    pub async fn register(&self, credentials: &Credentials) -> Result<User, Error> {
        let request = self.request(Method::POST, "/auth/register", None);
        self.send(request.json(credentials)).await
    }

    /// Profile of the token owner
    pub async fn me(&self, token: &Token) -> Result<User, Error> {
        self.send(self.request(Method::GET, "/auth/me", Some(token)))
            .await
    }

    pub async fn products(&self, page: Page) -> Result<Vec<Product>, Error> {
        let request = self.request(Method::GET, "/products", None);
        self.send(request.query(&page)).await
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, Error> {
        self.send(self.request(Method::GET, &format!("/products/{id}"), None))
            .await
    }

    pub async fn create_product(
        &self,
        token: &Token,
        product: &NewProduct,
    ) -> Result<Product, Error> {
        let request = self.request(Method::POST, "/products", Some(token));
        self.send(request.json(product)).await
    }

    pub async fn update_product(
        &self,
        token: &Token,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, Error> {
        let request = self.request(Method::PUT, &format!("/products/{id}"), Some(token));
        self.send(request.json(product)).await
    }

    pub async fn delete_product(&self, token: &Token, id: ProductId) -> Result<(), Error> {
        self.execute(self.request(Method::DELETE, &format!("/products/{id}"), Some(token)))
            .await
    }

    pub async fn cart(&self, token: &Token) -> Result<Cart, Error> {
        self.send(self.request(Method::GET, "/orders/cart", Some(token)))
            .await
    }

    pub async fn add_to_cart(&self, token: &Token, item: NewCartItem) -> Result<Cart, Error> {
        let request = self.request(Method::POST, "/orders/cart", Some(token));
        self.send(request.json(&item)).await
    }

    pub async fn remove_from_cart(&self, token: &Token, item_id: i64) -> Result<(), Error> {
        let path = format!("/orders/cart/{item_id}");
        self.execute(self.request(Method::DELETE, &path, Some(token)))
            .await
    }

    /// Turns the cart into an order
    pub async fn checkout(&self, token: &Token) -> Result<Order, Error> {
        self.send(self.request(Method::POST, "/orders/checkout", Some(token)))
            .await
    }

    pub async fn orders(&self, token: &Token) -> Result<Vec<Order>, Error> {
        self.send(self.request(Method::GET, "/orders", Some(token)))
            .await
    }

    /// Asks the shopping assistant about the catalog
    pub async fn ask(&self, token: &Token, message: &str) -> Result<Answer, Error> {
        let request = self.request(Method::POST, "/assistant/query", Some(token));
        self.send(request.json(&Query { message })).await
    }

    /// Example questions for the assistant
    pub async fn suggestions(&self) -> Result<Vec<String>, Error> {
        let request = self.request(Method::GET, "/assistant/suggestions", None);
        let suggestions: Suggestions = self.send(request).await?;
        Ok(suggestions.suggestions)
    }

    /// Products similar to the given one
    pub async fn similar(&self, id: ProductId) -> Result<Vec<ProductId>, Error> {
        let path = format!("/recommendations/similar/{id}");
        self.send(self.request(Method::GET, &path, None)).await
    }

    /// Personalized recommendations for the user
    pub async fn recommendations(
        &self,
        token: &Token,
        user: UserId,
    ) -> Result<Vec<ProductId>, Error> {
        let path = format!("/recommendations/user/{user}");
        self.send(self.request(Method::GET, &path, Some(token)))
            .await
    }

    /// Prepares a request to the endpoint at `path`
    fn request(&self, method: Method, path: &str, token: Option<&Token>) -> RequestBuilder {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));

        let request = self.http.request(method, url);
        match token {
            Some(token) => request.header(AUTHORIZATION, token.authorization()),
            None => request,
        }
    }

    /// Sends the request and decodes the response body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = Self::check(request.send().await?).await?;
        response.json().await.map_err(|err| {
            debug!(%err, "Cannot decode the response");
            Error::Decode(err)
        })
    }

    /// Sends the request ignoring the response body
    async fn execute(&self, request: RequestBuilder) -> Result<(), Error> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Turns non-2xx responses into errors
    async fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| match body.detail {
                serde_json::Value::String(detail) => detail,
                detail => detail.to_string(),
            });

        debug!(%status, ?detail, "Request rejected by the backend");
        Err(Error::Status { status, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let client = Client::new(&config::Api {
            base_url: "http://localhost:8001/api/".into(),
            timeout_secs: 1,
        })
        .unwrap();

        let request = client
            .request(Method::GET, "/orders/cart", Some(&Token::new("T1")))
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8001/api/orders/cart");
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer T1"
        );
    }

    #[test]
    fn public_endpoints_carry_no_token() {
        let client = Client::new(&config::Api::default()).unwrap();

        let request = client
            .request(Method::GET, "/products", None)
            .query(&Page::default())
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8001/products?skip=0&limit=10"
        );
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_base_url() {
        let result = Client::new(&config::Api {
            base_url: "not a url".into(),
            timeout_secs: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn retryable_errors() {
        let rejected = Error::Status {
            status: StatusCode::UNAUTHORIZED,
            detail: Some("Invalid credentials".into()),
        };
        assert!(!rejected.is_retryable());
        assert_eq!(
            rejected.to_string(),
            "Backend responded with 401 Unauthorized: Invalid credentials"
        );

        let failed = Error::Status {
            status: StatusCode::BAD_GATEWAY,
            detail: None,
        };
        assert!(failed.is_retryable());
    }

    #[tokio::test]
    async fn undecodable_body_is_not_retryable() {
        use warp::Filter;

        let profile = warp::path!("auth" / "me")
            .map(|| warp::reply::json(&serde_json::json!({ "id": 1, "email": "user@x.com" })));
        let (addr, server) = warp::serve(profile).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let client = Client::new(&config::Api {
            base_url: format!("http://{addr}"),
            timeout_secs: 5,
        })
        .unwrap();

        let err = client.me(&Token::new("T1")).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(err.status(), None);
        assert!(!err.is_retryable());
    }
}
