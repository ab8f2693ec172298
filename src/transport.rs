//! JSON-over-HTTP transport.

use crate::auth::AuthProvider;
use crate::config::ClientConfig;
use crate::error::ApiError;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Header carrying the bearer token on authenticated calls.
pub const TOKEN_HEADER: &str = "X-Firebase-Token";

/// JSON request helper for the Hive API.
///
/// Wraps a [`reqwest::Client`] with the base URL and the injected
/// authentication provider. No caching, no retries.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    auth: Arc<dyn AuthProvider>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for the given server and auth provider.
    #[instrument(skip_all, fields(base_url = %config.base_url()))]
    pub fn new(config: ClientConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            auth,
        }
    }

    /// Issues a GET request and deserializes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None::<&()>, authenticated)
            .await
    }

    /// Issues a POST request with a JSON body and deserializes the response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(body), authenticated)
            .await
    }

    /// Core request helper.
    ///
    /// Authenticated calls require a current identity before any network I/O
    /// and carry its bearer token in [`TOKEN_HEADER`]. Non-success statuses
    /// map to [`ApiError::Http`] without retrying.
    #[instrument(skip(self, body))]
    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        let mut request = self
            .http
            .request(method, self.config.endpoint(path))
            .header(CONTENT_TYPE, "application/json");

        if authenticated {
            if self.auth.current_user().is_none() {
                debug!("Rejecting authenticated call with no current user");
                return Err(ApiError::AuthenticationRequired);
            }
            let token = self.auth.id_token().await?;
            request = request.header(TOKEN_HEADER, token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            Ok(response.json::<T>().await?)
        } else {
            debug!(status = status.as_u16(), "Request failed");
            Err(ApiError::Http {
                status: status.as_u16(),
            })
        }
    }
}
