//! Authenticated request pipeline: dispatch, 401 interception, and
//! single-flight token refresh with replay.

pub mod request;
pub mod response;

mod dispatch;
mod refresh;

pub use request::{Attempt, RequestDescriptor};
pub use response::ApiResponse;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, MemoryCredentialStore};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::notify::{SessionNotifier, TracingNotifier};

use dispatch::Dispatcher;
use refresh::{Entry, RefreshCoordinator, RefreshFailure};

const REFRESH_PATH: &str = "/auth/refresh-token";
const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    email: &'a str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenResponse {
    access_token: String,
    refresh_token: String,
}

/// Client for the TransitOps API.
///
/// Every call goes out with the current access token attached. A 401 response
/// triggers a single-flight refresh against `/auth/refresh-token`: the first
/// caller to observe the expiry runs the refresh while concurrent callers
/// queue on it, and once new tokens are stored every queued request is
/// replayed once with the fresh credential. An unrecoverable refresh clears
/// the credential store and raises a session-expired notification.
///
/// Cloning is cheap; clones share the credential store and the refresh gate.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use transitops::auth::MemoryCredentialStore;
/// use transitops::client::ApiClient;
/// use transitops::config::ApiConfig;
///
/// # async fn example() -> transitops::error::Result<()> {
/// let store = Arc::new(MemoryCredentialStore::new());
/// let client = ApiClient::new(ApiConfig::from_env(), store)?;
/// let routes = client.get("/routes").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    dispatcher: Arc<Dispatcher>,
    coordinator: Arc<RefreshCoordinator>,
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn SessionNotifier>,
    // Out-of-band client for the refresh call itself, so a 401 from the
    // refresh endpoint cannot re-enter the interceptor.
    refresh_http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let refresh_http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Configuration(format!("failed to build HTTP client: {err}")))?;
        let dispatcher = Dispatcher::new(config, store.clone())?;
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            coordinator: Arc::new(RefreshCoordinator::new()),
            store,
            notifier: Arc::new(TracingNotifier),
            refresh_http,
        })
    }

    /// Client with environment configuration and an in-memory store.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env(), Arc::new(MemoryCredentialStore::new()))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn SessionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.dispatcher.config().base_url
    }

    // -----------------------------------------------------------------------
    // Request surface
    // -----------------------------------------------------------------------

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::GET, path)).await
    }

    pub async fn get_query(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::GET, path).with_query(query))
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::POST, path).with_body(serde_json::to_value(body)?))
            .await
    }

    /// POST without a body (logout-style endpoints).
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::POST, path)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::PUT, path).with_body(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(
            RequestDescriptor::new(Method::PATCH, path).with_body(serde_json::to_value(body)?),
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    /// Issue an arbitrary request through the full pipeline.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        let response = self.dispatcher.send(&descriptor).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return into_result(response);
        }
        if descriptor.is_retry() {
            return Err(retry_exhausted(&descriptor));
        }
        self.recover(descriptor).await
    }

    // -----------------------------------------------------------------------
    // Unauthorized-response recovery
    // -----------------------------------------------------------------------

    /// Handle a 401 on a first-attempt request: run or join the single-flight
    /// refresh, then replay the original request with the new credential.
    async fn recover(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        match self.coordinator.enter() {
            Entry::Waiter(rx) => match rx.await {
                Ok(Ok(())) => self.replay(descriptor).await,
                Ok(Err(failure)) => Err(Error::SessionExpired(failure.message)),
                // Leader task dropped before settling; treat as a failed refresh.
                Err(_) => Err(Error::SessionExpired("token refresh was abandoned".to_string())),
            },
            // The lease settles the batch as a failure if this future is
            // dropped mid-refresh, so a cancelled leader cannot leave the
            // coordinator stuck with waiters queued forever.
            Entry::Leader(lease) => match self.refresh_credentials().await {
                Ok(()) => {
                    lease.settle(Ok(()));
                    self.replay(descriptor).await
                }
                Err(err) => {
                    let message = match &err {
                        Error::SessionExpired(message) => message.clone(),
                        other => other.to_string(),
                    };
                    tracing::warn!(error = %message, "token refresh failed; clearing session");
                    if let Err(clear_err) = self.store.clear() {
                        tracing::warn!(error = %clear_err, "failed to clear credential store");
                    }
                    self.notifier.session_expired(SESSION_EXPIRED_MESSAGE);
                    lease.settle(Err(RefreshFailure {
                        message: message.clone(),
                    }));
                    Err(Error::SessionExpired(message))
                }
            },
        }
    }

    /// Re-issue a request once after a successful refresh. A second 401 is
    /// final; it never triggers another refresh.
    async fn replay(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        let descriptor = descriptor.retried();
        let response = self.dispatcher.send(&descriptor).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(retry_exhausted(&descriptor));
        }
        into_result(response)
    }

    /// Exchange the refresh token for a new token pair and store it.
    ///
    /// Called only by the refresh leader, and never retried: any failure here
    /// is terminal for the current batch of waiters.
    async fn refresh_credentials(&self) -> Result<()> {
        let credential = self
            .store
            .load()?
            .ok_or_else(|| Error::SessionExpired("no credential to refresh".to_string()))?;
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::SessionExpired("no refresh token available".to_string()))?;
        let email = credential
            .principal_email()
            .ok_or_else(|| Error::SessionExpired("no principal on record".to_string()))?;

        tracing::info!(%email, "access token expired; refreshing");

        let url = self.dispatcher.config().endpoint(REFRESH_PATH);
        let response = self
            .refresh_http
            .post(&url)
            .json(&RefreshTokenRequest {
                email,
                refresh_token,
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), body));
        }
        let tokens: RefreshTokenResponse = response.json().await?;

        self.store
            .store(&credential.refreshed(tokens.access_token, tokens.refresh_token))?;
        tracing::info!("token refresh succeeded");
        Ok(())
    }
}

fn into_result(response: ApiResponse) -> Result<ApiResponse> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::api(status.as_u16(), response.text()))
    }
}

fn retry_exhausted(descriptor: &RequestDescriptor) -> Error {
    Error::RetryExhausted {
        method: descriptor.method.to_string(),
        path: descriptor.path.clone(),
    }
}
