use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::auth::CredentialStore;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::request::RequestDescriptor;
use super::response::ApiResponse;

/// Issues outbound API calls with the current credential attached.
///
/// The dispatcher does not retry and does not mutate credential state; it
/// reads the access token fresh on every send, so a replay after refresh
/// automatically picks up the new token.
pub(crate) struct Dispatcher {
    http: reqwest::Client,
    config: ApiConfig,
    store: Arc<dyn CredentialStore>,
}

impl Dispatcher {
    pub(crate) fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| Error::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            config,
            store,
        })
    }

    pub(crate) fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one request; transport failures surface unmodified.
    pub(crate) async fn send(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse> {
        let url = self.config.endpoint(&descriptor.path);
        let mut builder = self.http.request(descriptor.method.clone(), &url);

        if let Some(credential) = self.store.load()? {
            builder = builder.bearer_auth(&credential.access_token);
        }
        if !descriptor.query.is_empty() {
            builder = builder.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            method = %descriptor.method,
            %url,
            status = status.as_u16(),
            retry = descriptor.is_retry(),
            "dispatched request"
        );

        Ok(ApiResponse::new(status, body))
    }
}
