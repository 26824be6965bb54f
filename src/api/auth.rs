use serde::{Deserialize, Serialize};

use crate::auth::{Credential, Principal};
use crate::client::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Principal,
}

/// Login and logout against the auth endpoints, keeping the credential store
/// in sync with the session.
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Authenticate and persist the returned credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<Principal> {
        let response = self.client.post("/auth/login", request).await?;
        let payload: LoginResponse = response.json()?;
        let credential = Credential::new(payload.access_token)
            .with_refresh_token(payload.refresh_token)
            .with_principal(payload.user.clone());
        self.client.credential_store().store(&credential)?;
        Ok(payload.user)
    }

    /// End the session. The local credential is cleared even when the
    /// server-side logout call fails.
    pub async fn logout(&self) -> Result<()> {
        let result = self.client.post_empty("/auth/logout").await;
        self.client.credential_store().clear()?;
        if let Err(err) = result {
            tracing::warn!(error = %err, "server-side logout failed");
        }
        Ok(())
    }
}
