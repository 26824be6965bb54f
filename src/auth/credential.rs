use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the logged-in operator, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Principal {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            role: None,
        }
    }
}

/// Bearer credential pair held by a [`CredentialStore`].
///
/// Created on login, replaced on refresh, destroyed on logout or when a
/// refresh attempt fails for good.
///
/// [`CredentialStore`]: crate::auth::CredentialStore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub principal: Option<Principal>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            principal: None,
            issued_at: Some(Utc::now()),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// New credential carrying refreshed tokens but the same principal.
    pub fn refreshed(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
            principal: self.principal.clone(),
            issued_at: Some(Utc::now()),
        }
    }

    pub fn principal_email(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refreshed_replaces_tokens_and_keeps_principal() {
        let credential = Credential::new("old-access")
            .with_refresh_token("old-refresh")
            .with_principal(Principal::new("ops@transit.example"));

        let refreshed = credential.refreshed("new-access", "new-refresh");

        assert_eq!(refreshed.access_token, "new-access");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("new-refresh"));
        assert_eq!(refreshed.principal_email(), Some("ops@transit.example"));
    }

    #[test]
    fn principal_email_is_none_without_principal() {
        assert_eq!(Credential::new("a").principal_email(), None);
    }
}
