//! Convenience re-exports.

pub use crate::api::{AuthApi, ListQuery, Page, ResourceClient};
pub use crate::auth::{Credential, CredentialStore, MemoryCredentialStore, Principal};
pub use crate::client::{ApiClient, ApiResponse};
pub use crate::config::ApiConfig;
pub use crate::error::{Error, Result};
pub use crate::notify::SessionNotifier;
