//! Credential types and storage.

pub mod credential;
pub mod error;
pub mod store;

pub use credential::{Credential, Principal};
pub use error::AuthError;
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, MemoryCredentialStore};
