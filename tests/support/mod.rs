#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wiremock::MockServer;

use transitops::auth::{AuthError, Credential, CredentialStore, MemoryCredentialStore, Principal};
use transitops::client::ApiClient;
use transitops::config::ApiConfig;
use transitops::notify::SessionNotifier;

/// Client pointed at a mock server.
pub fn client_for(server: &MockServer, store: Arc<dyn CredentialStore>) -> ApiClient {
    ApiClient::new(ApiConfig::new(server.uri()), store).expect("build client")
}

/// Credential whose access token the mock backend treats as expired.
pub fn stale_credential() -> Credential {
    Credential::new("stale")
        .with_refresh_token("r1")
        .with_principal(Principal::new("a@x.com"))
}

/// Notifier that records session-expired signals.
#[derive(Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
    last_message: Mutex<Option<String>>,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<String> {
        self.last_message.lock().unwrap().clone()
    }
}

impl SessionNotifier for CountingNotifier {
    fn session_expired(&self, message: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
        *self.last_message.lock().unwrap() = Some(message.to_string());
    }
}

/// Credential store that counts clear calls.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryCredentialStore,
    clears: AtomicUsize,
}

impl CountingStore {
    pub fn seeded(credential: Credential) -> Self {
        let store = Self::default();
        store.inner.store(&credential).unwrap();
        store
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        self.inner.load()
    }

    fn store(&self, credential: &Credential) -> Result<(), AuthError> {
        self.inner.store(credential)
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}
