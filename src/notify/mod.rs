//! User-facing session notifications.

/// Sink for the session-expired signal raised when a token refresh fails
/// for good. Embedders surface it however they like (toast, status line,
/// redirect to sign-in).
pub trait SessionNotifier: Send + Sync {
    fn session_expired(&self, message: &str);
}

/// Default notifier: logs at error level.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl SessionNotifier for TracingNotifier {
    fn session_expired(&self, message: &str) {
        tracing::error!(%message, "session expired");
    }
}
