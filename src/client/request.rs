use reqwest::Method;
use serde_json::Value;

/// Whether a request has already been replayed after a token refresh.
///
/// Retries are bounded to one per original call: a `Retried` request that
/// still comes back unauthorized fails for good instead of triggering
/// another refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retried,
}

/// Everything needed to issue (and re-issue) one API call.
///
/// Descriptors are cheap to clone; a replay after refresh sends the exact
/// same method, path, query, and body, with only the [`Attempt`] tag changed.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub attempt: Attempt,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            attempt: Attempt::First,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Copy of this descriptor marked as a replay.
    pub fn retried(&self) -> Self {
        Self {
            attempt: Attempt::Retried,
            ..self.clone()
        }
    }

    pub fn is_retry(&self) -> bool {
        self.attempt == Attempt::Retried
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retried_preserves_method_path_and_body() {
        let descriptor = RequestDescriptor::new(Method::POST, "/bookings")
            .with_body(json!({"seat": "12A"}));
        let replay = descriptor.retried();

        assert!(replay.is_retry());
        assert!(!descriptor.is_retry());
        assert_eq!(replay.method, Method::POST);
        assert_eq!(replay.path, "/bookings");
        assert_eq!(replay.body, descriptor.body);
    }
}
