//! The seam to the wrapped client library.
//!
//! A [`ServiceBackend`] stands in for one real client class: it knows which
//! methods the client exposes and how to dispatch a call that no test has
//! intercepted. Tests that need to emulate the wrapped library itself can
//! use the generated [`MockServiceBackend`].

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use crate::error::RemoteError;

/// Interface to the wrapped client library for one service.
#[async_trait]
pub trait ServiceBackend: Send + Sync {
    /// The legitimate method names on this client, used for existence checks.
    fn methods(&self) -> Vec<String>;

    /// Dispatches an un-intercepted call to the wrapped client.
    async fn send(&self, method: &str, input: Value) -> Result<Value, RemoteError>;
}

// Generate the mock implementation
mock! {
    pub ServiceBackend {}

    #[async_trait]
    impl ServiceBackend for ServiceBackend {
        fn methods(&self) -> Vec<String>;
        async fn send(&self, method: &str, input: Value) -> Result<Value, RemoteError>;
    }
}

/// Creates a mock backend exposing the given methods, with a default
/// passthrough dispatch that echoes the method name.
pub fn create_mock_service_backend(methods: &[&str]) -> MockServiceBackend {
    let methods: Vec<String> = methods.iter().map(|m| m.to_string()).collect();

    let mut mock = MockServiceBackend::new();
    mock.expect_methods().return_const(methods);
    mock.expect_send()
        .returning(|method, _input| Ok(json!({ "unmocked": method })));

    mock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_backend_lists_methods_and_dispatches() {
        let backend = create_mock_service_backend(&["getObject", "putObject"]);

        assert_eq!(backend.methods(), vec!["getObject", "putObject"]);

        let out = backend.send("getObject", json!({})).await.unwrap();
        assert_eq!(out, json!({"unmocked": "getObject"}));
    }

    #[tokio::test]
    async fn custom_backend_behavior() {
        let mut backend = MockServiceBackend::new();
        backend
            .expect_methods()
            .return_const(vec!["headBucket".to_string()]);
        backend
            .expect_send()
            .returning(|_, _| Err(RemoteError::with_code("denied", "AccessDenied")));

        let err = backend.send("headBucket", json!({})).await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("AccessDenied"));
    }
}
