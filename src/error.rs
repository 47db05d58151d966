use thiserror::Error;

/// Error types for mock configuration and interception
///
/// These are programmer/test-configuration errors: they are raised
/// synchronously at the call site and are meant to fail a test loudly.
#[derive(Debug, Error)]
pub enum MockError {
    /// A second interception was attempted on the same method
    #[error("{service}.{method} is already mocked")]
    AlreadyMocked { service: String, method: String },

    /// The method does not exist on the resolved client
    #[error("{service} has no method named {method}")]
    NoSuchMethod { service: String, method: String },

    /// No service definition is registered under this name
    #[error("no service registered under {0}")]
    UnknownService(String),

    /// Invalid arguments supplied to a mock operation
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// A simulated remote failure.
///
/// Supplied by tests as the canned response of an interception and delivered
/// to the code under test through the normal asynchronous rejection channel,
/// never thrown synchronously. The code under test is expected to handle it
/// exactly as it would a real remote error.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub code: Option<String>,
}

impl RemoteError {
    /// Creates a remote error with a message and no error code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Creates a remote error carrying a service-style error code.
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}
