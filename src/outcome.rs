//! Canned response outcomes for intercepted methods.

use serde_json::Value;

use crate::error::RemoteError;

/// A canned result for one intercepted invocation or one page of a
/// paginated interception: either a success payload or a simulated
/// remote error.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Success payload delivered through the resolution channel.
    Data(Value),
    /// Simulated failure delivered through the rejection channel.
    Error(RemoteError),
}

impl Outcome {
    /// Success outcome with the given payload.
    pub fn data(value: Value) -> Self {
        Outcome::Data(value)
    }

    /// Failure outcome with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(RemoteError::new(message))
    }

    pub fn into_result(self) -> Result<Value, RemoteError> {
        match self {
            Outcome::Data(value) => Ok(value),
            Outcome::Error(err) => Err(err),
        }
    }
}

impl Default for Outcome {
    /// The empty success payload, used when a test does not care about the
    /// response body.
    fn default() -> Self {
        Outcome::Data(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Data(value)
    }
}

impl From<RemoteError> for Outcome {
    fn from(err: RemoteError) -> Self {
        Outcome::Error(err)
    }
}
