//! Test doubles for cloud service SDK clients.
//!
//! This crate lets unit tests simulate cloud service responses without
//! network access. A [`MockSdk`] registry lazily creates one cached client
//! per service name (dotted paths like `"DynamoDB.DocumentClient"` work),
//! intercepts individual methods exactly once, emulates deferred
//! (future-based) and paginated responses, and restores original behavior
//! between tests with [`MockSdk::reset_all`].
//!
//! ```
//! use cloudmock::{create_mock_service_backend, MockSdk};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sdk = MockSdk::new();
//! sdk.register("S3", Arc::new(create_mock_service_backend(&["getObject"])))
//!     .unwrap();
//!
//! let get = sdk.spy_promise("S3", "getObject", json!({"Body": "foo"})).unwrap();
//!
//! let s3 = sdk.client("S3", json!({"region": "ab-cdef-1"})).unwrap();
//! let body = s3
//!     .request("getObject", json!({"Bucket": "my", "Key": "thing"}))
//!     .unwrap()
//!     .promise()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(body, json!({"Body": "foo"}));
//! assert!(get.called_with(&json!({"Bucket": "my", "Key": "thing"})));
//! # }
//! ```

pub mod backend;
pub mod catalog;
pub mod client;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod request;
pub mod spy;

/// Re-export commonly used types for convenience
pub use mockall;

pub use backend::{create_mock_service_backend, MockServiceBackend, ServiceBackend};
pub use catalog::ServiceDefinition;
pub use client::MockClient;
pub use error::{MockError, RemoteError};
pub use outcome::Outcome;
pub use registry::{global, MockSdk};
pub use request::{MockRequest, PageControl, Pager};
pub use spy::SpyHandle;
