//! genclient-runtime
//!
//! Request-execution runtime embedded inside generated HTTP API clients.
//!
//! Given a declarative [`OperationDescriptor`] for one operation and a
//! shared [`ClientConfig`], the engine executes the HTTP call exactly once,
//! supports cooperative cancellation through [`CancelableTask`], runs the
//! config's request/response interceptor chains around the transport call,
//! and converts the raw response into either a typed success value or a
//! classified [`ApiError`]. It performs no retries and no caching; policy
//! of that kind belongs to callers wrapping the engine.
//!
//! ```rust,ignore
//! use genclient_runtime::{execute, ClientConfig, OperationDescriptor, StatusMatcher};
//! use std::sync::Arc;
//!
//! let config = Arc::new(ClientConfig::builder("https://api.example.com").build());
//! let task = execute(
//!     &config,
//!     OperationDescriptor::get("/users/{id}")
//!         .with_path_param("id", 42)
//!         .with_error_rule(StatusMatcher::Exact(404), "User not found"),
//! );
//! // task.cancel() aborts the call; awaiting yields the shaped result.
//! ```
#![deny(unsafe_code)]

pub mod classify;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod execute;
pub mod headers;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod task;
pub mod transport;

pub use classify::{RuleOutcome, StatusMatcher, StatusRule};
pub use config::{ClientConfig, ClientConfigBuilder, Credentials, HeaderSource};
pub use descriptor::{
    ArrayStyle, FormField, FormValue, ObjectStyle, OperationDescriptor, RequestBody, ResponseMode,
};
pub use error::{ApiError, ClientError};
pub use execute::{ResultShape, execute};
pub use interceptor::{
    InterceptorChain, InterceptorId, RequestInterceptor, ResponseInterceptor,
};
pub use response::{ApiResult, ResponseBody};
pub use task::{CancelHandle, CancelableTask, TaskContext};
pub use transport::{
    CanonicalResponse, EncodedBody, ReqwestTransport, Transport, TransportRequest,
};
