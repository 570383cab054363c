//! REST client for the blogging backend.
//!
//! - [`ApiClient`]: request wrapper with response caching and session handling
//! - [`Transport`] / [`HttpTransport`]: the network seam and its reqwest implementation
//! - [`types`]: request options, request/response envelopes

pub mod client;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use transport::{HttpTransport, Transport};
pub use types::{ApiRequest, ApiResponse, FormField, Method, RequestBody, RequestOptions};
