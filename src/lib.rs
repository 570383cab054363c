//! inkpost: caching client for a blogging REST backend.
//!
//! The core is [`api::ApiClient`], which attaches the session token to every
//! request, answers repeat GETs from a shared [`cache::ResponseCache`] and
//! tears the session down when the backend rejects it. [`blog::BlogApi`]
//! layers typed operations (posts, comments, messages, notifications, admin)
//! on top.

pub mod api;
pub mod auth;
pub mod blog;
pub mod cache;
pub mod config;
pub mod error;

pub use api::{ApiClient, ApiResponse, HttpTransport, Method, RequestOptions, Transport};
pub use auth::{LogBoundary, LoginBoundary, SessionStore};
pub use blog::BlogApi;
pub use cache::{CacheSweeper, ResponseCache};
pub use config::Config;
pub use error::{InkpostError, Result};
