//! Session handling shared by every request.
//!
//! - [`SessionStore`]: persisted bearer token attached to outgoing requests
//! - [`LoginBoundary`]: where the client sends the user when the backend
//!   rejects the session

pub mod boundary;
pub mod store;

pub use boundary::{LogBoundary, LoginBoundary};
pub use store::SessionStore;
