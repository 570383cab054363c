//! Typed operations against the blogging backend.
//!
//! [`BlogApi`] wraps an [`ApiClient`] and turns each backend route into a
//! method with typed input and output. Reads go through the response cache;
//! every mutation evicts the cached reads it makes stale, so the next read
//! goes back to the network.

pub mod admin;
pub mod messages;
pub mod models;
pub mod notifications;
pub mod posts;
pub mod users;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{ApiClient, RequestOptions};
use crate::error::{InkpostError, Result};

pub use admin::AdminOverview;
pub use models::{
    Comment, Conversation, FeaturedState, ImageUpload, LastMessage, LikeState, Message,
    Notification, Post, PostDraft, PostFilter, PostPage, ProfileUpdate, Role, RoleState,
    SearchPage, User, UserPage, UserRef,
};

/// Timeout for the background polling reads (unread messages, notifications).
pub const POLL_TIMEOUT: Duration = Duration::from_secs(3);

/// Typed facade over the blogging REST API.
#[derive(Debug, Clone)]
pub struct BlogApi {
    client: ApiClient,
}

impl BlogApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// GET a list that the backend may answer with `null` when empty.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Vec<T>> {
        let response = self.client.get(path, options).await?;
        match response.data {
            Value::Null => Ok(Vec::new()),
            data => Ok(serde_json::from_value(data)?),
        }
    }
}

/// Validate an id before splicing it into a path.
pub(crate) fn segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '?', '#']) {
        return Err(InkpostError::InvalidRequest(format!(
            "invalid resource id '{}'",
            id
        )));
    }
    Ok(id)
}

/// Reject blank free-text input before it reaches the backend.
pub(crate) fn non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InkpostError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(value)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment() {
        assert_eq!(segment(" abc123 ").unwrap(), "abc123");
        assert!(segment("").is_err());
        assert!(segment("a/b").is_err());
        assert!(segment("a?x=1").is_err());
        assert!(segment(".").is_err());
        assert!(segment(" .. ").is_err());
        assert_eq!(segment("...").unwrap(), "...");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("text", "  hi ").unwrap(), "hi");
        let err = non_blank("text", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: text must not be empty");
    }
}
