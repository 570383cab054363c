//! Direct messages between users.

use serde_json::json;

use crate::api::{Method, RequestOptions};
use crate::error::Result;

use super::models::{Conversation, Message};
use super::{non_blank, segment, BlogApi, POLL_TIMEOUT};

const MESSAGES: &str = "/messages";

impl BlogApi {
    /// Inbox: one entry per correspondent, newest first.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.get_list(MESSAGES, RequestOptions::new()).await
    }

    /// Full thread with one user.
    pub async fn conversation(&self, user_id: &str) -> Result<Vec<Message>> {
        let path = format!("{}/{}", MESSAGES, segment(user_id)?);
        self.get_list(&path, RequestOptions::new()).await
    }

    /// Unread messages. Polled, so always fresh and short on patience.
    pub async fn unread_messages(&self) -> Result<Vec<Message>> {
        let options = RequestOptions::new().no_cache().timeout(POLL_TIMEOUT);
        self.get_list(&format!("{}/unread", MESSAGES), options).await
    }

    pub async fn send_message(&self, recipient_id: &str, text: &str) -> Result<Message> {
        let body = json!({
            "recipientId": segment(recipient_id)?,
            "text": non_blank("text", text)?,
        });
        let message = self
            .client
            .send_json(Method::Post, MESSAGES, RequestOptions::new().json(body))
            .await?;
        self.client.clear_cache_under(MESSAGES);
        Ok(message)
    }

    pub async fn mark_message_read(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}/read", MESSAGES, segment(id)?);
        self.client.patch(&path, RequestOptions::new()).await?;
        self.client.clear_cache_under(MESSAGES);
        Ok(())
    }

    pub async fn mark_all_messages_read(&self) -> Result<()> {
        let path = format!("{}/read-all", MESSAGES);
        self.client.patch(&path, RequestOptions::new()).await?;
        self.client.clear_cache_under(MESSAGES);
        Ok(())
    }
}
