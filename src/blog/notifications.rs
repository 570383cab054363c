//! Activity notifications (likes, comments, messages).

use crate::api::RequestOptions;
use crate::error::Result;

use super::models::Notification;
use super::{segment, BlogApi, POLL_TIMEOUT};

const NOTIFICATIONS: &str = "/notifications";

impl BlogApi {
    /// Notifications for the current user, optionally limited to `kinds`
    /// (e.g. `like`, `comment`). Polled, so never cached.
    pub async fn notifications(&self, kinds: &[&str]) -> Result<Vec<Notification>> {
        let kinds: Vec<&str> = kinds
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        let options = RequestOptions::new()
            .no_cache()
            .timeout(POLL_TIMEOUT)
            .param_opt("type", (!kinds.is_empty()).then(|| kinds.join(",")));
        self.get_list(NOTIFICATIONS, options).await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<()> {
        let path = format!("{}/{}", NOTIFICATIONS, segment(id)?);
        self.client.patch(&path, RequestOptions::new()).await?;
        self.client.clear_cache_under(NOTIFICATIONS);
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        let path = format!("{}/read-all", NOTIFICATIONS);
        self.client.patch(&path, RequestOptions::new()).await?;
        self.client.clear_cache_under(NOTIFICATIONS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::Method;
    use crate::blog::test_support::blog;
    use serde_json::json;

    #[tokio::test]
    async fn test_type_filter_joined() {
        let fake = FakeTransport::new().route(
            Method::Get,
            "/notifications",
            200,
            json!([{"_id": "n1", "type": "like", "read": false}]),
        );
        let (api, fake) = blog(fake);

        let items = api.notifications(&["like", " comment ", ""]).await.unwrap();
        assert_eq!(items[0].kind, "like");
        assert!(!items[0].read);
        let req = fake.last();
        assert_eq!(req.params.get("type").map(String::as_str), Some("like,comment"));
        assert_eq!(req.timeout, Some(POLL_TIMEOUT));
    }

    #[tokio::test]
    async fn test_no_filter_sends_no_param() {
        let fake = FakeTransport::new().route(Method::Get, "/notifications", 200, json!([]));
        let (api, fake) = blog(fake);

        api.notifications(&[]).await.unwrap();
        api.notifications(&[]).await.unwrap();
        assert!(fake.last().params.is_empty());
        assert_eq!(fake.count(Method::Get, "/notifications"), 2);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let fake = FakeTransport::new()
            .route(Method::Patch, "/notifications/n1", 200, json!({"read": true}))
            .route(Method::Patch, "/notifications/read-all", 200, json!({}));
        let (api, fake) = blog(fake);

        api.mark_notification_read("n1").await.unwrap();
        api.mark_all_notifications_read().await.unwrap();
        assert_eq!(fake.count(Method::Patch, "/notifications/n1"), 1);
        assert_eq!(fake.count(Method::Patch, "/notifications/read-all"), 1);
    }
}
