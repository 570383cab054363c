//! The signed-in user and public profiles.

use serde_json::json;

use crate::api::{Method, RequestOptions};
use crate::cache::QueryParams;
use crate::error::{InkpostError, Result};

use super::models::{ProfileUpdate, User, UserEnvelope};
use super::{non_blank, segment, BlogApi};

pub(crate) const ME: &str = "/me";
const USERS: &str = "/users";

impl BlogApi {
    /// Profile of the user the session belongs to.
    pub async fn me(&self) -> Result<User> {
        let envelope: UserEnvelope = self.client.get_json(ME, RequestOptions::new()).await?;
        Ok(envelope.user)
    }

    pub async fn user(&self, id: &str) -> Result<User> {
        let path = format!("{}/{}", USERS, segment(id)?);
        self.client.get_json(&path, RequestOptions::new()).await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        non_blank("username", &update.username)?;
        let envelope: UserEnvelope = self
            .client
            .send_json(
                Method::Patch,
                &format!("{}/profile", USERS),
                RequestOptions::new().multipart(update.into_form()),
            )
            .await?;
        self.client.clear_cache_for(ME, &QueryParams::new());
        self.client.clear_cache_under(USERS);
        Ok(envelope.user)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        // Passwords are sent verbatim; only reject an empty one.
        if new.is_empty() {
            return Err(InkpostError::InvalidRequest(
                "new password must not be empty".into(),
            ));
        }
        let body = json!({ "currentPassword": current, "newPassword": new });
        self.client
            .patch(
                &format!("{}/password", USERS),
                RequestOptions::new().json(body),
            )
            .await?;
        Ok(())
    }
}
