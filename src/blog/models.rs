//! Wire models for the blogging backend.
//!
//! The backend speaks camelCase JSON with Mongo-style `_id` keys. Fields the
//! client does not need are ignored, and anything optional defaults so a
//! sparse list payload still deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::FormField;

/// Minimal user reference embedded in posts, comments and messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub likes: Vec<UserRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|u| u.id == user_id)
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}' (expected user or admin)", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.pad("user"),
            Self::Admin => f.pad("admin"),
        }
    }
}

/// Full user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The backend sends `_id` on most routes and `id` on `/me`.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// `{ "user": ... }` envelope used by `/me` and profile updates.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sender: Option<UserRef>,
    #[serde(default)]
    pub recipient: Option<UserRef>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One entry of the inbox: the other participant and the latest message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user: UserRef,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
    #[serde(default)]
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    /// `like`, `comment`, ...
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<UserRef>,
    /// Post id the notification refers to.
    #[serde(default)]
    pub post: Option<serde_json::Value>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Pages and small envelopes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

/// Response of the like toggle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LikeState {
    #[serde(default)]
    pub likes: Vec<UserRef>,
}

/// Response of the admin feature toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct FeaturedState {
    #[serde(default)]
    pub featured: bool,
}

/// Response of the admin role change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RoleState {
    #[serde(default)]
    pub role: Role,
}

// ============================================================================
// Outgoing payloads
// ============================================================================

/// An image to upload alongside a post or profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, guessing the MIME type from the extension.
    pub fn from_path(path: &std::path::Path) -> crate::error::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };
        Ok(Self {
            file_name,
            mime: mime.to_string(),
            bytes,
        })
    }

    fn into_field(self, name: &str) -> FormField {
        FormField::File {
            name: name.to_string(),
            file_name: self.file_name,
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}

/// Content of a post being created or edited. Sent as a multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    /// Rich-text body (HTML).
    pub content: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub image: Option<ImageUpload>,
    /// Drop the existing cover image on update.
    pub remove_image: bool,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn into_form(self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("title", self.title),
            FormField::text("content", self.content),
        ];
        if let Some(excerpt) = self.excerpt {
            fields.push(FormField::text("excerpt", excerpt));
        }
        fields.push(FormField::text("tags", self.tags.join(",")));
        fields.push(FormField::text("featured", self.featured.to_string()));
        if let Some(image) = self.image {
            fields.push(image.into_field("image"));
        } else if self.remove_image {
            fields.push(FormField::text("removeImage", "true"));
        }
        fields
    }
}

/// Profile fields to update. Sent as a multipart form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub avatar: Option<ImageUpload>,
}

impl ProfileUpdate {
    pub fn into_form(self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::text("username", self.username),
            FormField::text("bio", self.bio),
            FormField::text("location", self.location),
            FormField::text("website", self.website),
        ];
        if let Some(avatar) = self.avatar {
            fields.push(avatar.into_field("avatar"));
        }
        fields
    }
}

/// Listing filter for `/posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub author: Option<String>,
}
