//! Admin dashboard operations. The backend enforces the admin role; a
//! non-admin session gets a 403 and is torn down like any other rejection.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::api::{Method, RequestOptions};
use crate::cache::QueryParams;
use crate::error::Result;

use super::models::{FeaturedState, Post, PostFilter, PostPage, Role, RoleState, UserPage};
use super::posts::post_path;
use super::users::ME;
use super::{segment, BlogApi};

const ADMIN_USERS: &str = "/admin/users";
const RECENT_POSTS: u32 = 5;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminOverview {
    pub total_posts: u64,
    pub total_users: u64,
    pub recent_posts: Vec<Post>,
}

impl BlogApi {
    pub async fn admin_users(&self, page: u32, limit: u32) -> Result<UserPage> {
        let options = RequestOptions::new()
            .param("page", page)
            .param("limit", limit);
        self.client.get_json(ADMIN_USERS, options).await
    }

    pub async fn admin_posts(&self, page: u32, limit: u32) -> Result<PostPage> {
        let filter = PostFilter {
            page: Some(page),
            limit: Some(limit),
            ..PostFilter::default()
        };
        self.list_posts(&filter).await
    }

    /// Change a user's role. Returns the role the backend settled on.
    pub async fn set_user_role(&self, user_id: &str, role: Role) -> Result<Role> {
        let id = segment(user_id)?;
        let state: RoleState = self
            .client
            .send_json(
                Method::Patch,
                &format!("{}/{}/role", ADMIN_USERS, id),
                RequestOptions::new().json(json!({ "role": role })),
            )
            .await?;
        info!(user_id = id, role = %state.role, "User role changed");
        self.client.clear_cache_for_path(ADMIN_USERS);
        self.client
            .clear_cache_for(&format!("/users/{}", id), &QueryParams::new());
        // The target may be the signed-in admin.
        self.client.clear_cache_for(ME, &QueryParams::new());
        Ok(state.role)
    }

    /// Feature or unfeature a post on the home page.
    pub async fn set_featured(&self, post_id: &str, featured: bool) -> Result<bool> {
        let path = post_path(post_id)?;
        let state: FeaturedState = self
            .client
            .send_json(
                Method::Patch,
                &path,
                RequestOptions::new().json(json!({ "featured": featured })),
            )
            .await?;
        self.evict_post(&path);
        Ok(state.featured)
    }

    /// Totals plus the most recent posts, fetched concurrently.
    pub async fn admin_overview(&self) -> Result<AdminOverview> {
        let recent = PostFilter {
            limit: Some(RECENT_POSTS),
            ..PostFilter::default()
        };
        let (posts, users) = tokio::try_join!(self.list_posts(&recent), self.admin_users(1, 1))?;
        Ok(AdminOverview {
            total_posts: posts.total,
            total_users: users.total,
            recent_posts: posts.posts,
        })
    }
}
