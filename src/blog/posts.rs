//! Posts, likes and comments.

use serde_json::json;
use tracing::debug;

use crate::api::{Method, RequestOptions};
use crate::cache::QueryParams;
use crate::error::Result;

use super::models::{Comment, LikeState, Post, PostDraft, PostFilter, PostPage, SearchPage};
use super::{non_blank, segment, BlogApi};

const POSTS: &str = "/posts";
const LATEST: &str = "/posts/latest";
const FEATURED: &str = "/posts/featured";
const SEARCH: &str = "/posts/search";

pub(crate) fn post_path(id: &str) -> Result<String> {
    Ok(format!("{}/{}", POSTS, segment(id)?))
}

impl BlogApi {
    /// Paginated listing, optionally filtered by tag, author or free text.
    pub async fn list_posts(&self, filter: &PostFilter) -> Result<PostPage> {
        let options = RequestOptions::new()
            .param_opt("page", filter.page)
            .param_opt("limit", filter.limit)
            .param_opt("tag", filter.tag.as_deref())
            .param_opt("search", filter.search.as_deref())
            .param_opt("author", filter.author.as_deref());
        self.client.get_json(POSTS, options).await
    }

    pub async fn latest_posts(&self, limit: Option<u32>) -> Result<Vec<Post>> {
        self.get_list(LATEST, RequestOptions::new().param_opt("limit", limit))
            .await
    }

    pub async fn featured_posts(&self, limit: Option<u32>) -> Result<Vec<Post>> {
        self.get_list(FEATURED, RequestOptions::new().param_opt("limit", limit))
            .await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post> {
        self.client
            .get_json(&post_path(id)?, RequestOptions::new())
            .await
    }

    pub async fn search_posts(&self, query: &str, page: u32, limit: u32) -> Result<SearchPage> {
        let options = RequestOptions::new()
            .param("query", non_blank("query", query)?)
            .param("page", page)
            .param("limit", limit);
        self.client.get_json(SEARCH, options).await
    }

    pub async fn create_post(&self, draft: PostDraft) -> Result<Post> {
        non_blank("title", &draft.title)?;
        let post: Post = self
            .client
            .send_json(
                Method::Post,
                POSTS,
                RequestOptions::new().multipart(draft.into_form()),
            )
            .await?;
        self.evict_post_lists();
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, draft: PostDraft) -> Result<Post> {
        non_blank("title", &draft.title)?;
        let path = post_path(id)?;
        let post: Post = self
            .client
            .send_json(
                Method::Patch,
                &path,
                RequestOptions::new().multipart(draft.into_form()),
            )
            .await?;
        self.evict_post(&path);
        Ok(post)
    }

    pub async fn delete_post(&self, id: &str) -> Result<()> {
        let path = post_path(id)?;
        self.client.delete(&path, RequestOptions::new()).await?;
        self.evict_post(&path);
        Ok(())
    }

    /// Like the post, or unlike it if the current user already does.
    pub async fn toggle_like(&self, id: &str) -> Result<LikeState> {
        let path = post_path(id)?;
        let state: LikeState = self
            .client
            .send_json(
                Method::Post,
                &format!("{}/like", path),
                RequestOptions::new(),
            )
            .await?;
        self.evict_post(&path);
        Ok(state)
    }

    pub async fn add_comment(&self, post_id: &str, text: &str) -> Result<Comment> {
        let path = post_path(post_id)?;
        let comment: Comment = self
            .client
            .send_json(
                Method::Post,
                &format!("{}/comments", path),
                RequestOptions::new().json(json!({ "text": non_blank("text", text)? })),
            )
            .await?;
        self.client.clear_cache_for(&path, &QueryParams::new());
        Ok(comment)
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<()> {
        let path = post_path(post_id)?;
        self.client
            .delete(
                &format!("{}/comments/{}", path, segment(comment_id)?),
                RequestOptions::new(),
            )
            .await?;
        self.client.clear_cache_for(&path, &QueryParams::new());
        Ok(())
    }

    /// Drop the cached detail view of one post plus every cached listing.
    pub(crate) fn evict_post(&self, path: &str) {
        self.client.clear_cache_for(path, &QueryParams::new());
        self.evict_post_lists();
    }

    fn evict_post_lists(&self) {
        let removed: usize = [POSTS, LATEST, FEATURED, SEARCH]
            .iter()
            .map(|p| self.client.clear_cache_for_path(p))
            .sum();
        debug!(removed, "Evicted cached post listings");
    }
}

/// Distinct tags across `posts`, in first-seen order.
pub fn collect_tags(posts: &[Post]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        if !tag.is_empty() && !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}
