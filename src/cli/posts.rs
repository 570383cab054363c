//! Post and comment command handlers.

use anyhow::{Context, Result};

use inkpost::blog::posts::collect_tags;
use inkpost::blog::{BlogApi, ImageUpload, Post, PostDraft, PostFilter};

use super::common::{fmt_time, plain_text, print_json, read_arg, truncate};
use super::{CommentsAction, PostArgs, PostsAction};

/// Handle `inkpost posts` subcommands.
pub(crate) async fn cmd_posts(api: &BlogApi, action: PostsAction, json: bool) -> Result<()> {
    match action {
        PostsAction::List {
            page,
            limit,
            tag,
            search,
            author,
        } => {
            let filter = PostFilter {
                page,
                limit,
                tag,
                search,
                author,
            };
            let page = api.list_posts(&filter).await?;
            if json {
                return print_json(&page.posts);
            }
            print_post_table(&page.posts);
            println!();
            println!(
                "Page {} of {} ({} posts)",
                filter.page.unwrap_or(1),
                page.pages.max(1),
                page.total
            );
        }
        PostsAction::Latest { limit } => {
            let posts = api.latest_posts(limit).await?;
            output_posts(&posts, json)?;
        }
        PostsAction::Featured { limit } => {
            let posts = api.featured_posts(limit).await?;
            output_posts(&posts, json)?;
        }
        PostsAction::Tags { limit } => {
            let posts = api.latest_posts(Some(limit)).await?;
            let tags = collect_tags(&posts);
            if json {
                return print_json(&tags);
            }
            if tags.is_empty() {
                println!("No tags found.");
            }
            for tag in tags {
                println!("#{}", tag);
            }
        }
        PostsAction::Show { id } => {
            let post = api.get_post(&id).await?;
            if json {
                return print_json(&post);
            }
            print_post(&post);
        }
        PostsAction::Search { query, page, limit } => {
            let results = api.search_posts(&query, page, limit).await?;
            if json {
                return print_json(&results.results);
            }
            if results.results.is_empty() {
                println!("No posts match '{}'.", query.trim());
                return Ok(());
            }
            print_post_table(&results.results);
            println!();
            println!("{} result(s)", results.total);
        }
        PostsAction::Create(args) => {
            let draft = build_draft(args, false)?;
            let post = api.create_post(draft).await?;
            println!("Created post {} ({})", post.id, post.title);
        }
        PostsAction::Edit {
            id,
            post,
            remove_image,
        } => {
            let draft = build_draft(post, remove_image)?;
            let post = api.update_post(&id, draft).await?;
            println!("Updated post {} ({})", post.id, post.title);
        }
        PostsAction::Delete { id } => {
            api.delete_post(&id).await?;
            println!("Deleted post {}", id);
        }
        PostsAction::Like { id } => {
            let state = api.toggle_like(&id).await?;
            println!(
                "Toggled like on post {} ({} like(s))",
                id,
                state.likes.len()
            );
        }
    }

    Ok(())
}

/// Handle `inkpost comments` subcommands.
pub(crate) async fn cmd_comments(api: &BlogApi, action: CommentsAction) -> Result<()> {
    match action {
        CommentsAction::Add { post_id, text } => {
            let comment = api.add_comment(&post_id, &text).await?;
            println!("Added comment {} to post {}", comment.id, post_id);
        }
        CommentsAction::Delete {
            post_id,
            comment_id,
        } => {
            api.delete_comment(&post_id, &comment_id).await?;
            println!("Deleted comment {} from post {}", comment_id, post_id);
        }
    }
    Ok(())
}

fn build_draft(args: PostArgs, remove_image: bool) -> Result<PostDraft> {
    let image = args
        .image
        .as_deref()
        .map(|path| {
            ImageUpload::from_path(path)
                .with_context(|| format!("Failed to read image {}", path.display()))
        })
        .transpose()?;
    Ok(PostDraft {
        title: args.title.trim().to_string(),
        content: read_arg(&args.content)?,
        excerpt: args.excerpt,
        tags: args
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        featured: args.featured,
        remove_image: remove_image && image.is_none(),
        image,
    })
}

fn output_posts(posts: &[Post], json: bool) -> Result<()> {
    if json {
        return print_json(&posts);
    }
    if posts.is_empty() {
        println!("No posts.");
        return Ok(());
    }
    print_post_table(posts);
    Ok(())
}

fn print_post_table(posts: &[Post]) {
    println!(
        "{:<26} {:<40} {:<16} {:<6} {:<16}",
        "ID", "Title", "Author", "Likes", "Created"
    );
    println!("{}", "-".repeat(108));
    for post in posts {
        println!(
            "{:<26} {:<40} {:<16} {:<6} {:<16}",
            post.id,
            truncate(&post.title, 40),
            truncate(post.author_name(), 16),
            post.likes.len(),
            fmt_time(post.created_at),
        );
    }
}

fn print_post(post: &Post) {
    println!("{}", post.title);
    println!(
        "by {} on {}{}",
        post.author_name(),
        fmt_time(post.created_at),
        if post.featured { " [featured]" } else { "" }
    );
    if !post.tags.is_empty() {
        println!("tags: {}", post.tags.join(", "));
    }
    println!();
    println!("{}", plain_text(&post.content));
    println!();
    println!(
        "{} like(s), {} comment(s)",
        post.likes.len(),
        post.comments.len()
    );
    for comment in &post.comments {
        let who = comment
            .user
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("unknown");
        println!("  [{}] {}: {}", comment.id, who, comment.text);
    }
}
