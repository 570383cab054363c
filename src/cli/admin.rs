//! Admin dashboard command handlers.

use anyhow::Result;

use inkpost::blog::BlogApi;

use super::common::{fmt_time, print_json, truncate};
use super::AdminAction;

/// Handle `inkpost admin` subcommands.
pub(crate) async fn cmd_admin(api: &BlogApi, action: AdminAction, json: bool) -> Result<()> {
    match action {
        AdminAction::Overview => {
            let overview = api.admin_overview().await?;
            if json {
                return print_json(&overview);
            }
            println!("Total posts: {}", overview.total_posts);
            println!("Total users: {}", overview.total_users);
            println!();
            println!("Recent posts:");
            for post in &overview.recent_posts {
                println!(
                    "  {:<26} {:<40} {}",
                    post.id,
                    truncate(&post.title, 40),
                    fmt_time(post.created_at)
                );
            }
        }
        AdminAction::Users { page, limit } => {
            let users = api.admin_users(page, limit).await?;
            if json {
                return print_json(&users.users);
            }
            println!(
                "{:<26} {:<16} {:<28} {:<6}",
                "ID", "Username", "Email", "Role"
            );
            println!("{}", "-".repeat(80));
            for user in &users.users {
                println!(
                    "{:<26} {:<16} {:<28} {:<6}",
                    user.id,
                    truncate(&user.username, 16),
                    truncate(user.email.as_deref().unwrap_or("-"), 28),
                    user.role,
                );
            }
            println!();
            println!("Page {} of {} ({} users)", page, users.pages.max(1), users.total);
        }
        AdminAction::Posts { page, limit } => {
            let posts = api.admin_posts(page, limit).await?;
            if json {
                return print_json(&posts.posts);
            }
            println!(
                "{:<26} {:<40} {:<16} {:<9}",
                "ID", "Title", "Author", "Featured"
            );
            println!("{}", "-".repeat(94));
            for post in &posts.posts {
                println!(
                    "{:<26} {:<40} {:<16} {:<9}",
                    post.id,
                    truncate(&post.title, 40),
                    truncate(post.author_name(), 16),
                    if post.featured { "yes" } else { "" },
                );
            }
            println!();
            println!("Page {} of {} ({} posts)", page, posts.pages.max(1), posts.total);
        }
        AdminAction::Role { user_id, role } => {
            let role = api.set_user_role(&user_id, role).await?;
            println!("User {} is now {}", user_id, role);
        }
        AdminAction::Feature { post_id } => {
            let featured = api.set_featured(&post_id, true).await?;
            println!("Post {} featured: {}", post_id, featured);
        }
        AdminAction::Unfeature { post_id } => {
            let featured = api.set_featured(&post_id, false).await?;
            println!("Post {} featured: {}", post_id, featured);
        }
    }
    Ok(())
}
