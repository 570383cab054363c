//! Profile command handlers.

use anyhow::{Context, Result};

use inkpost::blog::{BlogApi, ImageUpload, ProfileUpdate, User};

use super::common::{fmt_time, print_json};
use super::ProfileAction;

/// Handle `inkpost profile` subcommands.
pub(crate) async fn cmd_profile(api: &BlogApi, action: ProfileAction, json: bool) -> Result<()> {
    match action {
        ProfileAction::Show { user_id } => {
            let user = match user_id {
                Some(id) => api.user(&id).await?,
                None => api.me().await?,
            };
            if json {
                return print_json(&user);
            }
            print_user(&user);
        }
        ProfileAction::Update {
            username,
            bio,
            location,
            website,
            avatar,
        } => {
            // Unspecified fields keep their current value.
            let current = api.me().await?;
            let avatar = avatar
                .as_deref()
                .map(|path| {
                    ImageUpload::from_path(path)
                        .with_context(|| format!("Failed to read avatar {}", path.display()))
                })
                .transpose()?;
            let update = ProfileUpdate {
                username: username.unwrap_or(current.username),
                bio: bio.or(current.bio).unwrap_or_default(),
                location: location.or(current.location).unwrap_or_default(),
                website: website.or(current.website).unwrap_or_default(),
                avatar,
            };
            let user = api.update_profile(update).await?;
            println!("Profile updated for {}", user.username);
        }
        ProfileAction::Password { current, new } => {
            api.change_password(&current, &new).await?;
            println!("Password changed");
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("{:<10} {}", "ID", user.id);
    println!("{:<10} {}", "Username", user.username);
    println!("{:<10} {}", "Role", user.role);
    let optional = [
        ("Email", &user.email),
        ("Bio", &user.bio),
        ("Location", &user.location),
        ("Website", &user.website),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            println!("{:<10} {}", label, value);
        }
    }
    println!("{:<10} {}", "Joined", fmt_time(user.created_at));
}
