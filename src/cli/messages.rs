//! Message and notification command handlers.

use anyhow::Result;

use inkpost::blog::{BlogApi, Message, Notification};

use super::common::{fmt_time, print_json, truncate};
use super::{MessagesAction, NotificationsAction};

/// Handle `inkpost messages` subcommands.
pub(crate) async fn cmd_messages(api: &BlogApi, action: MessagesAction, json: bool) -> Result<()> {
    match action {
        MessagesAction::List => {
            let conversations = api.conversations().await?;
            if json {
                return print_json(&conversations);
            }
            if conversations.is_empty() {
                println!("No conversations.");
                return Ok(());
            }
            println!(
                "{:<26} {:<16} {:<8} {:<40}",
                "User ID", "User", "Unread", "Last message"
            );
            println!("{}", "-".repeat(92));
            for c in &conversations {
                let last = c
                    .last_message
                    .as_ref()
                    .map(|m| m.text.as_str())
                    .unwrap_or("");
                println!(
                    "{:<26} {:<16} {:<8} {:<40}",
                    c.user.id,
                    truncate(&c.user.username, 16),
                    c.unread_count,
                    truncate(last, 40),
                );
            }
        }
        MessagesAction::Show { user_id } => {
            let thread = api.conversation(&user_id).await?;
            if json {
                return print_json(&thread);
            }
            print_messages(&thread);
        }
        MessagesAction::Send { user_id, text } => {
            let message = api.send_message(&user_id, &text).await?;
            println!("Sent message {} to {}", message.id, user_id);
        }
        MessagesAction::Unread => {
            let unread = api.unread_messages().await?;
            if json {
                return print_json(&unread);
            }
            if unread.is_empty() {
                println!("No unread messages.");
                return Ok(());
            }
            print_messages(&unread);
        }
        MessagesAction::Read { id } => {
            api.mark_message_read(&id).await?;
            println!("Marked message {} as read", id);
        }
        MessagesAction::ReadAll => {
            api.mark_all_messages_read().await?;
            println!("Marked all messages as read");
        }
    }
    Ok(())
}

/// Handle `inkpost notifications` subcommands.
pub(crate) async fn cmd_notifications(
    api: &BlogApi,
    action: NotificationsAction,
    json: bool,
) -> Result<()> {
    match action {
        NotificationsAction::List { kinds } => {
            let kinds: Vec<&str> = kinds.iter().map(String::as_str).collect();
            let items = api.notifications(&kinds).await?;
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            println!(
                "{:<26} {:<10} {:<16} {:<6} {:<16}",
                "ID", "Type", "From", "Read", "When"
            );
            println!("{}", "-".repeat(78));
            for n in &items {
                println!(
                    "{:<26} {:<10} {:<16} {:<6} {:<16}",
                    n.id,
                    n.kind,
                    truncate(notification_sender(n), 16),
                    if n.read { "yes" } else { "no" },
                    fmt_time(n.created_at),
                );
            }
        }
        NotificationsAction::Read { id } => {
            api.mark_notification_read(&id).await?;
            println!("Marked notification {} as read", id);
        }
        NotificationsAction::ReadAll => {
            api.mark_all_notifications_read().await?;
            println!("Marked all notifications as read");
        }
    }
    Ok(())
}

fn notification_sender(n: &Notification) -> &str {
    n.from
        .as_ref()
        .map(|u| u.username.as_str())
        .unwrap_or("-")
}

fn print_messages(messages: &[Message]) {
    for m in messages {
        let from = m
            .sender
            .as_ref()
            .map(|u| u.username.as_str())
            .unwrap_or("?");
        println!(
            "[{}] {}{}: {}",
            fmt_time(m.created_at),
            from,
            if m.read { "" } else { " (unread)" },
            m.text
        );
    }
}
