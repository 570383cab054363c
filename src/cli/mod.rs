//! Command-line interface.

mod admin;
mod common;
mod config;
mod messages;
mod posts;
mod profile;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use inkpost::blog::Role;

use common::Connection;

#[derive(Parser, Debug)]
#[command(name = "inkpost")]
#[command(version)]
#[command(about = "Caching command-line client for the inkpost blogging backend")]
pub(crate) struct Cli {
    /// Backend base URL (overrides config and INKPOST_API_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Disable the response cache for this run
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Manage the stored session token
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(flatten)]
    Remote(RemoteCommand),
}

/// Commands that talk to the backend.
#[derive(Subcommand, Debug)]
pub(crate) enum RemoteCommand {
    /// Browse and manage posts
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },
    /// Add or remove comments
    Comments {
        #[command(subcommand)]
        action: CommentsAction,
    },
    /// Direct messages
    Messages {
        #[command(subcommand)]
        action: MessagesAction,
    },
    /// Activity notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
    /// Your profile and other users
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Admin dashboard (requires an admin session)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum PostsAction {
    /// Paginated listing
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Most recent posts
    Latest {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Featured posts
    Featured {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Tags used by the latest posts
    Tags {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show one post with its comments
    Show { id: String },
    /// Full-text search
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 9)]
        limit: u32,
    },
    /// Create a post
    Create(PostArgs),
    /// Edit a post
    Edit {
        id: String,
        #[command(flatten)]
        post: PostArgs,
        /// Drop the current cover image
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete a post
    Delete { id: String },
    /// Like or unlike a post
    Like { id: String },
}

#[derive(clap::Args, Debug)]
pub(crate) struct PostArgs {
    #[arg(long)]
    pub title: String,
    /// HTML body, or @path to read it from a file
    #[arg(long)]
    pub content: String,
    #[arg(long)]
    pub excerpt: Option<String>,
    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub featured: bool,
    /// Cover image to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CommentsAction {
    /// Comment on a post
    Add { post_id: String, text: String },
    /// Delete a comment
    Delete { post_id: String, comment_id: String },
}

#[derive(Subcommand, Debug)]
pub(crate) enum MessagesAction {
    /// Conversations, newest first
    List,
    /// Thread with one user
    Show { user_id: String },
    /// Send a message
    Send { user_id: String, text: String },
    /// Unread messages
    Unread,
    /// Mark one message read
    Read { id: String },
    /// Mark every message read
    ReadAll,
}

#[derive(Subcommand, Debug)]
pub(crate) enum NotificationsAction {
    /// List notifications
    List {
        /// Only these kinds (like, comment, ...)
        #[arg(long = "type", value_delimiter = ',')]
        kinds: Vec<String>,
    },
    /// Mark one notification read
    Read { id: String },
    /// Mark every notification read
    ReadAll,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ProfileAction {
    /// Show your profile, or another user's
    Show { user_id: Option<String> },
    /// Update your profile; unspecified fields keep their value
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum AdminAction {
    /// Totals and recent posts
    Overview,
    /// All users
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// All posts
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Change a user's role
    Role { user_id: String, role: Role },
    /// Feature a post on the home page
    Feature { post_id: String },
    /// Remove a post from the home page
    Unfeature { post_id: String },
}

#[derive(Subcommand, Debug)]
pub(crate) enum SessionAction {
    /// Show whether a token is stored
    Status,
    /// Store a bearer token obtained from the web app
    SetToken { token: String },
    /// Forget the stored token
    Clear,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
}

/// Dispatch a parsed command line.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = common::load_config(cli.base_url.as_deref(), cli.no_cache)?;
    let json = cli.json;

    match cli.command {
        Commands::Session { action } => session::cmd_session(&config, action),
        Commands::Config { action } => config::cmd_config(&config, action, json),
        Commands::Remote(command) => {
            let conn = Connection::open(&config)?;
            let api = conn.api();
            let result = match command {
                RemoteCommand::Posts { action } => posts::cmd_posts(api, action, json).await,
                RemoteCommand::Comments { action } => posts::cmd_comments(api, action).await,
                RemoteCommand::Messages { action } => {
                    messages::cmd_messages(api, action, json).await
                }
                RemoteCommand::Notifications { action } => {
                    messages::cmd_notifications(api, action, json).await
                }
                RemoteCommand::Profile { action } => profile::cmd_profile(api, action, json).await,
                RemoteCommand::Admin { action } => admin::cmd_admin(api, action, json).await,
            };
            conn.close().await;
            result.map_err(common::explain)
        }
    }
}
