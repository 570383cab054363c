//! Shared CLI helpers: config loading, client wiring and output formatting.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use inkpost::{ApiClient, BlogApi, CacheSweeper, Config, InkpostError};

/// Load config, then apply command-line overrides on top.
pub(crate) fn load_config(base_url: Option<&str>, no_cache: bool) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = base_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
        config.validate()?;
    }
    if no_cache {
        config.cache.enabled = false;
    }
    Ok(config)
}

/// A connected client plus the background cache sweep that runs alongside it.
pub(crate) struct Connection {
    api: BlogApi,
    sweeper: Option<CacheSweeper>,
}

impl Connection {
    pub(crate) fn open(config: &Config) -> Result<Self> {
        let client = ApiClient::from_config(config)?;
        let sweeper = config.cache.enabled.then(|| {
            client.start_sweeper(config.cache.sweep_interval(), config.cache.max_age())
        });
        debug!(base_url = %config.api.base_url, cache = config.cache.enabled, "Client ready");
        Ok(Self {
            api: BlogApi::new(client),
            sweeper,
        })
    }

    pub(crate) fn api(&self) -> &BlogApi {
        &self.api
    }

    pub(crate) async fn close(self) {
        if let Some(sweeper) = self.sweeper {
            sweeper.stop().await;
        }
        let stats = self.api.client().cache().stats();
        debug!(
            entries = stats.entries,
            hits = stats.hits,
            misses = stats.misses,
            "Cache stats"
        );
    }
}

/// Turn a library error into something a user can act on.
pub(crate) fn explain(err: anyhow::Error) -> anyhow::Error {
    let detail = match err.downcast_ref::<InkpostError>() {
        Some(InkpostError::Unauthorized { .. }) => {
            return err.context(
                "The backend rejected the session. Store a fresh token with `inkpost session set-token`",
            );
        }
        Some(e) => e
            .backend_message()
            .zip(e.status())
            .map(|(message, status)| format!("{} (HTTP {})", message, status)),
        None => None,
    };
    match detail {
        Some(detail) => anyhow::anyhow!(detail),
        None => err,
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten to `max` characters, marking the cut with "...".
pub(crate) fn truncate(s: &str, max: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

pub(crate) fn fmt_time(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Strip HTML tags from rich-text content for terminal display.
pub(crate) fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `@path` reads the value from a file; anything else is taken literally.
pub(crate) fn read_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content from {}", path)),
        None => Ok(value.to_string()),
    }
}
