//! Config command handlers.

use anyhow::Result;

use inkpost::Config;

use super::common::print_json;
use super::ConfigAction;

/// Handle `inkpost config` subcommands.
pub(crate) fn cmd_config(config: &Config, action: ConfigAction, json: bool) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if json {
                return print_json(config);
            }
            println!("Config file:     {}", Config::path().display());
            println!("Base URL:        {}", config.api.base_url);
            println!("Timeout:         {}s", config.api.timeout_secs);
            println!("User agent:      {}", config.api.user_agent);
            println!(
                "Cache:           {}",
                if config.cache.enabled { "enabled" } else { "disabled" }
            );
            println!("Cache max age:   {}s", config.cache.max_age_secs);
            println!("Sweep interval:  {}s", config.cache.sweep_interval_secs);
            println!(
                "Session file:    {}",
                config.session.resolved_path().display()
            );
        }
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
    }
    Ok(())
}
