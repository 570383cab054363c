//! Session token command handlers.

use anyhow::{Context, Result};

use inkpost::{Config, SessionStore};

use super::SessionAction;

/// Handle `inkpost session` subcommands.
pub(crate) fn cmd_session(config: &Config, action: SessionAction) -> Result<()> {
    let path = config.session.resolved_path();
    let store = SessionStore::open(&path)
        .with_context(|| format!("Failed to open session file {}", path.display()))?;

    match action {
        SessionAction::Status => {
            println!("Session file: {}", path.display());
            match store.token() {
                Some(token) => println!("Token:        {}", mask_token(&token)),
                None => println!("Token:        (none)"),
            }
        }
        SessionAction::SetToken { token } => {
            store.set_token(&token)?;
            println!("Token stored in {}", path.display());
        }
        SessionAction::Clear => {
            if store.clear()? {
                println!("Session cleared.");
            } else {
                println!("No session to clear.");
            }
        }
    }

    Ok(())
}

/// Show only the edges of a token.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload.sig"), "eyJhbG....sig");
    }

    #[test]
    fn test_set_then_clear() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.session.path = Some(dir.path().join("session.json"));

        cmd_session(
            &config,
            SessionAction::SetToken {
                token: "abc".into(),
            },
        )
        .unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));

        cmd_session(&config, SessionAction::Clear).unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        assert!(store.token().is_none());
    }
}
