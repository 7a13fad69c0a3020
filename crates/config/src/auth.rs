//! GitHub token resolution.
//!
//! The search API works unauthenticated, but code search (used by the
//! license pre-check) and the higher rate limits need a token. It is resolved
//! with this fallback chain:
//!
//! 1. `github_token` from the settings
//! 2. `GITHUB_TOKEN` environment variable
//! 3. `gh auth token` command (GitHub CLI)
//! 4. Unauthenticated (returns `None`)

use secrecy::SecretString;
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Environment variable consulted when no token is configured.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Resolves the GitHub token.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_config::auth::resolve_token;
///
/// # async fn example() {
/// let token = resolve_token(Some("ghp_configured")).await;
/// assert!(token.is_some());
/// # }
/// ```
pub async fn resolve_token(configured: Option<&str>) -> Option<SecretString> {
    // 1. Configured token
    if let Some(token) = configured.filter(|t| !t.is_empty()) {
        debug!("using configured GitHub token");
        return Some(SecretString::from(token.to_string()));
    }

    // 2. Environment
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            debug!("using GitHub token from environment");
            return Some(SecretString::from(token));
        }
    }

    // 3. Try gh CLI
    match get_gh_token().await {
        Ok(Some(token)) => {
            debug!("using GitHub token from gh CLI");
            Some(SecretString::from(token))
        }
        Ok(None) => None,
        Err(e) => {
            debug!(error = %e, "gh CLI token lookup failed, continuing unauthenticated");
            None
        }
    }
}

/// Gets a GitHub token from the `gh` CLI.
///
/// # Returns
///
/// - `Ok(Some(token))` if the command succeeds and returns a token
/// - `Ok(None)` if the `gh` command is not found or not logged in
/// - `Err(...)` if the command exists but fails
///
/// # Errors
///
/// Returns an error if the `gh` command exists but returns an error.
pub async fn get_gh_token() -> Result<Option<String>> {
    use tokio::process::Command;

    let output = match Command::new("gh").args(["auth", "token"]).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // gh not installed, not an error
            return Ok(None);
        }
        Err(e) => {
            return Err(ConfigError::GhAuthFailed(e));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        // If gh is not logged in, treat as no token available
        if stderr.contains("not logged in") || stderr.contains("no oauth token") {
            return Ok(None);
        }
        return Err(ConfigError::GhAuthError {
            code: output.status.code(),
            stderr,
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Ok(None);
    }

    Ok(Some(token))
}
