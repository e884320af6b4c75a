//! Client configuration.
//!
//! Read from environment variables:
//! - `AGROMARKET_BASE_URL`: backend origin (default: "http://127.0.0.1:8000")
//! - `AGROMARKET_CSRF_TOKEN`: anti-forgery token
//! - `AGROMARKET_COOKIE`: raw `Cookie:` header; its `csrftoken` is used when
//!   `AGROMARKET_CSRF_TOKEN` is unset
//! - `AGROMARKET_RELOAD_DELAY_MS`: delay before reloading an emptied cart
//!   page (default: 1000)

use std::time::Duration;

use crate::csrf::CsrfToken;
use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub csrf_token: Option<CsrfToken>,
    /// How long after the last cart item is removed the page reloads.
    pub reload_delay: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_token: None,
            reload_delay: DEFAULT_RELOAD_DELAY,
            user_agent: format!("agromarket-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ClientConfig::default();

        let base_url = lookup("AGROMARKET_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.base_url);

        let csrf_token = lookup("AGROMARKET_CSRF_TOKEN")
            .filter(|v| !v.is_empty())
            .map(CsrfToken::new)
            .or_else(|| {
                lookup("AGROMARKET_COOKIE").and_then(|cookie| CsrfToken::from_cookie_header(&cookie))
            });

        let reload_delay = lookup("AGROMARKET_RELOAD_DELAY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.reload_delay);

        ClientConfig {
            base_url,
            csrf_token,
            reload_delay,
            user_agent: defaults.user_agent,
        }
    }

    /// Returns the token, failing loudly when none was configured.
    pub fn require_csrf_token(&self) -> Result<&CsrfToken, ClientError> {
        self.csrf_token.as_ref().ok_or(ClientError::MissingCsrfToken)
    }
}
