use anyhow::{Context, Result};
use path_clean::PathClean;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Hosting domain recognized in checkout remote URLs
pub const DEFAULT_HOST: &str = "github.com";

/// Environment variable holding the optional API token
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL
pub const API_URL_ENV_VAR: &str = "STARSYNC_API_URL";

/// Settings for talking to the GitHub API
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: String,

    /// Bearer token attached to every request when present
    pub token: Option<String>,

    /// User-Agent header value (the API rejects requests without one)
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("starsync/{}", env!("CARGO_PKG_VERSION"))
}

impl GitHubConfig {
    /// Build the configuration, reading the token from the environment once
    pub fn from_env(api_url: &str) -> Self {
        Self::default()
            .with_api_url(api_url)
            .with_token(Self::token_from_env())
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Whether requests will carry a bearer credential
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token_from_env() -> Option<String> {
        let token = env::var(TOKEN_ENV_VAR).ok()?.trim().to_string();

        if token.is_empty() {
            debug!("{} is set but empty", TOKEN_ENV_VAR);
            return None;
        }

        let known_prefix = ["ghp_", "gho_", "ghs_", "github_pat_"]
            .iter()
            .any(|prefix| token.starts_with(prefix));
        if !known_prefix {
            warn!(
                "{} doesn't look like a GitHub token (expected ghp_, gho_, ghs_ or github_pat_ prefix)",
                TOKEN_ENV_VAR
            );
        }

        Some(token)
    }
}

/// Expand `~` and environment variables in a user-supplied directory, then make it
/// absolute against the current working directory and normalize it
pub fn resolve_directory(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand directory path: {}", raw))?;

    let path = Path::new(expanded.as_ref());
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("Failed to determine current directory")?
            .join(path)
    };

    Ok(absolute.clean())
}
