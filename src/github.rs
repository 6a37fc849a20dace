use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GitHubConfig;
use crate::discovery::RepositoryRecord;

/// Items requested per page
pub const PER_PAGE: u32 = 100;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Fetch-time exclusions for owned-repository listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnedRepoOptions {
    /// Keep repositories flagged as forks
    pub include_forks: bool,

    /// Keep repositories flagged as archived
    pub include_archived: bool,
}

impl OwnedRepoOptions {
    fn excludes(&self, item: &ApiRepository) -> bool {
        (item.fork && !self.include_forks) || (item.archived && !self.include_archived)
    }
}

/// Repository item as returned by the REST API
#[derive(Debug, Deserialize)]
struct ApiRepository {
    full_name: String,
    clone_url: String,
    stargazers_count: u64,
    owner: ApiOwner,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
}

impl From<ApiRepository> for RepositoryRecord {
    fn from(item: ApiRepository) -> Self {
        RepositoryRecord::new(
            item.full_name,
            item.clone_url,
            item.stargazers_count,
            item.owner.login,
        )
    }
}

/// The three listing endpoints
#[derive(Debug, Clone, Copy)]
enum Endpoint<'a> {
    Starred(&'a str),
    UserRepos(&'a str),
    OrgRepos(&'a str),
}

impl Endpoint<'_> {
    fn path(&self) -> String {
        match self {
            Endpoint::Starred(user) => format!("/users/{}/starred", user),
            Endpoint::UserRepos(user) => format!("/users/{}/repos", user),
            Endpoint::OrgRepos(org) => format!("/orgs/{}/repos", org),
        }
    }

    fn extra_query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Endpoint::Starred(_) => &[],
            Endpoint::UserRepos(_) | Endpoint::OrgRepos(_) => {
                &[("type", "all"), ("sort", "full_name")]
            }
        }
    }
}

/// GitHub REST client for repository listings.
///
/// Pagination is fail-soft: a transport error, any status other than 200 or an
/// unreadable body ends the listing and whatever was accumulated is returned.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        if config.is_authenticated() {
            debug!("Requests will carry a bearer token");
        }

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Repositories starred by `username`, unfiltered
    pub async fn list_starred_repositories(&self, username: &str) -> Vec<RepositoryRecord> {
        self.fetch_all(Endpoint::Starred(username), None).await
    }

    /// Repositories owned by `username`
    pub async fn list_user_repositories(
        &self,
        username: &str,
        options: &OwnedRepoOptions,
    ) -> Vec<RepositoryRecord> {
        self.fetch_all(Endpoint::UserRepos(username), Some(options))
            .await
    }

    /// Repositories owned by the organization `org`
    pub async fn list_organization_repositories(
        &self,
        org: &str,
        options: &OwnedRepoOptions,
    ) -> Vec<RepositoryRecord> {
        self.fetch_all(Endpoint::OrgRepos(org), Some(options)).await
    }

    async fn fetch_all(
        &self,
        endpoint: Endpoint<'_>,
        options: Option<&OwnedRepoOptions>,
    ) -> Vec<RepositoryRecord> {
        let mut repositories = Vec::new();
        let mut page = 1u32;

        loop {
            let Some(items) = self.fetch_page(endpoint, page).await else {
                break;
            };

            if items.is_empty() {
                break;
            }

            for item in items {
                let label = item
                    .get("full_name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed>")
                    .to_string();

                let parsed = match serde_json::from_value::<ApiRepository>(item) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Skipping malformed repository item {}: {}", label, e);
                        continue;
                    }
                };

                if let Some(options) = options {
                    if options.excludes(&parsed) {
                        debug!(
                            "Excluding {} (fork: {}, archived: {})",
                            parsed.full_name, parsed.fork, parsed.archived
                        );
                        continue;
                    }
                }

                repositories.push(parsed.into());
            }

            page += 1;
        }

        info!(
            "Found {} repositories at {}",
            repositories.len(),
            endpoint.path()
        );
        repositories
    }

    /// One page of raw items, or `None` when pagination must stop
    async fn fetch_page(&self, endpoint: Endpoint<'_>, page: u32) -> Option<Vec<Value>> {
        let url = format!("{}{}", self.api_url, endpoint.path());
        debug!("GET {} page {}", url, page);

        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .query(&[("page", page), ("per_page", PER_PAGE)])
            .query(endpoint.extra_query());

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("GitHub API request for page {} failed: {}", page, e);
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "GitHub API request returned {} for page {}: {}",
                status,
                page,
                body.trim()
            );
            return None;
        }

        match response.json::<Vec<Value>>().await {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Unreadable GitHub API response for page {}: {}", page, e);
                None
            }
        }
    }
}
