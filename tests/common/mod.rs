//! Common test utilities and helpers for starsync tests
#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock GitHub repository item for API responses
#[derive(Debug, Clone)]
pub struct MockRepository {
    pub owner: String,
    pub name: String,
    pub stars: u64,
    pub is_fork: bool,
    pub is_archived: bool,
}

impl MockRepository {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            stars: 10,
            is_fork: false,
            is_archived: false,
        }
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.stars = stars;
        self
    }

    pub fn as_fork(mut self) -> Self {
        self.is_fork = true;
        self
    }

    pub fn as_archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "full_name": self.full_name(),
            "clone_url": self.clone_url(),
            "stargazers_count": self.stars,
            "owner": {"login": self.owner},
            "fork": self.is_fork,
            "archived": self.is_archived,
        })
    }
}

pub fn page_body(repos: &[MockRepository]) -> Value {
    Value::Array(repos.iter().map(MockRepository::to_json).collect())
}

/// Serve `body` for one page of an endpoint
pub async fn mount_page(server: &MockServer, endpoint: &str, page: u32, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve the pages in order followed by an empty page
pub async fn mount_listing(server: &MockServer, endpoint: &str, pages: Vec<Vec<MockRepository>>) {
    let count = pages.len() as u32;
    for (index, repos) in pages.into_iter().enumerate() {
        mount_page(server, endpoint, index as u32 + 1, page_body(&repos)).await;
    }
    mount_page(server, endpoint, count + 1, json!([])).await;
}

/// Lay out a checkout whose `.git/config` points at `url`
pub fn write_checkout(dir: &Path, url: &str) {
    let git_dir = dir.join(".git");
    std::fs::create_dir_all(&git_dir).expect("Failed to create .git dir");
    std::fs::write(
        git_dir.join("config"),
        format!(
            "[core]\n\trepositoryformatversion = 0\n[remote \"origin\"]\n\turl = {}\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n",
            url
        ),
    )
    .expect("Failed to write git config");
}

/// Assertion helpers for test validation
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
