use crate::discovery::RepositoryRecord;

/// Post-fetch predicates for starred repositories. Unset bounds always pass;
/// set bounds are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarFilter {
    /// Inclusive lower bound on stargazers
    pub min_stars: Option<u64>,

    /// Inclusive upper bound on stargazers
    pub max_stars: Option<u64>,

    /// Owner login, compared case-insensitively
    pub owner: Option<String>,
}

impl StarFilter {
    pub fn new(min_stars: Option<u64>, max_stars: Option<u64>, owner: Option<String>) -> Self {
        Self {
            min_stars,
            max_stars,
            owner,
        }
    }

    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        self.min_stars.is_none() && self.max_stars.is_none() && self.owner.is_none()
    }

    pub fn matches(&self, repo: &RepositoryRecord) -> bool {
        if let Some(min) = self.min_stars {
            if repo.stargazers_count < min {
                return false;
            }
        }

        if let Some(max) = self.max_stars {
            if repo.stargazers_count > max {
                return false;
            }
        }

        if let Some(owner) = &self.owner {
            if repo.owner_name.to_lowercase() != owner.to_lowercase() {
                return false;
            }
        }

        true
    }

    /// Keep the matching records, preserving order
    pub fn apply(&self, repos: Vec<RepositoryRecord>) -> Vec<RepositoryRecord> {
        if self.is_empty() {
            return repos;
        }

        repos.into_iter().filter(|repo| self.matches(repo)).collect()
    }
}
