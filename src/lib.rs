//! starsync - clone or pull GitHub repositories in bulk
//!
//! Lists the repositories a user has starred, a user owns, or an organization
//! owns, narrows them down, and brings a local `<owner>/<repo>` checkout tree in
//! line by cloning what is missing and pulling what is already there.
//!
//! ## Modules
//!
//! - [`config`]: API settings and directory resolution
//! - [`github`]: paginated repository listings from the GitHub API
//! - [`discovery`]: repository records and source selection
//! - [`filter`]: star-count and owner predicates for starred listings
//! - [`git`]: the `git` executable seam and remote URL parsing
//! - [`sync`]: clone-or-pull reconciliation
//! - [`maintenance`]: reorganizing flat checkout directories
//! - [`present`]: listings and confirmation prompts

pub mod config;
pub mod discovery;
pub mod filter;
pub mod git;
pub mod github;
pub mod maintenance;
pub mod present;
pub mod sync;

pub use config::GitHubConfig;
pub use discovery::{GitHubDiscovery, RepoSource, RepositoryRecord};
pub use filter::StarFilter;
pub use git::{GitCommand, GitRunner, SystemGit};
pub use github::{GitHubClient, OwnedRepoOptions};
pub use sync::{SyncEngine, SyncResult, SyncSummary};
