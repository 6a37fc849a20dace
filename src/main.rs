use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use starsync::config::{self, API_URL_ENV_VAR, DEFAULT_API_URL, DEFAULT_HOST};
use starsync::discovery::scan_local_checkouts;
use starsync::maintenance::{organize_directory, OrganizeOutcome};
use starsync::present::{self, TerminalConfirmer};
use starsync::{
    GitHubClient, GitHubConfig, GitHubDiscovery, OwnedRepoOptions, RepoSource, StarFilter,
    SyncEngine, SyncResult, SyncSummary, SystemGit,
};

#[derive(Parser)]
#[command(name = "starsync")]
#[command(about = "Clone or pull GitHub repositories: starred by a user, owned by a user, or owned by an organization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// GitHub API base URL
    #[arg(long, global = true, env = API_URL_ENV_VAR, default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone/pull repositories that the user has starred
    Star {
        /// The GitHub username whose starred repositories will be processed
        username: String,

        /// Only include repositories with stargazer count >= this value
        #[arg(long)]
        min_stars: Option<u64>,

        /// Only include repositories with stargazer count <= this value
        #[arg(long)]
        max_stars: Option<u64>,

        /// Only include repositories whose owner matches this name (case-insensitive)
        #[arg(long)]
        owner_filter: Option<String>,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Clone/pull repositories that the user owns
    Repo {
        /// The GitHub username whose repositories will be processed
        username: String,

        #[command(flatten)]
        owned: OwnedArgs,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Clone/pull repositories that the organization owns
    Org {
        /// The GitHub organization whose repositories will be processed
        orgname: String,

        #[command(flatten)]
        owned: OwnedArgs,

        #[command(flatten)]
        sync: SyncArgs,
    },

    /// Perform maintenance tasks
    Maintenance {
        #[command(subcommand)]
        maintenance_command: MaintenanceCommands,
    },

    /// List all cloned repositories in the output directory
    ListCloned {
        /// Directory where the repositories are cloned
        #[arg(short, long, default_value = ".")]
        output_dir: String,
    },
}

#[derive(Subcommand)]
enum MaintenanceCommands {
    /// Move checkouts found directly in a directory into <owner>/<repo> subdirectories
    MoveTempFiles {
        /// Directory containing the checkouts
        #[arg(default_value = ".")]
        directory: String,

        /// Show what would be moved without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Hosting domain expected in remote URLs
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
    },
}

#[derive(Args)]
struct SyncArgs {
    /// Show which repositories would be processed without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip the confirmation prompt and proceed automatically
    #[arg(short = 'y', long)]
    yes: bool,

    /// Directory where the repositories will be cloned
    #[arg(short, long, default_value = ".")]
    output_dir: String,
}

#[derive(Args)]
struct OwnedArgs {
    /// Include forked repositories as well
    #[arg(long)]
    include_forks: bool,

    /// Include archived repositories as well
    #[arg(long)]
    include_archived: bool,
}

impl From<&OwnedArgs> for OwnedRepoOptions {
    fn from(args: &OwnedArgs) -> Self {
        Self {
            include_forks: args.include_forks,
            include_archived: args.include_archived,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting starsync v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Star {
            username,
            min_stars,
            max_stars,
            owner_filter,
            sync,
        } => {
            let filter = StarFilter::new(min_stars, max_stars, owner_filter);
            cmd_sync(RepoSource::Starred { username, filter }, &sync, &cli.api_url).await
        }
        Commands::Repo {
            username,
            owned,
            sync,
        } => {
            let options = OwnedRepoOptions::from(&owned);
            cmd_sync(RepoSource::User { username, options }, &sync, &cli.api_url).await
        }
        Commands::Org {
            orgname,
            owned,
            sync,
        } => {
            let options = OwnedRepoOptions::from(&owned);
            cmd_sync(RepoSource::Org { orgname, options }, &sync, &cli.api_url).await
        }
        Commands::Maintenance {
            maintenance_command:
                MaintenanceCommands::MoveTempFiles {
                    directory,
                    dry_run,
                    host,
                },
        } => cmd_move_temp_files(&directory, dry_run, &host),
        Commands::ListCloned { output_dir } => cmd_list_cloned(&output_dir),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Fetch, filter, confirm, then clone or pull
async fn cmd_sync(source: RepoSource, args: &SyncArgs, api_url: &str) -> Result<()> {
    let github_config = GitHubConfig::from_env(api_url);
    if github_config.is_authenticated() {
        println!("Authentication token loaded from environment variable.");
    } else {
        println!("No authentication token found. Proceeding without authentication.");
    }

    let output_dir = config::resolve_directory(&args.output_dir)?;

    let discovery = GitHubDiscovery::new(GitHubClient::new(&github_config)?);
    let discovered = discovery.discover(&source).await;

    if discovered.fetched == 0 {
        println!("No repositories found or an error occurred.");
        return Ok(());
    }

    let repos = discovered.repositories;
    if repos.is_empty() {
        println!("No repositories match the specified criteria.");
        return Ok(());
    }

    present::print_repositories(&repos);

    if args.yes {
        println!("\n'--yes' specified; skipping confirmation prompt.\n");
    } else if !present::confirm_action(&TerminalConfirmer, repos.len(), args.dry_run)? {
        println!("Process canceled.");
        return Ok(());
    }

    let engine = SyncEngine::new(SystemGit, &output_dir, args.dry_run);
    let summary = engine.sync_repos(&repos).await?;

    print_sync_summary(&summary, args.dry_run);

    Ok(())
}

fn print_sync_summary(summary: &SyncSummary, dry_run: bool) {
    if dry_run {
        for result in &summary.results {
            match result {
                SyncResult::WouldPull { full_name, path } => println!(
                    "Dry-run: Would pull in '{}' (Repository: {})",
                    path.display(),
                    full_name
                ),
                SyncResult::WouldClone {
                    full_name,
                    url,
                    path,
                } => println!(
                    "Dry-run: Would clone {} into '{}' (Repository: {})",
                    url,
                    path.parent().unwrap_or(path).display(),
                    full_name
                ),
                _ => {}
            }
        }
        return;
    }

    println!("\nSynchronization complete");
    println!("   Total repositories: {}", summary.total_repositories);
    println!("   Cloned: {}", summary.cloned);
    println!("   Pulled: {}", summary.pulled);
    println!("   Failed: {}", summary.failed);
    println!("   Duration: {:.2}s", summary.duration.as_secs_f64());

    if summary.failed > 0 {
        println!("\nFailed operations:");
        for result in &summary.results {
            if let SyncResult::Failed {
                full_name, error, ..
            } = result
            {
                println!("   {}: {}", full_name, error);
            }
        }
    }
}

/// Reorganize a flat directory of checkouts into <owner>/<repo>
fn cmd_move_temp_files(directory: &str, dry_run: bool, host: &str) -> Result<()> {
    let base_dir = config::resolve_directory(directory)?;
    if !base_dir.is_dir() {
        println!("The specified path is not a directory: {}", base_dir.display());
        return Ok(());
    }

    let outcomes = organize_directory(&base_dir, host, dry_run)?;

    let mut moved = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for outcome in &outcomes {
        match outcome {
            OrganizeOutcome::WouldMove { from, to } => {
                println!("[DRY-RUN] {} -> {}", from.display(), to.display());
            }
            OrganizeOutcome::Moved { from, to } => {
                moved += 1;
                println!("[MOVE] {} -> {}", from.display(), to.display());
            }
            OrganizeOutcome::SkippedUnrecognized { path } => {
                skipped += 1;
                println!(
                    "[SKIP] {}: could not determine the GitHub repository",
                    display_name(path)
                );
            }
            OrganizeOutcome::SkippedExisting { path, destination } => {
                skipped += 1;
                println!(
                    "[SKIP] {} already exists: {}",
                    destination.display(),
                    display_name(path)
                );
            }
            OrganizeOutcome::SkippedInsideCheckout { path, checkout } => {
                skipped += 1;
                println!(
                    "[SKIP] {}: destination is inside the checkout {}",
                    display_name(path),
                    checkout.display()
                );
            }
            OrganizeOutcome::Failed { path, error, .. } => {
                failed += 1;
                println!("[FAIL] {}: {}", display_name(path), error);
            }
        }
    }

    info!(
        "Maintenance finished: {} moved, {} skipped, {} failed",
        moved, skipped, failed
    );

    Ok(())
}

/// List <owner>/<repo> checkouts under the output directory
fn cmd_list_cloned(output_dir: &str) -> Result<()> {
    let root = config::resolve_directory(output_dir)?;
    let repos = scan_local_checkouts(&root)?;
    present::print_repositories(&repos);
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
