use anyhow::Result;
use dialoguer::Confirm;
use tracing::warn;

use crate::discovery::RepositoryRecord;

/// Render the candidate list, sorted case-insensitively by full name
pub fn render_repository_list(repos: &[RepositoryRecord]) -> String {
    let mut sorted: Vec<&RepositoryRecord> = repos.iter().collect();
    sorted.sort_by_key(|repo| repo.full_name.to_lowercase());

    let mut out = format!(
        "Repositories to process (total {}), sorted alphabetically:\n",
        sorted.len()
    );
    for repo in sorted {
        out.push_str(&format!(
            "  {} (Stars: {}, Owner: {})\n",
            repo.full_name, repo.stargazers_count, repo.owner_name
        ));
    }

    out
}

pub fn print_repositories(repos: &[RepositoryRecord]) {
    print!("{}", render_repository_list(repos));
}

/// Message shown before asking whether to proceed
pub fn confirmation_message(repo_count: usize, dry_run: bool) -> String {
    let mode = if dry_run {
        "dry-run (no changes)"
    } else {
        "actual clone/pull"
    };
    format!(
        "You are about to process {} repository(ies) with {}.",
        repo_count, mode
    )
}

/// Asks a yes/no question and waits for the answer
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Prompts on the terminal; anything but an explicit yes declines
#[derive(Debug, Clone, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .show_default(true)
            .wait_for_newline(true)
            .interact();

        match answer {
            Ok(answer) => Ok(answer),
            Err(e) => {
                warn!("Cannot prompt for confirmation ({}); pass --yes to proceed", e);
                Ok(false)
            }
        }
    }
}

/// Always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirmer for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Print the confirmation message and ask whether to go ahead
pub fn confirm_action(confirmer: &dyn Confirmer, repo_count: usize, dry_run: bool) -> Result<bool> {
    println!("\n{}", confirmation_message(repo_count, dry_run));
    confirmer.confirm("Proceed?")
}
