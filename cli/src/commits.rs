use crate::error::{CliError, Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::report::CommandReport;
use crate::workspace::Workspace;
use changelog::classify::{Classification, CommitInfo, PushInfo, RepoRef, entries_for_push};
use changelog::commit::commit_identity;
use changelog::dedup::exclude_generated_commits;
use changelog::{Author, CommitRules};
use git::{CommitRecord, Repository, generated_changelog_commits};
use std::path::Path;

const NOREPLY_DOMAIN: &str = "@users.noreply.github.com";

pub struct CommitsArgs {
    pub from: Option<String>,
    pub to: String,
    pub repo_url: Option<String>,
    pub commit: bool,
}

/// GitHub login encoded in a `users.noreply.github.com` address, e.g.
/// `12345+octocat@users.noreply.github.com`
fn login_from_email(email: &str) -> Option<String> {
    let local = email.strip_suffix(NOREPLY_DOMAIN)?;
    let login = local.rsplit('+').next()?;
    (!login.is_empty()).then(|| login.to_string())
}

fn commit_info(record: &CommitRecord, repository_url: &str) -> CommitInfo {
    CommitInfo {
        sha: record.sha.clone(),
        message: record.message.clone(),
        url: format!("{repository_url}/commit/{}", record.sha),
        author: login_from_email(&record.author_email).map(|login| Author {
            login,
            name: Some(record.author_name.clone()),
            email: Some(record.author_email.clone()),
        }),
    }
}

fn repo_ref(slug: &str) -> RepoRef {
    match slug.split_once('/') {
        Some((owner, name)) => RepoRef::new(owner, name),
        None => RepoRef::new("", slug),
    }
}

pub fn execute(workspace: &Workspace, args: CommitsArgs, quiet: bool) -> Result<CommandReport> {
    let mut progress = ProgressTracker::new("Changelog From Commits", quiet).with_steps(&[
        "Reading commit history",
        "Classifying commits",
        "Updating changelog",
        "Committing changelog",
    ]);

    progress.start_step();
    let repo = workspace.repository()?;
    let repository_url = workspace.repository_url(args.repo_url.as_deref())?;
    let slug = workspace.slug(Some(&repository_url));
    let records = repo
        .commits_between(args.from.as_deref(), &args.to)
        .with_context(|| "Failed to read commit history")?;
    let branch = repo.current_branch().map_err(CliError::from)?;
    let default_branch = repo.default_branch().unwrap_or_else(|e| {
        tracing::warn!(error = %e.user_message(), "default branch unknown, assuming current branch");
        branch.clone()
    });
    progress.complete_step();

    progress.start_step();
    let rules = CommitRules::compile(workspace.config())?;
    let push = PushInfo {
        repo: repo_ref(&slug),
        branch,
        default_branch,
        commits: records.iter().map(|r| commit_info(r, &repository_url)).collect(),
    };
    let entries = match entries_for_push(&push, &rules) {
        Classification::Entries(entries) => entries,
        Classification::Ignored(status) => {
            progress.skip_remaining(&status.reason);
            return Ok(CommandReport::new(status));
        }
    };
    let generated = generated_changelog_commits(&records, Path::new(&workspace.config().file));
    let entries = exclude_generated_commits(entries, &generated);
    tracing::debug!(entries = entries.len(), generated = generated.len(), "classified commits");
    progress.complete_step();

    progress.start_step();
    let changelog = workspace.changelog();
    let outcome = changelog
        .add_entries(entries, &repository_url)
        .with_context(|| format!("Failed to update {}", changelog.file_name()))?;
    progress.complete_step();

    let mut report = CommandReport::new(changelog.update_status(&outcome, &slug));
    report.entries = outcome.added.iter().map(|e| e.entry.label.clone()).collect();

    match outcome.commit_message.as_deref() {
        Some(message) if args.commit => {
            progress.start_step();
            report.commit = Some(workspace.commit_changelog(message, commit_identity(&outcome.added))?);
            progress.complete_step();
        }
        Some(_) => progress.skip_step("--commit not given"),
        None => progress.skip_step("nothing changed"),
    }

    progress.complete();
    Ok(report)
}
