use crate::error::{Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::report::CommandReport;
use crate::workspace::Workspace;
use changelog::ReleaseOutcome;
use changelog::release::{announcement_channels, merge_release_body};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CloseArgs {
    pub version: String,
    pub date: Option<NaiveDate>,
    pub release_notes: Option<PathBuf>,
    pub linked_channels: Vec<String>,
    pub commit: bool,
}

pub fn execute(workspace: &Workspace, args: CloseArgs, quiet: bool) -> Result<CommandReport> {
    let mut progress = ProgressTracker::new("Close Changelog", quiet).with_steps(&[
        "Adding release section",
        "Committing changelog",
        "Preparing release notes",
    ]);

    progress.start_step();
    let changelog = workspace.changelog();
    let slug = workspace.slug(workspace.repository_url(None).ok().as_deref());
    let outcome = changelog
        .close(&args.version, args.date)
        .with_context(|| format!("Failed to update changelog in {slug} for release {}", args.version))?;
    let mut report = CommandReport::new(changelog.release_status(&outcome, &args.version, &slug));

    let ReleaseOutcome::Released { notes, commit_message, .. } = outcome else {
        progress.skip_remaining(&report.status.reason);
        return Ok(report);
    };
    progress.complete_step();

    if args.commit {
        progress.start_step();
        report.commit = Some(workspace.commit_changelog(&commit_message, None)?);
        progress.complete_step();
    } else {
        progress.skip_step("--commit not given");
    }

    let config = workspace.config();
    let Some(notes) = notes else {
        progress.skip_step("release section is empty");
        progress.complete();
        return Ok(report);
    };

    progress.start_step();
    let existing = match &args.release_notes {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read release notes from {}", path.display()))?,
        ),
        None => None,
    };
    let release_body = merge_release_body(existing.as_deref(), &notes);

    if config.add_changelog_to_release {
        report.release_body = release_body.clone();
    }
    if config.announce && release_body.is_some() {
        report.channels = announcement_channels(config, &args.linked_channels);
    }
    if config.add_changelog_to_release || config.announce {
        report.notes = Some(notes);
    }
    progress.complete_step();

    progress.complete();
    Ok(report)
}
