use crate::cli::CategoryArg;
use crate::error::{Result, ResultExt};
use crate::progress::ProgressTracker;
use crate::report::CommandReport;
use crate::workspace::Workspace;
use changelog::commit::commit_identity;
use changelog::{Author, Category, ChangelogEntry, ClassifiedEntry, Qualifier};

pub struct AddArgs {
    pub title: String,
    pub label: String,
    pub url: String,
    pub categories: Vec<CategoryArg>,
    pub breaking: bool,
    pub authors: Vec<String>,
    pub repo_url: Option<String>,
    pub commit: bool,
}

impl AddArgs {
    fn classified_entry(&self) -> ClassifiedEntry {
        let mut entry = ChangelogEntry::new(self.title.as_str(), self.label.as_str(), self.url.as_str());
        if self.breaking {
            entry = entry.with_qualifier(Qualifier::Breaking);
        }
        for author in &self.authors {
            entry = entry.with_author(parse_author(author));
        }
        let mut categories: Vec<Category> = Vec::with_capacity(self.categories.len());
        for category in self.categories.iter().copied().map(Category::from) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        ClassifiedEntry::new(entry, categories)
    }
}

/// `login` or `login:Full Name <email>`
fn parse_author(value: &str) -> Author {
    let Some((login, identity)) = value.split_once(':') else {
        return Author::new(value.trim());
    };
    let mut author = Author::new(login.trim());
    if let Some((name, rest)) = identity.split_once('<') {
        let email = rest.trim_end().trim_end_matches('>').trim();
        let name = name.trim();
        if !name.is_empty() && !email.is_empty() {
            author.name = Some(name.to_string());
            author.email = Some(email.to_string());
        }
    }
    author
}

pub fn execute(workspace: &Workspace, args: AddArgs, quiet: bool) -> Result<CommandReport> {
    let mut progress = ProgressTracker::new("Add Changelog Entry", quiet).with_steps(&[
        "Resolving repository URL",
        "Updating changelog",
        "Committing changelog",
    ]);

    progress.start_step();
    let repository_url = workspace.repository_url(args.repo_url.as_deref())?;
    let slug = workspace.slug(Some(&repository_url));
    progress.complete_step();

    progress.start_step();
    let changelog = workspace.changelog();
    let outcome = changelog
        .add_entries(vec![args.classified_entry()], &repository_url)
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
