use changelog::Category;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keep-changelog")]
#[command(
    author,
    version,
    about = "Keeps a Keep-a-Changelog CHANGELOG.md up to date from issues, commits and releases"
)]
pub struct Cli {
    /// Configuration file (defaults to .changelog.toml in the repository root)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory of the repository
    #[clap(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Enable verbose output, including routine no-op results
    #[clap(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Print the result as JSON instead of human-readable output
    #[clap(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add one entry to the Unreleased section
    Add {
        /// One-line summary of the change
        #[clap(long)]
        title: String,

        /// Short reference such as #123 or an abbreviated commit SHA
        #[clap(long)]
        label: String,

        /// Permalink of the issue, pull request or commit
        #[clap(long)]
        url: String,

        /// Category to file the entry under (repeatable, defaults to changed)
        #[clap(short, long = "category", value_enum)]
        categories: Vec<CategoryArg>,

        /// Mark the entry as a breaking change
        #[clap(long, default_value_t = false)]
        breaking: bool,

        /// GitHub login credited for the change, as `login` or
        /// `login:Full Name <email>` to also sign the commit (repeatable)
        #[clap(long = "author")]
        authors: Vec<String>,

        /// Web URL of the repository (defaults to the origin remote)
        #[clap(long)]
        repo_url: Option<String>,

        /// Commit the updated changelog
        #[clap(long, default_value_t = false)]
        commit: bool,
    },

    /// Add entries for the commits in a range of history
    Commits {
        /// Exclusive start of the range (defaults to the beginning of history)
        #[clap(long)]
        from: Option<String>,

        /// Inclusive end of the range
        #[clap(long, default_value = "HEAD")]
        to: String,

        /// Web URL of the repository (defaults to the origin remote)
        #[clap(long)]
        repo_url: Option<String>,

        /// Commit the updated changelog
        #[clap(long, default_value_t = false)]
        commit: bool,
    },

    /// Turn the Unreleased section into a dated release section
    Close {
        /// Release version, used verbatim in the heading
        version: String,

        /// Release date as YYYY-MM-DD (defaults to today)
        #[clap(long)]
        date: Option<NaiveDate>,

        /// File holding the current release notes, to append the section to
        #[clap(long)]
        release_notes: Option<PathBuf>,

        /// Chat channels linked to the repository, used when none are configured
        #[clap(long = "linked-channel")]
        linked_channels: Vec<String>,

        /// Commit the updated changelog
        #[clap(long, default_value_t = false)]
        commit: bool,
    },

    /// Print the changelog section of a released version
    Notes {
        version: String,
    },

    /// Rewrite reference-style links as inline links
    Normalize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryArg {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Added => Category::Added,
            CategoryArg::Changed => Category::Changed,
            CategoryArg::Deprecated => Category::Deprecated,
            CategoryArg::Removed => Category::Removed,
            CategoryArg::Fixed => Category::Fixed,
            CategoryArg::Security => Category::Security,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_repeated_categories() {
        let cli = Cli::try_parse_from([
            "keep-changelog",
            "--json",
            "add",
            "--title",
            "Support TOML",
            "--label",
            "#4",
            "--url",
            "https://github.com/atomist/test/issues/4",
            "-c",
            "added",
            "--category",
            "fixed",
            "--author",
            "foo",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Add { categories, authors, commit, .. } => {
                assert_eq!(categories, vec![CategoryArg::Added, CategoryArg::Fixed]);
                assert_eq!(authors, vec!["foo".to_string()]);
                assert!(!commit);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn parses_close_date() {
        let cli = Cli::try_parse_from(["keep-changelog", "close", "1.2.0", "--date", "2021-05-04"])
            .unwrap();
        match cli.command {
            Commands::Close { version, date, .. } => {
                assert_eq!(version, "1.2.0");
                assert_eq!(date, NaiveDate::from_ymd_opt(2021, 5, 4));
            }
            _ => panic!("expected close"),
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(
            Cli::try_parse_from([
                "keep-changelog", "add", "--title", "t", "--label", "l", "--url", "u", "-c", "misc",
            ])
            .is_err()
        );
    }
}
