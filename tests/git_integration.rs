#[cfg(test)]
mod tests {
    use changelog::classify::entries_for_push;
    use changelog::commit::commit_identity;
    use changelog::dedup::exclude_generated_commits;
    use changelog::{
        Author, Changelog, ChangelogConfig, Classification, ClassifiedEntry, CommitInfo, CommitRules,
        PushInfo, RepoRef,
    };
    use changelog_tests::{REPO_URL, commit_change, developer, scratch_repository};
    use git::{AuthorInfo, CommitRecord, Repository, generated_changelog_commits};
    use std::fs;
    use std::path::Path;

    fn config() -> ChangelogConfig {
        ChangelogConfig {
            map_added: vec!["^Add".to_string()],
            map_fixed: vec!["^Fix".to_string()],
            map_breaking: vec!["BREAKING".to_string()],
            ..ChangelogConfig::default()
        }
    }

    fn push(records: &[CommitRecord], branch: &str, default_branch: &str) -> PushInfo {
        PushInfo {
            repo: RepoRef::new("atomist", "test"),
            branch: branch.to_string(),
            default_branch: default_branch.to_string(),
            commits: records
                .iter()
                .map(|record| CommitInfo {
                    sha: record.sha.clone(),
                    message: record.message.clone(),
                    url: format!("{REPO_URL}/commit/{}", record.sha),
                    author: None,
                })
                .collect(),
        }
    }

    fn classify(records: &[CommitRecord], rules: &CommitRules) -> Vec<ClassifiedEntry> {
        match entries_for_push(&push(records, "main", "main"), rules) {
            Classification::Entries(entries) => {
                exclude_generated_commits(entries, &generated_changelog_commits(records, Path::new("CHANGELOG.md")))
            }
            Classification::Ignored(_) => Vec::new(),
        }
    }

    #[test]
    fn commit_history_feeds_changelog_and_skips_its_own_commits() {
        let (dir, repo) = scratch_repository();
        let root = dir.path();
        let rules = CommitRules::compile(&config()).unwrap();
        let changelog = Changelog::for_repository(root, config());

        commit_change(&repo, root, "README.md", "# test\n", "Initial commit");
        let widget = commit_change(
            &repo,
            root,
            "src/widget.rs",
            "pub struct Widget;\n",
            "Add widgets\n\nLonger description",
        );
        let crash = commit_change(
            &repo,
            root,
            "src/widget.rs",
            "pub struct Widget(u8);\n",
            "Fix widget crash BREAKING",
        );
        commit_change(&repo, root, "docs/notes.md", "notes\n", "Tidy notes [changelog:changed]");

        let records = repo.commits_between(None, "HEAD").unwrap();
        assert_eq!(records.len(), 4);
        let batch = classify(&records, &rules);
        let labels: Vec<&str> = batch.iter().map(|c| c.entry.label.as_str()).collect();
        assert_eq!(labels, vec![&widget[..7], &crash[..7], &records[3].sha[..7]]);

        let outcome = changelog.add_entries(batch, REPO_URL).unwrap();
        let message = outcome.commit_message.clone().unwrap();
        assert!(message.starts_with("Add changelog entries\n\n"));
        let generated = repo.commit_file(changelog.path(), &message, &developer()).unwrap();
        assert_eq!(repo.head_sha().unwrap(), generated);
        assert!(repo.is_clean().unwrap());

        let content = fs::read_to_string(changelog.path()).unwrap();
        assert!(content.contains(&format!(
            "### Added\n\n-   Add widgets. [{}]({REPO_URL}/commit/{widget})",
            &widget[..7]
        )));
        assert!(content.contains(&format!(
            "### Fixed\n\n-   **BREAKING** Fix widget crash BREAKING. [{}]({REPO_URL}/commit/{crash})",
            &crash[..7]
        )));
        assert!(content.contains("### Changed\n\n-   Tidy notes."));

        // The changelog commit itself reads "Add changelog entries"
        let records = repo.commits_between(None, "HEAD").unwrap();
        let generated_shas = generated_changelog_commits(&records, Path::new("CHANGELOG.md"));
        assert_eq!(generated_shas, vec![generated.clone()]);
        let batch = classify(&records, &rules);
        assert!(batch.iter().all(|c| !generated.starts_with(&c.entry.label)));

        let outcome = changelog.add_entries(batch, REPO_URL).unwrap();
        assert!(!outcome.changed());
    }

    #[test]
    fn range_limits_commits_and_other_branches_are_ignored() {
        let (dir, repo) = scratch_repository();
        let root = dir.path();
        let rules = CommitRules::compile(&config()).unwrap();

        let base = commit_change(&repo, root, "a.txt", "a\n", "Add a");
        commit_change(&repo, root, "b.txt", "b\n", "Fix b");

        let records = repo.commits_between(Some(&base), "HEAD").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message.trim(), "Fix b");
        assert_eq!(records[0].files, vec![Path::new("b.txt").to_path_buf()]);

        let ignored = entries_for_push(&push(&records, "feature", "main"), &rules);
        let Classification::Ignored(status) = ignored else {
            panic!("pushes to feature branches must be ignored");
        };
        assert_eq!(status.reason, "Ignoring pushes to non-default branch");
        assert!(status.is_hidden());
    }

    #[test]
    fn changelog_commit_is_signed_by_the_entry_author() {
        let (dir, repo) = scratch_repository();
        let root = dir.path();
        let rules = CommitRules::compile(&config()).unwrap();
        let changelog = Changelog::for_repository(root, config());
        let contributor = AuthorInfo::new("Mona Lisa", "583231+octocat@users.noreply.github.com");

        commit_change(&repo, root, "README.md", "# test\n", "Initial commit");
        fs::write(root.join("widget.txt"), "widget\n").unwrap();
        repo.commit_file(Path::new("widget.txt"), "Add widgets", &contributor)
            .unwrap();

        let records = repo.commits_between(None, "HEAD").unwrap();
        let mut info = push(&records, "main", "main");
        for (commit, record) in info.commits.iter_mut().zip(&records) {
            commit.author = Some(Author {
                login: "octocat".to_string(),
                name: Some(record.author_name.clone()),
                email: Some(record.author_email.clone()),
            });
        }
        let Classification::Entries(batch) = entries_for_push(&info, &rules) else {
            panic!("pushes to the default branch must be classified");
        };
        assert_eq!(batch.len(), 1);

        let outcome = changelog.add_entries(batch, REPO_URL).unwrap();
        let (name, email) = commit_identity(&outcome.added).unwrap();
        let message = outcome.commit_message.clone().unwrap();
        repo.commit_file(changelog.path(), &message, &AuthorInfo::new(name, email))
            .unwrap();

        let head = repo.commits_between(None, "HEAD").unwrap().pop().unwrap();
        assert_eq!(head.sha, repo.head_sha().unwrap());
        assert_eq!(head.author_name, "Mona Lisa");
        assert_eq!(head.author_email, "583231+octocat@users.noreply.github.com");
        assert!(head.message.starts_with("Add changelog entry\n\n"));
    }
}
