use crate::error::{Result, ResultExt};
use crate::report::CommandReport;
use crate::workspace::Workspace;
use changelog::HandlerStatus;
use changelog::release::find_version_body;

pub fn execute(workspace: &Workspace, version: &str) -> Result<CommandReport> {
    let changelog = workspace.changelog();
    if !changelog.path().exists() {
        return Ok(CommandReport::new(HandlerStatus::failure(format!(
            "No {} found",
            changelog.file_name()
        ))));
    }

    let document = changelog
        .parse_file()
        .with_context(|| format!("Failed to read release notes for {version}"))?;

    let report = match find_version_body(version, Some(&document)) {
        Some(notes) => {
            let mut report = CommandReport::new(HandlerStatus::success(format!(
                "Release notes for {version}"
            )));
            report.notes = Some(notes);
            report
        }
        None => CommandReport::new(HandlerStatus::failure(format!(
            "No section for {version} in {}",
            changelog.file_name()
        ))),
    };
    Ok(report)
}
