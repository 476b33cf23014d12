use crate::error::{Result, ResultExt};
use crate::report::CommandReport;
use crate::workspace::Workspace;
use changelog::HandlerStatus;

pub fn execute(workspace: &Workspace) -> Result<CommandReport> {
    let changelog = workspace.changelog();
    let file = changelog.file_name();
    if !changelog.path().exists() {
        return Ok(CommandReport::new(
            HandlerStatus::success(format!("No {file} found")).hidden(),
        ));
    }

    let changed = changelog
        .normalize_links()
        .with_context(|| format!("Failed to normalize links in {file}"))?;
    let status = if changed {
        HandlerStatus::success(format!("Inlined reference links in {file}"))
    } else {
        HandlerStatus::success(format!("{file} already uses inline links")).hidden()
    };
    Ok(CommandReport::new(status))
}
