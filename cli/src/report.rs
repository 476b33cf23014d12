use crate::error::Result;
use crate::ui;
use changelog::HandlerStatus;
use serde::Serialize;

/// What a command did, printed for humans or as JSON
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    #[serde(flatten)]
    pub status: HandlerStatus,
    /// Labels of the entries written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Release notes with the changelog section appended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
}

impl CommandReport {
    pub fn new(status: HandlerStatus) -> Self {
        Self {
            status,
            entries: Vec::new(),
            commit: None,
            notes: None,
            release_body: None,
            channels: Vec::new(),
        }
    }

    pub fn print(&self, json: bool, verbose: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        ui::handler_status(&self.status, verbose);
        if verbose {
            for label in &self.entries {
                ui::info_message(&format!("Added {label}"));
            }
        }
        if let Some(sha) = &self.commit {
            ui::info_message(&format!("Committed {}", sha.get(..7).unwrap_or(sha)));
        }
        if let Some(notes) = &self.notes {
            ui::info_message("Release notes:");
            ui::markdown_block(notes);
        }
        if let Some(body) = &self.release_body {
            ui::info_message("Updated release body:");
            ui::markdown_block(body);
        }
        if !self.channels.is_empty() {
            ui::info_message(&format!("Announce in: {}", self.channels.join(", ")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flattens_status_and_skips_empty_fields() {
        let mut report = CommandReport::new(HandlerStatus::success("Updated CHANGELOG.md in a/b"));
        report.entries.push("#1".to_string());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["code"], 0);
        assert_eq!(value["visibility"], "visible");
        assert_eq!(value["entries"][0], "#1");
        assert!(value.get("commit").is_none());
        assert!(value.get("channels").is_none());
    }
}
