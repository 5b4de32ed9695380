//! Administrative command surface.
//!
//! String-in/lines-out, consumed by the host's command interface. Command
//! words are matched case-insensitively. Owner labels and the last recorded
//! request/reply are only shown to privileged callers.

use crate::service::{IdentService, ListenerStatus};

impl IdentService {
    /// Handle one admin command line, returning the lines to show the caller.
    pub async fn admin_command(&self, line: &str, privileged: bool) -> Vec<String> {
        let command = line.split_whitespace().next().unwrap_or("");

        if command.eq_ignore_ascii_case("help") {
            vec![
                "Command | Description".to_string(),
                "Status  | Displays status information about IdentServer".to_string(),
                "Help    | Lists available commands".to_string(),
            ]
        } else if command.eq_ignore_ascii_case("status") {
            self.status_lines(privileged).await
        } else {
            vec![format!("Unknown command [{command}] try 'Help'")]
        }
    }

    async fn status_lines(&self, privileged: bool) -> Vec<String> {
        let status = self.status().await;
        let mut lines = Vec::new();

        match status.listener {
            ListenerStatus::Listening(addr) => {
                lines.push(format!("IdentServer is listening on: {addr}"));
                if privileged {
                    lines.push("List of active users/networks:".to_string());
                    for label in &status.owners {
                        lines.push(format!("* {label}"));
                    }
                }
            }
            ListenerStatus::Failed => {
                lines.push("WARNING: Opening the listening socket failed!".to_string());
                lines.push("IdentServer isn't listening.".to_string());
            }
            ListenerStatus::Inactive => {
                lines.push("IdentServer isn't listening.".to_string());
            }
        }

        if privileged {
            let (request, reply) = self.resolver().last_exchange();
            lines.push(format!("Last IDENT request: {request}"));
            lines.push(format!("Last IDENT reply: {reply}"));
        }

        lines
    }
}
