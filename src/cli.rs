//! Line-by-line terminal front-end over a `Session`

use crate::logging;
use crate::profile::ProfileStore;
use crate::session::{Session, Speaker};

pub const GREETING: &str = "InnerCompanion - a gentle, warm, reflective companion.\n\
This is a prototype, never a replacement for professional support.\n\
Commands: /name <name>, /age <age>, /note <something to remember>, /quit\n\n\
I'm here. What's on your heart today?";

/// What the front-end should do after one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Print(String),
    /// Storage failed for this line only; the loop keeps going
    Failed(String),
    Silent,
    Quit,
}

/// Split "/cmd value" into its parts
pub fn parse_command(input: &str) -> Option<(&str, &str)> {
    if !input.starts_with('/') {
        return None;
    }
    let (command, value) = input.split_once(' ').unwrap_or((input, ""));
    Some((command, value.trim()))
}

/// Handle one line of user input. Errors never end the session.
pub async fn handle_line<S: ProfileStore>(session: &mut Session<S>, line: &str) -> LineOutcome {
    let input = line.trim();
    let user = Some(session.engine().user_id().to_string());

    if input == "/quit" {
        return LineOutcome::Quit;
    }

    if let Some((command, value)) = parse_command(input) {
        let value = Some(value.to_string());
        let saved = match command {
            "/name" => session.remember(value, None, None),
            "/age" => session.remember(None, value, None),
            "/note" => session.remember(None, None, value),
            _ => return LineOutcome::Print(format!("Unknown command: {}", command)),
        };
        return match saved {
            Ok(_) => LineOutcome::Print("Saved with care.\n".to_string()),
            Err(e) => {
                logging::log_error(user.as_deref(), &e.to_string());
                LineOutcome::Failed(format!("Could not save: {}", e))
            }
        };
    }

    match session.send(input).await {
        Ok(Some(reply)) => {
            LineOutcome::Print(format!("{}:\n{}\n", Speaker::Companion.label(), reply.text))
        }
        Ok(None) => LineOutcome::Silent,
        Err(e) => {
            logging::log_error(user.as_deref(), &format!("Turn failed: {}", e));
            LineOutcome::Failed(format!("Could not save: {}", e))
        }
    }
}
