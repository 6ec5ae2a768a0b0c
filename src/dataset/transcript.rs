use super::{InterviewSession, Message};
use std::collections::HashMap;

const SESSION_SEPARATOR: &str = "\n\n---\n\n";
const ID_PREFIX_CHARS: usize = 8;

/// Citation handle for a session: `#<number>` when numbered, else `#<first 8 id chars>`.
pub fn session_ref(session: &InterviewSession) -> String {
    match session.session_number {
        Some(number) if number > 0 => format!("#{}", number),
        _ => format!(
            "#{}",
            session.id.chars().take(ID_PREFIX_CHARS).collect::<String>()
        ),
    }
}

/// Render sessions as the transcript block embedded in the prompt.
///
/// Messages keep their source order within each session.
pub fn format_transcript(sessions: &[InterviewSession], messages: &[Message]) -> String {
    let mut by_session: HashMap<&str, Vec<&Message>> = HashMap::new();
    for message in messages {
        by_session
            .entry(message.session_id.as_str())
            .or_default()
            .push(message);
    }

    sessions
        .iter()
        .map(|session| {
            let dialogue = by_session
                .get(session.id.as_str())
                .map(|msgs| {
                    msgs.iter()
                        .map(|m| format!("**{}**: {}", m.role.as_str(), m.content))
                        .collect::<Vec<_>>()
                        .join("\n\n")
                })
                .unwrap_or_default();
            format!(
                "### Session {}\nStatus: {}\n\n{}",
                session_ref(session),
                session.status,
                dialogue
            )
        })
        .collect::<Vec<_>>()
        .join(SESSION_SEPARATOR)
}
