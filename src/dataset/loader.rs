use super::{InterviewSession, Message, Role};
use crate::error::{AnalysisError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SESSIONS_FILE: &str = "public_interview_sessions.csv";
pub const MESSAGES_FILE: &str = "public_messages.csv";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SessionRow {
    id: String,
    slug: String,
    user_id: String,
    status: String,
    created_at: String,
    updated_at: String,
    session_number: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    timestamp: String,
}

/// Leading-digit parse so exports like `12` or `12.0` both map to 12.
fn parse_session_number(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn non_empty(raw: String) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Directory holding the two CSV exports.
#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
}

impl DataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn reader(&self, file: &str) -> Result<(PathBuf, csv::Reader<std::fs::File>)> {
        let path = self.root.join(file);
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| AnalysisError::csv(&path, e))?;
        Ok((path, reader))
    }

    /// Load sessions, optionally restricted to one theme slug. Source order is kept.
    pub fn load_sessions(&self, slug: Option<&str>) -> Result<Vec<InterviewSession>> {
        let (path, mut reader) = self.reader(SESSIONS_FILE)?;
        let mut sessions = Vec::new();
        for row in reader.deserialize::<SessionRow>() {
            let row = row.map_err(|e| AnalysisError::csv(&path, e))?;
            if row.id.trim().is_empty() {
                tracing::debug!("skipping session row without id");
                continue;
            }
            if slug.is_some_and(|wanted| wanted != row.slug) {
                continue;
            }
            sessions.push(InterviewSession {
                session_number: parse_session_number(&row.session_number),
                id: row.id,
                config_slug: row.slug,
                user_id: non_empty(row.user_id),
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            });
        }
        tracing::debug!(count = sessions.len(), path = %path.display(), "loaded sessions");
        Ok(sessions)
    }

    /// Load messages belonging to the given sessions (all messages when `None`).
    pub fn load_messages(&self, session_ids: Option<&HashSet<&str>>) -> Result<Vec<Message>> {
        let (path, mut reader) = self.reader(MESSAGES_FILE)?;
        let mut messages = Vec::new();
        let mut skipped_roles = 0usize;
        for row in reader.deserialize::<MessageRow>() {
            let row = row.map_err(|e| AnalysisError::csv(&path, e))?;
            if session_ids.is_some_and(|ids| !ids.contains(row.session_id.as_str())) {
                continue;
            }
            let Some(role) = Role::parse(&row.role) else {
                skipped_roles += 1;
                continue;
            };
            messages.push(Message {
                id: row.id,
                session_id: row.session_id,
                role,
                content: row.content,
                timestamp: row.timestamp,
            });
        }
        if skipped_roles > 0 {
            tracing::warn!(
                skipped = skipped_roles,
                "ignored messages with a role other than user/assistant"
            );
        }
        tracing::debug!(count = messages.len(), path = %path.display(), "loaded messages");
        Ok(messages)
    }

    /// Distinct theme slugs present in the sessions export, in first-seen order.
    pub fn known_slugs(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        Ok(self
            .load_sessions(None)?
            .into_iter()
            .filter_map(|s| {
                if seen.insert(s.config_slug.clone()) {
                    Some(s.config_slug)
                } else {
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join(SESSIONS_FILE),
            "id,slug,user_id,status,created_at,updated_at,session_number\n\
             s-1,bill-of-lading,u1,completed,2025-01-02T10:00:00Z,2025-01-02T11:00:00Z,12\n\
             s-2,ai-plan-test,,active,2025-01-03T10:00:00Z,2025-01-03T10:30:00Z,\n\
             s-3,bill-of-lading,,completed,2025-01-03T09:00:00Z,2025-01-03T09:30:00Z,13.0\n",
        )
        .unwrap();
        fs::write(
            dir.join(MESSAGES_FILE),
            "id,session_id,role,content,timestamp\n\
             m-1,s-1,assistant,\"こんにちは。\nご意見をどうぞ\",2025-01-02T10:00:01Z\n\
             m-2,s-1,user,紙が残るのが不安です,2025-01-02T10:00:05Z\n\
             m-3,s-2,user,hello,2025-01-03T10:00:05Z\n\
             m-4,s-3,system,internal note,2025-01-03T09:00:00Z\n\
             m-5,s-3,user,コストが心配,2025-01-03T09:00:10Z\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_sessions_filtered_by_slug() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let source = DataSource::new(dir.path());

        let sessions = source.load_sessions(Some("bill-of-lading")).unwrap();
        let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s-1", "s-3"]);
        assert_eq!(sessions[0].session_number, Some(12));
        assert_eq!(sessions[0].user_id.as_deref(), Some("u1"));
        assert_eq!(sessions[1].session_number, Some(13));
        assert_eq!(sessions[1].user_id, None);
    }

    #[test]
    fn loads_messages_for_selected_sessions_in_source_order() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let source = DataSource::new(dir.path());

        let ids: HashSet<&str> = ["s-1", "s-3"].into_iter().collect();
        let messages = source.load_messages(Some(&ids)).unwrap();
        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        // m-4 has an unsupported role and is dropped
        assert_eq!(ids, vec!["m-1", "m-2", "m-5"]);
        assert_eq!(messages[0].content, "こんにちは。\nご意見をどうぞ");
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn known_slugs_are_distinct_in_first_seen_order() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        let slugs = DataSource::new(dir.path()).known_slugs().unwrap();
        assert_eq!(slugs, vec!["bill-of-lading".to_string(), "ai-plan-test".to_string()]);
    }

    #[test]
    fn missing_file_is_a_csv_error_naming_the_path() {
        let dir = tempdir().unwrap();
        let err = DataSource::new(dir.path()).load_sessions(None).unwrap_err();
        assert!(err.to_string().contains(SESSIONS_FILE));
    }

    #[test]
    fn session_number_parsing() {
        assert_eq!(parse_session_number("42"), Some(42));
        assert_eq!(parse_session_number(" 7.0 "), Some(7));
        assert_eq!(parse_session_number(""), None);
        assert_eq!(parse_session_number("n/a"), None);
    }
}
