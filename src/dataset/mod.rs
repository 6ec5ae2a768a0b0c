//! Interview dataset: sessions, messages, and the optional research document.
//!
//! Records are loaded once per run from CSV exports and treated as read-only.

mod loader;
mod research;
mod transcript;

pub use loader::{DataSource, MESSAGES_FILE, SESSIONS_FILE};
pub use research::{load_research, ResearchContext};
pub use transcript::{format_transcript, session_ref};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: String,
    pub config_slug: String,
    pub user_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    /// Human-facing sequence number; not unique across themes.
    pub session_number: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}
