//! Descriptive statistics over the sessions and messages of one run.

use super::citations::{top_cited, CitationDistribution, CitedSession};
use super::rules::group_thousands;
use crate::dataset::{InterviewSession, Message, Role};
use crate::error::{AnalysisError, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Number of sessions kept in the top-cited ranking.
pub const TOP_CITED_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct QuantitativeStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub total_user_messages: usize,
    pub total_assistant_messages: usize,
    /// Rounded to one decimal.
    pub avg_messages_per_session: f64,
    /// Upper median of per-session message counts.
    pub median_messages_per_session: usize,
    pub citation_distribution: CitationDistribution,
    pub top_cited_sessions: Vec<CitedSession>,
    /// `YYYY-MM-DD` -> sessions created that day.
    pub sessions_per_day: BTreeMap<String, usize>,
    pub analysis_date: String,
}

/// Per-session breakdown for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u64>,
    pub message_count: usize,
    pub user_message_count: usize,
    pub assistant_message_count: usize,
    /// Mean content length in characters, rounded.
    pub avg_message_length: usize,
    pub created_at: String,
}

/// The stats record as stored in `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub total_user_messages: usize,
    pub total_assistant_messages: usize,
    pub avg_messages_per_session: f64,
    pub median_messages_per_session: usize,
    pub top_cited_sessions: Vec<CitedSession>,
    pub analysis_date: String,
    pub sessions_per_day: BTreeMap<String, usize>,
}

fn messages_by_session(messages: &[Message]) -> HashMap<&str, Vec<&Message>> {
    let mut grouped: HashMap<&str, Vec<&Message>> = HashMap::new();
    for message in messages {
        grouped
            .entry(message.session_id.as_str())
            .or_default()
            .push(message);
    }
    grouped
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn day_of(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Summarize a batch. Citation fields start empty; see [`QuantitativeStats::merge_citations`].
pub fn summarize(sessions: &[InterviewSession], messages: &[Message]) -> Result<QuantitativeStats> {
    if sessions.is_empty() {
        return Err(AnalysisError::NoSessions {
            slug: String::new(),
        });
    }

    let grouped = messages_by_session(messages);
    let mut counts: Vec<usize> = sessions
        .iter()
        .map(|s| grouped.get(s.id.as_str()).map_or(0, Vec::len))
        .collect();

    let avg = counts.iter().sum::<usize>() as f64 / sessions.len() as f64;
    counts.sort_unstable();
    let median = counts[counts.len() / 2];

    let mut sessions_per_day = BTreeMap::new();
    for session in sessions {
        *sessions_per_day
            .entry(day_of(&session.created_at).to_string())
            .or_insert(0) += 1;
    }

    Ok(QuantitativeStats {
        total_sessions: sessions.len(),
        total_messages: messages.len(),
        total_user_messages: messages.iter().filter(|m| m.role == Role::User).count(),
        total_assistant_messages: messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count(),
        avg_messages_per_session: round_one_decimal(avg),
        median_messages_per_session: median,
        citation_distribution: CitationDistribution::default(),
        top_cited_sessions: Vec::new(),
        sessions_per_day,
        analysis_date: Utc::now().format("%Y-%m-%d").to_string(),
    })
}

impl QuantitativeStats {
    /// Attach a citation distribution and its top-N ranking.
    pub fn merge_citations(
        &mut self,
        distribution: CitationDistribution,
        sessions: &[InterviewSession],
        top_n: usize,
    ) {
        self.top_cited_sessions = top_cited(&distribution, sessions, top_n);
        self.citation_distribution = distribution;
    }

    pub fn serialize(&self) -> SerializedStats {
        SerializedStats {
            total_sessions: self.total_sessions,
            total_messages: self.total_messages,
            total_user_messages: self.total_user_messages,
            total_assistant_messages: self.total_assistant_messages,
            avg_messages_per_session: self.avg_messages_per_session,
            median_messages_per_session: self.median_messages_per_session,
            top_cited_sessions: self.top_cited_sessions.clone(),
            analysis_date: self.analysis_date.clone(),
            sessions_per_day: self.sessions_per_day.clone(),
        }
    }
}

pub fn session_details(sessions: &[InterviewSession], messages: &[Message]) -> Vec<SessionAnalytics> {
    let grouped = messages_by_session(messages);
    sessions
        .iter()
        .map(|session| {
            let own = grouped.get(session.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let total_len: usize = own.iter().map(|m| m.content.chars().count()).sum();
            let avg_len = if own.is_empty() {
                0
            } else {
                (total_len as f64 / own.len() as f64).round() as usize
            };
            SessionAnalytics {
                session_id: session.id.clone(),
                session_number: session.session_number,
                message_count: own.len(),
                user_message_count: own.iter().filter(|m| m.role == Role::User).count(),
                assistant_message_count: own.iter().filter(|m| m.role == Role::Assistant).count(),
                avg_message_length: avg_len,
                created_at: session.created_at.clone(),
            }
        })
        .collect()
}

/// The quantitative report written next to the generated analysis.
pub fn render_markdown(stats: &QuantitativeStats) -> String {
    let mut lines = vec![
        "# 定量分析レポート".to_string(),
        String::new(),
        format!("**分析日**: {}", stats.analysis_date),
        String::new(),
        "## 基本統計".to_string(),
        String::new(),
        format!("- **総セッション数**: {}件", group_thousands(stats.total_sessions)),
        format!("- **総メッセージ数**: {}件", group_thousands(stats.total_messages)),
        format!(
            "  - ユーザーメッセージ: {}件",
            group_thousands(stats.total_user_messages)
        ),
        format!(
            "  - アシスタントメッセージ: {}件",
            group_thousands(stats.total_assistant_messages)
        ),
        String::new(),
        "## セッション統計".to_string(),
        String::new(),
        format!(
            "- **平均メッセージ数/セッション**: {:.1}件",
            stats.avg_messages_per_session
        ),
        format!(
            "- **中央値メッセージ数/セッション**: {}件",
            stats.median_messages_per_session
        ),
        String::new(),
    ];

    if !stats.top_cited_sessions.is_empty() {
        lines.push("## 引用頻度上位セッション".to_string());
        lines.push(String::new());
        lines.push("| 順位 | セッション番号 | 引用回数 |".to_string());
        lines.push("|------|---------------|----------|".to_string());
        for (rank, item) in stats.top_cited_sessions.iter().enumerate() {
            lines.push(format!(
                "| {} | {} | {}回 |",
                rank + 1,
                item.label(),
                item.citation_count
            ));
        }
        lines.push(String::new());
    }

    if !stats.sessions_per_day.is_empty() {
        lines.push("## 時系列分析".to_string());
        lines.push(String::new());
        lines.push("| 日付 | セッション数 |".to_string());
        lines.push("|------|-------------|".to_string());
        for (date, count) in &stats.sessions_per_day {
            lines.push(format!("| {} | {}件 |", date, count));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Short console digest: totals plus the five most cited sessions.
pub fn render_console_summary(stats: &QuantitativeStats) -> String {
    let mut lines = vec![
        "Quantitative summary".to_string(),
        format!("  sessions: {}", group_thousands(stats.total_sessions)),
        format!("  messages: {}", group_thousands(stats.total_messages)),
        format!(
            "  avg messages/session: {:.1}",
            stats.avg_messages_per_session
        ),
    ];
    if !stats.top_cited_sessions.is_empty() {
        lines.push("  most cited:".to_string());
        for (rank, item) in stats.top_cited_sessions.iter().take(5).enumerate() {
            lines.push(format!(
                "    {}. {}: {}",
                rank + 1,
                item.label(),
                item.citation_count
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::{message, session};
    use crate::report::citations::cross_reference;
    use pretty_assertions::assert_eq;

    fn batch(counts: &[usize]) -> (Vec<InterviewSession>, Vec<Message>) {
        let mut sessions = Vec::new();
        let mut messages = Vec::new();
        for (i, count) in counts.iter().enumerate() {
            let id = format!("session-{}", i);
            sessions.push(session(&id, Some(i as u64 + 1), "2025-03-01T10:00:00Z"));
            for j in 0..*count {
                let role = if j % 2 == 0 { Role::Assistant } else { Role::User };
                messages.push(message(&format!("{}-{}", id, j), &id, role, "ok"));
            }
        }
        (sessions, messages)
    }

    #[test]
    fn upper_median_of_even_count() {
        let (sessions, messages) = batch(&[1, 3, 5, 7]);
        let stats = summarize(&sessions, &messages).unwrap();
        assert_eq!(stats.median_messages_per_session, 5);
        assert_eq!(stats.avg_messages_per_session, 4.0);
    }

    #[test]
    fn average_and_median_of_odd_count() {
        let (sessions, messages) = batch(&[2, 4, 6]);
        let stats = summarize(&sessions, &messages).unwrap();
        assert_eq!(stats.avg_messages_per_session, 4.0);
        assert_eq!(stats.median_messages_per_session, 4);
        assert_eq!(stats.total_messages, 12);
        assert_eq!(stats.total_user_messages, 6);
        assert_eq!(stats.total_assistant_messages, 6);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let (sessions, messages) = batch(&[1, 1, 2]);
        let stats = summarize(&sessions, &messages).unwrap();
        assert_eq!(stats.avg_messages_per_session, 1.3);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = summarize(&[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::NoSessions { .. }));
    }

    #[test]
    fn sessions_per_day_sorted_by_date() {
        let sessions = vec![
            session("a", Some(1), "2025-03-02T09:00:00Z"),
            session("b", Some(2), "2025-03-01T09:00:00Z"),
            session("c", Some(3), "2025-03-02T18:00:00Z"),
        ];
        let stats = summarize(&sessions, &[]).unwrap();
        let days: Vec<_> = stats.sessions_per_day.iter().collect();
        assert_eq!(
            days,
            vec![(&"2025-03-01".to_string(), &1), (&"2025-03-02".to_string(), &2)]
        );
        assert_eq!(stats.median_messages_per_session, 0);
    }

    #[test]
    fn merge_citations_fills_ranking_and_markdown() {
        let (sessions, messages) = batch(&[2, 2]);
        let mut stats = summarize(&sessions, &messages).unwrap();
        assert!(stats.top_cited_sessions.is_empty());

        let dist = cross_reference("#2 #2 #1", &sessions);
        stats.merge_citations(dist, &sessions, TOP_CITED_LIMIT);
        assert_eq!(stats.top_cited_sessions[0].session_id, "session-1");
        assert_eq!(stats.citation_distribution.total(), 3);

        let md = render_markdown(&stats);
        assert!(md.starts_with("# 定量分析レポート"));
        assert!(md.contains("| 1 | #2 | 2回 |"));
        assert!(md.contains("| 2025-03-01 | 2件 |"));
        assert!(md.contains("- **平均メッセージ数/セッション**: 2.0件"));

        let json = serde_json::to_value(stats.serialize()).unwrap();
        assert_eq!(json["totalSessions"], 2);
        assert_eq!(json["topCitedSessions"][0]["sessionNumber"], 2);
        assert_eq!(json["sessionsPerDay"]["2025-03-01"], 2);
    }

    #[test]
    fn per_session_details() {
        let sessions = vec![session("a", Some(1), "2025-03-01T00:00:00Z"), session("b", None, "x")];
        let messages = vec![
            message("1", "a", Role::Assistant, "abcd"),
            message("2", "a", Role::User, "ab"),
            message("3", "a", Role::User, "abcdefgh"),
        ];
        let details = session_details(&sessions, &messages);
        assert_eq!(details[0].message_count, 3);
        assert_eq!(details[0].user_message_count, 2);
        assert_eq!(details[0].assistant_message_count, 1);
        assert_eq!(details[0].avg_message_length, 5);
        assert_eq!(details[1].message_count, 0);
        assert_eq!(details[1].avg_message_length, 0);
    }
}
