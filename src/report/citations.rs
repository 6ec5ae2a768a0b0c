use super::rules::patterns;
use crate::dataset::InterviewSession;
use serde::Serialize;

const ID_PREFIX_CHARS: usize = 8;

/// A citation marker found in report text, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationRef {
    /// `#42` style run of digits. Resolves to a session number, or to an id
    /// prefix when it is eight or more digits long and no number matches.
    Digits(String),
    /// `#1a2b3c4d` style reference to the first 8 characters of a session id.
    IdPrefix(String),
}

impl CitationRef {
    /// Classify the hex run after `#`.
    ///
    /// All digits is a session number. Eight or more characters with a hex
    /// letter among the first eight is an id prefix. Anything else falls back
    /// to its leading digit run, and is not a citation if there is none.
    pub fn classify(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }
        if token.bytes().all(|b| b.is_ascii_digit()) {
            return Some(CitationRef::Digits(token.to_string()));
        }
        if token.len() >= ID_PREFIX_CHARS {
            let prefix = &token[..ID_PREFIX_CHARS];
            if prefix.bytes().any(|b| b.is_ascii_alphabetic()) {
                return Some(CitationRef::IdPrefix(prefix.to_string()));
            }
        }
        let digits_end = token
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(token.len());
        (digits_end > 0).then(|| CitationRef::Digits(token[..digits_end].to_string()))
    }

    /// Session number this citation names; `None` if it does not fit one.
    pub fn number(&self) -> Option<u64> {
        match self {
            CitationRef::Digits(digits) => digits.parse().ok(),
            CitationRef::IdPrefix(_) => None,
        }
    }

    fn id_prefix(&self) -> Option<&str> {
        match self {
            CitationRef::Digits(digits) if digits.len() >= ID_PREFIX_CHARS => {
                Some(&digits[..ID_PREFIX_CHARS])
            }
            CitationRef::Digits(_) => None,
            CitationRef::IdPrefix(prefix) => Some(prefix.as_str()),
        }
    }

    /// The session this citation points at. Numbers win over id prefixes.
    fn resolve<'s>(&self, sessions: &'s [InterviewSession]) -> Option<&'s InterviewSession> {
        let by_number = self
            .number()
            .and_then(|n| sessions.iter().find(|s| s.session_number == Some(n)));
        by_number.or_else(|| {
            let prefix = self.id_prefix()?;
            sessions.iter().find(|s| {
                s.id.len() >= ID_PREFIX_CHARS
                    && s.id.is_char_boundary(ID_PREFIX_CHARS)
                    && &s.id[..ID_PREFIX_CHARS] == prefix
            })
        })
    }
}

/// Every citation in `report`, in order of appearance.
pub fn extract_citations(report: &str) -> Vec<CitationRef> {
    patterns()
        .citation
        .find_iter(report)
        .filter_map(|m| CitationRef::classify(&m.as_str()[1..]))
        .collect()
}

/// Citation counts per session id, in first-citation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CitationDistribution {
    entries: Vec<(String, usize)>,
}

impl CitationDistribution {
    fn record(&mut self, session_id: &str) {
        match self.entries.iter_mut().find(|(id, _)| id == session_id) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((session_id.to_string(), 1)),
        }
    }

    pub fn get(&self, session_id: &str) -> usize {
        self.entries
            .iter()
            .find(|(id, _)| id == session_id)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Resolved citations across all sessions.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(id, count)| (id.as_str(), *count))
    }
}

/// Count report citations per session. Citations that resolve to no session are dropped.
pub fn cross_reference(report: &str, sessions: &[InterviewSession]) -> CitationDistribution {
    let mut distribution = CitationDistribution::default();
    for citation in extract_citations(report) {
        if let Some(session) = citation.resolve(sessions) {
            distribution.record(&session.id);
        }
    }
    distribution
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitedSession {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_number: Option<u64>,
    pub citation_count: usize,
}

impl CitedSession {
    /// `#<number>` when the session has one, else `#<id>`.
    pub fn label(&self) -> String {
        match self.session_number {
            Some(n) if n > 0 => format!("#{}", n),
            _ => format!("#{}", self.session_id),
        }
    }
}

/// The `n` most cited sessions, highest count first; ties keep first-citation order.
pub fn top_cited(
    distribution: &CitationDistribution,
    sessions: &[InterviewSession],
    n: usize,
) -> Vec<CitedSession> {
    let mut ranked: Vec<CitedSession> = distribution
        .iter()
        .map(|(session_id, citation_count)| CitedSession {
            session_id: session_id.to_string(),
            session_number: sessions
                .iter()
                .find(|s| s.id == session_id)
                .and_then(|s| s.session_number),
            citation_count,
        })
        .collect();
    ranked.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::session;
    use pretty_assertions::assert_eq;

    fn sessions() -> Vec<InterviewSession> {
        vec![
            session("aaaa1111-0000", Some(1), "2025-01-01T00:00:00Z"),
            session("bbbb2222-0000", Some(2), "2025-01-01T00:00:00Z"),
            session("cccc3333-0000", None, "2025-01-02T00:00:00Z"),
        ]
    }

    #[test]
    fn classification_rules() {
        assert_eq!(CitationRef::classify("42"), Some(CitationRef::Digits("42".to_string())));
        assert_eq!(
            CitationRef::classify("cccc3333"),
            Some(CitationRef::IdPrefix("cccc3333".to_string()))
        );
        assert_eq!(
            CitationRef::classify("1a2b3c4d5e"),
            Some(CitationRef::IdPrefix("1a2b3c4d".to_string()))
        );
        assert_eq!(CitationRef::classify("12ab"), Some(CitationRef::Digits("12".to_string())));
        assert_eq!(CitationRef::classify("fff"), None);
        assert_eq!(CitationRef::classify(""), None);
    }

    #[test]
    fn extracts_in_order_and_skips_headings() {
        let report = "# 見出し\n\"はい\"(#2) と \"いいえ\"(#cccc3333) と #1";
        assert_eq!(
            extract_citations(report),
            vec![
                CitationRef::Digits("2".to_string()),
                CitationRef::IdPrefix("cccc3333".to_string()),
                CitationRef::Digits("1".to_string()),
            ]
        );
    }

    #[test]
    fn overlong_digit_runs_still_count() {
        let citations = extract_citations("\"x\"(#123456789012345678901234)");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].number(), None);
        assert!(cross_reference("\"x\"(#123456789012345678901234)", &sessions()).is_empty());
    }

    #[test]
    fn numeric_id_prefix_falls_back_when_no_number_matches() {
        let mut sessions = sessions();
        sessions.push(session("12345678-9abc", None, "2025-01-03T00:00:00Z"));
        sessions.push(session("dddd4444-0000", Some(12_345_678), "2025-01-03T00:00:00Z"));

        let dist = cross_reference("#12345678 #123456789", &sessions[..4]);
        assert_eq!(dist.iter().collect::<Vec<_>>(), vec![("12345678-9abc", 2)]);

        // A real session number takes precedence over an id prefix.
        let dist = cross_reference("#12345678", &sessions);
        assert_eq!(dist.iter().collect::<Vec<_>>(), vec![("dddd4444-0000", 1)]);
    }

    #[test]
    fn unmatched_citation_is_dropped() {
        let dist = cross_reference("\"x\"(#42)", &sessions());
        assert!(dist.is_empty());
        assert_eq!(dist.total(), 0);
    }

    #[test]
    fn counts_accumulate_in_first_citation_order() {
        let report = "#2 #1 #2 #cccc3333 #2 #99";
        let dist = cross_reference(report, &sessions());
        let entries: Vec<_> = dist.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("bbbb2222-0000", 3),
                ("aaaa1111-0000", 1),
                ("cccc3333-0000", 1)
            ]
        );
        assert_eq!(dist.get("aaaa1111-0000"), 1);
        assert_eq!(dist.get("missing"), 0);
    }

    #[test]
    fn top_cited_is_stable_and_truncated() {
        let report = "#1 #cccc3333 #2 #2";
        let dist = cross_reference(report, &sessions());
        let top = top_cited(&dist, &sessions(), 2);
        assert_eq!(
            top,
            vec![
                CitedSession {
                    session_id: "bbbb2222-0000".to_string(),
                    session_number: Some(2),
                    citation_count: 2,
                },
                CitedSession {
                    session_id: "aaaa1111-0000".to_string(),
                    session_number: Some(1),
                    citation_count: 1,
                },
            ]
        );
    }

    #[test]
    fn label_falls_back_to_id() {
        let cited = CitedSession {
            session_id: "cccc3333-0000".to_string(),
            session_number: None,
            citation_count: 1,
        };
        assert_eq!(cited.label(), "#cccc3333-0000");
    }
}
