//! Lexical rule tables shared by the report validator and the prompt composer.
//!
//! The prompt tells the model which phrases are off limits and the validator
//! checks for the same phrases, so both read from here.

use regex::Regex;
use std::sync::OnceLock;

/// Report length below which the validator warns.
pub const MIN_REPORT_CHARS: usize = 10_000;
/// Report length above which the validator warns.
pub const MAX_REPORT_CHARS: usize = 20_000;
/// Citation count below which the validator warns (zero is an error).
pub const CITATION_WARNING_FLOOR: usize = 30;
/// Total citations the prompt asks for.
pub const REQUESTED_TOTAL_CITATIONS: usize = 50;
/// Distinct sessions the prompt asks to cite per hypothesis.
pub const REQUESTED_SESSIONS_PER_HYPOTHESIS: usize = 10;

/// Vague quantity wording that hides how many participants said something.
pub const QUANTITY_PHRASES: &[&str] = &[
    "多くの参加者",
    "一部の人",
    "ほとんどの人",
    "大半が",
    "少数だが",
    "複数の参加者",
    "何人かの",
    "大多数",
    "少数の",
];

/// Evaluative wording that is not backed by a citation.
pub const VALUE_JUDGMENT_PHRASES: &[&str] = &[
    "さらに踏み込み",
    "より高度な",
    "深い洞察",
    "優れた提案",
    "重要度が高い",
    "素晴らしい",
    "非常に重要",
    "画期的な",
];

/// A named group of forbidden phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseCategory {
    /// Label used in validator messages, e.g. `数量表現`.
    pub label: &'static str,
    pub phrases: &'static [&'static str],
}

pub const FORBIDDEN_CATEGORIES: &[PhraseCategory] = &[
    PhraseCategory {
        label: "数量表現",
        phrases: QUANTITY_PHRASES,
    },
    PhraseCategory {
        label: "価値判断",
        phrases: VALUE_JUDGMENT_PHRASES,
    },
];

/// Thresholds and phrase tables driving [`super::quality::validate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub min_chars: usize,
    pub max_chars: usize,
    pub citation_warning_floor: usize,
    pub forbidden: &'static [PhraseCategory],
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            min_chars: MIN_REPORT_CHARS,
            max_chars: MAX_REPORT_CHARS,
            citation_warning_floor: CITATION_WARNING_FLOOR,
            forbidden: FORBIDDEN_CATEGORIES,
        }
    }
}

/// Canonical citation token: `#` followed by lowercase hex.
pub const CITATION_PATTERN: &str = r"#[0-9a-f]+";
/// A quoted statement followed by its citation, `"発言"(#12)` or with full-width parentheses.
pub const QUOTED_CITATION_PATTERN: &str = r#""[^"]*"[(（]#[0-9a-f]+[)）]"#;
/// A transcript speaker line such as `**user**: ...`.
pub const SPEAKER_LINE_PATTERN: &str = r"\*\*[a-z]+\*\*: [^\n]*";
pub const HTML_TAG_PATTERN: &str = r"<[^>]+>";
pub const BOLD_PATTERN: &str = r"\*\*[^*]+\*\*";

/// Compiled forms of the pattern constants, built once per process.
pub(crate) struct Patterns {
    pub citation: Regex,
    pub quoted_citation: Regex,
    pub speaker_line: Regex,
    pub html_tag: Regex,
    pub bold: Regex,
}

pub(crate) fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        citation: Regex::new(CITATION_PATTERN).expect("citation pattern compiles"),
        quoted_citation: Regex::new(QUOTED_CITATION_PATTERN)
            .expect("quoted citation pattern compiles"),
        speaker_line: Regex::new(SPEAKER_LINE_PATTERN).expect("speaker pattern compiles"),
        html_tag: Regex::new(HTML_TAG_PATTERN).expect("html pattern compiles"),
        bold: Regex::new(BOLD_PATTERN).expect("bold pattern compiles"),
    })
}

/// Render a phrase list the way the prompt quotes it: `「a」「b」`.
pub fn quoted_phrase_list(phrases: &[&str]) -> String {
    phrases.iter().map(|p| format!("「{}」", p)).collect()
}

/// `12345` -> `12,345`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
