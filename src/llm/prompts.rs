//! Prompt text sent to the model.
//!
//! Reports are written in Japanese, so the instructions are too. Numeric
//! limits and forbidden phrases come from [`crate::report::rules`] so the
//! instruction and the post-generation check stay in step.

use crate::dataset::ResearchContext;
use crate::report::rules::{
    group_thousands, quoted_phrase_list, FORBIDDEN_CATEGORIES, MAX_REPORT_CHARS,
    MIN_REPORT_CHARS, REQUESTED_SESSIONS_PER_HYPOTHESIS, REQUESTED_TOTAL_CITATIONS,
};
use crate::themes::{Hypothesis, ThemeConfig};
use serde::{Deserialize, Serialize};

/// System message for the report-generation call.
pub const REPORT_SYSTEM_MESSAGE: &str = "You are a professional policy analyst specializing in detailed, comprehensive reports. You MUST produce reports of at least 10,000 characters with extensive quotations from source data. Never produce short summaries or incomplete analysis. Follow all formatting and length requirements precisely.";

/// System message for hypothesis drafting.
pub const SYSTEM_INSTRUCTION: &str = r#"あなたは政策分析とインタビューデータ分析の専門家です。

以下の原則を厳守してください：
1. 正確性: 存在しない発言を捏造しない（ハルシネーション禁止）
2. 証拠主義: 全ての主張は具体的な引用で裏付ける
3. 多角性: 賛否両論をバランスよく反映
4. 構造性: 読みやすく、再現可能な形式で出力
5. 深掘り: 表面的な分析ではなく、背景や文脈まで考察

あなたの分析結果は政策決定に影響を与える可能性があるため、高い精度と倫理性が求められます。"#;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub main_question: String,
}

/// Interview-specific background that replaces or extends the theme defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewOverrides {
    /// Replaces the theme description when non-empty.
    pub description: Option<String>,
    pub overview: Option<String>,
    pub themes: Vec<String>,
    pub questions: Vec<InterviewQuestion>,
    pub knowledge_context: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// `仮説N: category\ndescription` blocks in configured order.
pub fn format_hypotheses(hypotheses: &[Hypothesis]) -> String {
    hypotheses
        .iter()
        .enumerate()
        .map(|(i, h)| format!("仮説{}: {}\n{}", i + 1, h.category, h.description))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn numbered(items: impl IntoIterator<Item = String>) -> String {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn background_blocks(theme: &ThemeConfig, overrides: Option<&InterviewOverrides>) -> String {
    let description = overrides
        .and_then(|o| non_empty(&o.description))
        .unwrap_or(&theme.description);
    let mut out = format!("【説明】\n{}\n\n", description);

    let Some(o) = overrides else {
        return out;
    };
    if let Some(overview) = non_empty(&o.overview) {
        out.push_str(&format!("【概要】\n{}\n\n", overview));
    }
    if !o.themes.is_empty() {
        out.push_str(&format!("【主なテーマ】\n{}\n\n", numbered(o.themes.iter().cloned())));
    }
    if !o.questions.is_empty() {
        let questions = numbered(
            o.questions
                .iter()
                .map(|q| format!("**{}**: {}", q.topic, q.main_question)),
        );
        out.push_str(&format!("【インタビューで扱った質問】\n{}\n\n", questions));
    }
    if let Some(knowledge) = non_empty(&o.knowledge_context) {
        out.push_str(&format!("【参考知識・コンテキスト】\n{}\n\n", knowledge));
    }
    out
}

fn research_block(research: &ResearchContext) -> String {
    let body = research
        .full_content
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(&research.summary);
    let mut out = format!(
        "【Deep Research結果】\n以下は、{}に関する詳細な調査結果です。この情報を参考にして、インタビュー分析の文脈を深めてください。\n\n{}\n\n",
        research.title, body
    );
    if !research.key_findings.is_empty() {
        out.push_str(&format!(
            "主要な発見:\n{}\n\n",
            numbered(research.key_findings.iter().cloned())
        ));
    }
    out
}

fn constraints(title: &str) -> String {
    let mut rules = vec![
        "Markdownフォーマットで出力してください".to_string(),
        "HTMLタグは使用しないでください".to_string(),
        "太字マークダウン（**）は使用しないでください".to_string(),
        format!("前置きや説明は不要で、「# {} - 集約レポート」から始めてください", title),
        "具体的な発言を引用する場合は、必ず「\"発言内容\"(#セッション番号)」の形式で出典を明記してください".to_string(),
        "個々のセッションの要約ではなく、横断的な分析に焦点を当ててください".to_string(),
        "【重要】インタビュー参加者の生の声を積極的に引用してください".to_string(),
    ];
    for category in FORBIDDEN_CATEGORIES {
        rules.push(format!(
            "【重要】{}を使用禁止：{}",
            category.label,
            quoted_phrase_list(category.phrases)
        ));
    }
    rules.push(
        "【重要】レトリックや主観的な修飾語を排除し、学術論文のように客観的かつ簡潔に記述してください"
            .to_string(),
    );
    rules.push(format!(
        "【最重要】Target output length: {}-{} characters. 各仮説について最低{}個以上の異なるセッションから具体的な引用を含めてください",
        group_thousands(MIN_REPORT_CHARS),
        group_thousands(MAX_REPORT_CHARS),
        REQUESTED_SESSIONS_PER_HYPOTHESIS
    ));
    rules.push(format!(
        "【最重要】引用は合計で最低{}個以上含めることを必須とします",
        REQUESTED_TOTAL_CITATIONS
    ));
    numbered(rules)
}

const REPORT_SKELETON: &str = r##"## まとめ

[全体を通じて見えてきた主要なテーマ、パターン、重要な発見を3-4段落で詳細に要約してください。このセクションは最低でも800字以上とし、主要な論点を網羅的に記述してください。]

## 仮説1: [事前に設定した仮説]

### 支持する意見
- [具体的な発言の引用1 with "#セッション番号" 引用] - この発言の背景や文脈についても詳しく説明
- [具体的な発言の引用2 with "#セッション番号" 引用] - この発言の背景や文脈についても詳しく説明
- [具体的な発言の引用3 with "#セッション番号" 引用] - この発言の背景や文脈についても詳しく説明
- [具体的な発言の引用4 with "#セッション番号" 引用] - この発言の背景や文脈についても詳しく説明
- [具体的な発言の引用5 with "#セッション番号" 引用] - この発言の背景や文脈についても詳しく説明
[各仮説について、最低でも5つ以上の異なる視点からの意見を引用してください]

### 反論・異なる視点
- [反論1 with "#セッション番号" 引用] - なぜこの反論が重要なのか詳細に説明
- [反論2 with "#セッション番号" 引用] - なぜこの反論が重要なのか詳細に説明
- [反論3 with "#セッション番号" 引用] - なぜこの反論が重要なのか詳細に説明
- [反論4 with "#セッション番号" 引用] - なぜこの反論が重要なのか詳細に説明
[支持意見と対立する視点も同様に詳細に記述してください]

### 検証結果
[この仮説に対する総合的な評価を3-4段落で詳しく記述してください。賛否両論をバランスよく整理し、今後の政策検討に必要な示唆を提供してください。このセクションは最低でも400字以上としてください。]

## 仮説2: [事前に設定した仮説]

[同様に、事前に設定した各仮説について、上記と同じ詳細度で章立てして検証結果を記述してください。各仮説のセクションは最低でも1,000字以上を目安としてください。]"##;

/// Build the report-generation prompt.
///
/// The transcript is embedded unchanged and research content is never truncated.
/// Length and phrasing limits are instructions only; [`crate::report::validate`]
/// checks them after generation.
pub fn compose_analysis_prompt(
    theme: &ThemeConfig,
    transcript: &str,
    overrides: Option<&InterviewOverrides>,
    research: Option<&ResearchContext>,
) -> String {
    let title = &theme.title;
    let research_text = research.map(research_block).unwrap_or_default();

    format!(
        r#"あなたは複数のインタビューセッションを分析し、横断的な考察を行う専門家です。
下記の情報を元に、インタビューのまとめレポートを作成してください。

## インタビューの背景

以下は「{title}」というテーマで実施されたインタビューの分析依頼です。

{background}{research_text}---

## 検証対象の仮説

以下の「{title}」における主要な仮説・提案について、インタビューデータから支持する意見と反論・異なる視点を抽出し、検証してください：

【検証対象の仮説】

{hypotheses}

---

## セッションデータ

以下は実際のインタビューセッションのデータです。このデータを横断的に分析してください：

{transcript}

---

## あなたのタスク

上記のインタビューセッションを横断的に分析し、各仮説ごとに支持する意見と反論・異なる視点を抽出してMarkdownレポートを生成してください。

**必ず以下の出力フォーマットに従ってください：**

# {title} - 集約レポート

{skeleton}

---

**重要な制約事項:**
{constraints}

**今すぐ上記フォーマットでレポートの作成を開始してください。前置きは一切不要です。**"#,
        title = title,
        background = background_blocks(theme, overrides),
        research_text = research_text,
        hypotheses = format_hypotheses(&theme.hypotheses),
        transcript = transcript,
        skeleton = REPORT_SKELETON,
        constraints = constraints(title),
    )
}

/// Prompt asking the model to draft 5-8 hypotheses for a new theme from sample sessions.
///
/// The expected answer is a JSON array of [`Hypothesis`] objects.
pub fn hypothesis_extraction_prompt(title: &str, description: &str, samples: &str) -> String {
    format!(
        r#"あなたは政策分析の専門家です。以下のインタビューデータから、検証すべき主要な仮説を抽出してください。

# テーマ
{title}

# 説明
{description}

# サンプルインタビューデータ
{samples}

# タスク
上記のサンプルから、以下の基準で5〜8個の検証可能な仮説を抽出してください：

1. 具体性: 曖昧な表現ではなく、検証可能な形式で記述
2. 多様性: 賛成・反対、期待・懸念など、多角的な視点を含む
3. 重要度: インタビュー参加者が繰り返し言及している論点を優先
4. 証拠性: セッション内の具体的な発言で裏付けられる内容

# 出力形式（JSON）
```json
[
  {{
    "id": "H1",
    "category": "カテゴリ名（例: セキュリティへの懸念）",
    "description": "仮説の詳細説明（1〜2文）",
    "priority": "high" | "medium" | "low"
  }}
]
```

必ず有効なJSON配列で出力してください。説明文は含めないでください。"#
    )
}
