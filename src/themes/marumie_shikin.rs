use super::{AnalysisDepth, Hypothesis, Priority, ThemeConfig};

/// User feedback on the political-funds visualization product.
pub(super) fn theme() -> ThemeConfig {
    ThemeConfig {
        slug: "marumie-shikin-user".to_string(),
        title: "みらいまる見え政治資金".to_string(),
        description: "政治資金可視化ツールのユーザビリティと透明性評価".to_string(),
        analysis_depth: AnalysisDepth::Detailed,
        context_keywords: [
            "サンキー図",
            "使いやすさ",
            "透明性",
            "UX/UI",
            "改善提案",
            "可視化",
            "政治資金",
            "リアルタイム公開",
            "比較機能",
            "信頼性",
        ]
        .iter()
        .map(|k| k.to_string())
        .collect(),
        hypotheses: vec![
            Hypothesis::new(
                "M1",
                "UI/UXの評価",
                Priority::High,
                "サンキー図による可視化は直感的で分かりやすいと評価されているが、スマホでの閲覧性に課題がある",
            ),
            Hypothesis::new(
                "M2",
                "情報の理解度",
                Priority::High,
                "政治資金の流れは理解しやすくなったものの、専門用語の説明不足や会計項目の詳細が不明確との声がある",
            ),
            Hypothesis::new(
                "M3",
                "透明性への期待",
                Priority::High,
                "リアルタイム公開により政治資金の透明性が向上したと感じるユーザーが多く、他政党への導入拡大が望まれている",
            ),
            Hypothesis::new(
                "M4",
                "機能追加の要望",
                Priority::Medium,
                "他の政党との比較機能、時系列での推移グラフ、支出の詳細フィルタ機能が強く求められている",
            ),
            Hypothesis::new(
                "M5",
                "信頼性の検証",
                Priority::Medium,
                "データの出所や更新頻度が明示されていないことへの不安があり、公的監査や第三者検証の必要性が指摘されている",
            ),
            Hypothesis::new(
                "M6",
                "推薦意向",
                Priority::Low,
                "政治に関心のある層には高く評価されているが、一般への普及には「面白さ」や「インセンティブ」が不足している",
            ),
        ],
    }
}
