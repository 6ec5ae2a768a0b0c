use super::{AnalysisDepth, Hypothesis, Priority, ThemeConfig};

/// Public feedback on the national AI basic plan outline (September 2025 draft).
pub(super) fn theme() -> ThemeConfig {
    ThemeConfig {
        slug: "ai-plan-test".to_string(),
        title: "人工知能基本計画".to_string(),
        description: "政府公表のAI基本計画に対する国民の意見と期待".to_string(),
        analysis_depth: AnalysisDepth::Comprehensive,
        context_keywords: [
            "AI利活用",
            "ガバナンス",
            "人材育成",
            "データ基盤",
            "国際競争力",
            "セキュリティ",
            "プライバシー",
            "雇用影響",
            "インフラ",
            "半導体",
        ]
        .iter()
        .map(|k| k.to_string())
        .collect(),
        hypotheses: vec![
            Hypothesis::new(
                "H1",
                "利活用促進への期待",
                Priority::High,
                "国民は、政府・自治体におけるAI利活用（ガバメントAI）により、行政手続きの迅速化やサービス向上を強く期待している",
            ),
            Hypothesis::new(
                "H2",
                "ガバナンスへの懸念",
                Priority::High,
                "透明性や説明責任の欠如、AIの誤判断やハルシネーションに対する懸念が根強く、信頼性確保のための第三者評価機関（AISI）への期待が高い",
            ),
            Hypothesis::new(
                "H3",
                "プライバシーとデータ利用",
                Priority::High,
                "データ利活用の拡大は生産性向上に寄与する一方で、個人情報保護やオプトアウト権の明確化を求める声が多い",
            ),
            Hypothesis::new(
                "H4",
                "雇用への影響",
                Priority::Medium,
                "AIによる雇用代替への不安が存在する一方で、リスキリング支援や新たな職種創出への期待も併存している",
            ),
            Hypothesis::new(
                "H5",
                "中小企業・地方への支援",
                Priority::High,
                "AI導入には資金・人材・技術の障壁があり、中小企業や地方自治体に対する政府の具体的支援策が不可欠だと認識されている",
            ),
            Hypothesis::new(
                "H6",
                "国際競争力と標準化",
                Priority::Medium,
                "日本独自のルール形成よりも、広島AIプロセス等の国際的枠組みへの整合性を優先すべきとの意見が優勢である",
            ),
            Hypothesis::new(
                "H7",
                "インフラと環境負荷",
                Priority::Medium,
                "データセンターや半導体の国内整備は重要だが、電力消費や環境負荷への配慮が不十分だとの指摘がある",
            ),
            Hypothesis::new(
                "H8",
                "教育とリテラシー",
                Priority::Medium,
                "初等中等教育からのAIリテラシー教育の必要性は広く支持されているが、教員の研修体制や教材整備が追いついていないとの懸念がある",
            ),
        ],
    }
}
