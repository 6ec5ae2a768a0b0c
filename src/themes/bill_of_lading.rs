use super::{AnalysisDepth, Hypothesis, Priority, ThemeConfig};

/// Electronic bills of lading: trade-DX legislation and its effect on practitioners.
pub(super) fn theme() -> ThemeConfig {
    ThemeConfig {
        slug: "bill-of-lading".to_string(),
        title: "船荷証券の電子化法案".to_string(),
        description: "国際貿易のDX推進と実務への影響".to_string(),
        analysis_depth: AnalysisDepth::Detailed,
        context_keywords: [
            "電子化",
            "ペーパーレス",
            "貿易実務",
            "セキュリティ",
            "システム導入",
            "中小企業負担",
            "国際標準",
            "コスト削減",
            "サイバーリスク",
            "移行期間",
        ]
        .iter()
        .map(|k| k.to_string())
        .collect(),
        hypotheses: vec![
            Hypothesis::new(
                "B1",
                "効率化への期待",
                Priority::High,
                "電子化により貿易手続きの時間とコストが大幅に削減され、特に輸出入業務の効率化が期待されている",
            ),
            Hypothesis::new(
                "B2",
                "セキュリティとサイバーリスク",
                Priority::High,
                "サイバー攻撃や電子データの改ざん、なりすましへの懸念が根強く、技術的保護措置の整備が最優先課題である",
            ),
            Hypothesis::new(
                "B3",
                "中小企業への負担",
                Priority::High,
                "システム導入費用やIT人材不足により、中小の貿易事業者にとっては負担が大きく、段階的移行と公的支援が必要とされている",
            ),
            Hypothesis::new(
                "B4",
                "国際標準との整合性",
                Priority::High,
                "他国が進める電子化システム（MLETR準拠等）との互換性確保が重要であり、日本が孤立するリスクへの警戒感がある",
            ),
            Hypothesis::new(
                "B5",
                "紙文化との共存",
                Priority::Medium,
                "従来の紙ベースの取引慣行が根強く残る業界もあり、完全電子化までの移行期間における二重運用の煩雑さが懸念される",
            ),
            Hypothesis::new(
                "B6",
                "法的有効性と紛争解決",
                Priority::Medium,
                "電子船荷証券の法的効力や、国際紛争が発生した際の準拠法・管轄裁判所の明確化が不十分であるとの指摘がある",
            ),
            Hypothesis::new(
                "B7",
                "BCP（事業継続計画）への影響",
                Priority::Medium,
                "システム障害や通信断絶時のバックアップ手段の確保が不可欠であり、完全電子化はBCPリスクを高める可能性がある",
            ),
        ],
    }
}
