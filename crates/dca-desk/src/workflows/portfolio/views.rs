use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeingBucketView {
    pub label: &'static str,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlaBreachSummary {
    pub total: usize,
    pub critical: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyPerformanceView {
    pub name: String,
    pub cases: u32,
    pub recovery_rate: f64,
    pub avg_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryTrendPoint {
    /// Short month name, e.g. `Jan`.
    pub month: String,
    /// Calendar period, `YYYY-MM`.
    pub period: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioKpis {
    pub total_cases: usize,
    pub total_amount: f64,
    pub avg_recovery_rate: i64,
    pub avg_resolution_days: i64,
}

/// Dashboard payload combining every analytic over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub kpis: PortfolioKpis,
    pub ageing_buckets: Vec<AgeingBucketView>,
    pub recovery_rate: Vec<RecoveryTrendPoint>,
    pub dca_performance: Vec<AgencyPerformanceView>,
    pub sla_breaches: SlaBreachSummary,
}
