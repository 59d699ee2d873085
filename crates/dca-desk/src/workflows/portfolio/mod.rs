//! Portfolio analytics: ageing, SLA breaches, agency performance, and the
//! monthly recovery trend, computed over a point-in-time snapshot.

mod ageing;
mod agencies;
mod breaches;
pub mod demo;
mod router;
mod summary;
mod trend;
mod views;

pub use ageing::{ageing_buckets, AgeingBucket};
pub use agencies::agency_performance;
pub use breaches::sla_breaches;
pub use demo::{demo_agencies, DemoPortfolio, DEFAULT_DEMO_CASES, DEFAULT_DEMO_SEED};
pub use router::portfolio_router;
pub use summary::portfolio_kpis;
pub use trend::{recovery_trend, MonthWindow};
pub use views::{
    AgeingBucketView, AgencyPerformanceView, PortfolioKpis, PortfolioSummary,
    RecoveryTrendPoint, SlaBreachSummary,
};

use crate::workflows::cases::{Agency, Case};

/// Cases and agencies read together so every figure in one response agrees.
#[derive(Debug, Clone, Default)]
pub struct PortfolioSnapshot {
    pub cases: Vec<Case>,
    pub agencies: Vec<Agency>,
}

impl PortfolioSnapshot {
    pub fn new(cases: Vec<Case>, agencies: Vec<Agency>) -> Self {
        Self { cases, agencies }
    }
}
