use chrono::NaiveDate;

use super::views::{PortfolioKpis, PortfolioSummary};
use super::{agency_performance, ageing_buckets, recovery_trend, sla_breaches, PortfolioSnapshot};
use crate::workflows::cases::Case;

/// Headline figures. Averages over empty sets are reported as 0; whole-number
/// averages round ties to even.
pub fn portfolio_kpis(cases: &[Case]) -> PortfolioKpis {
    let total_amount: f64 = cases.iter().map(|case| case.amount).sum();

    let probabilities: Vec<f64> = cases
        .iter()
        .filter_map(|case| case.recovery_probability)
        .collect();
    let avg_recovery_rate = mean(&probabilities)
        .map(|value| (value * 100.0).round_ties_even() as i64)
        .unwrap_or(0);

    let resolution_days: Vec<f64> = cases
        .iter()
        .filter_map(Case::resolution_days)
        .map(|days| days as f64)
        .collect();
    let avg_resolution_days = mean(&resolution_days)
        .map(|value| value.round_ties_even() as i64)
        .unwrap_or(0);

    PortfolioKpis {
        total_cases: cases.len(),
        total_amount,
        avg_recovery_rate,
        avg_resolution_days,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

impl PortfolioSnapshot {
    pub fn summary(&self, as_of: NaiveDate, trend_months: u32) -> PortfolioSummary {
        PortfolioSummary {
            kpis: portfolio_kpis(&self.cases),
            ageing_buckets: ageing_buckets(&self.cases),
            recovery_rate: recovery_trend(&self.cases, as_of, trend_months),
            dca_performance: agency_performance(&self.agencies),
            sla_breaches: sla_breaches(&self.cases),
        }
    }
}
