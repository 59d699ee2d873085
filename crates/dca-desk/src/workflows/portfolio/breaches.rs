use super::views::SlaBreachSummary;
use crate::workflows::cases::sla::{is_breached, is_critical};
use crate::workflows::cases::Case;
use crate::workflows::round_to;

/// Breach counts over the portfolio; critical cases are also counted in `total`.
pub fn sla_breaches(cases: &[Case]) -> SlaBreachSummary {
    let total = cases
        .iter()
        .filter(|case| is_breached(case.overdue_days))
        .count();
    let critical = cases
        .iter()
        .filter(|case| is_critical(case.overdue_days))
        .count();
    let percentage = if cases.is_empty() {
        0.0
    } else {
        round_to(total as f64 / cases.len() as f64 * 100.0, 1)
    };

    SlaBreachSummary {
        total,
        critical,
        percentage,
    }
}
