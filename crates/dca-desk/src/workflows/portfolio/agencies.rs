use super::views::AgencyPerformanceView;
use crate::workflows::cases::Agency;

pub fn agency_performance(agencies: &[Agency]) -> Vec<AgencyPerformanceView> {
    agencies
        .iter()
        .map(|agency| AgencyPerformanceView {
            name: agency.name.clone(),
            cases: agency.active_cases,
            recovery_rate: agency.recovery_rate,
            avg_days: agency.avg_resolution_days,
        })
        .collect()
}
