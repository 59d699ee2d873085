//! Deterministic synthetic portfolio for local runs and walkthroughs.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::workflows::cases::sla::sla_record;
use crate::workflows::cases::{
    Agency, Case, CaseId, CaseRepository, CaseStatus, MemoryCaseStore, RepositoryError, SlaRecord,
    DEFAULT_CASE_SEQUENCE_START,
};
use crate::workflows::round_to;
use crate::workflows::triage::{
    classify_by_rules, clip_probability, estimate_by_rules, CaseFeatures, CustomerSegment,
};

pub const DEFAULT_DEMO_CASES: usize = 100;
pub const DEFAULT_DEMO_SEED: u64 = 42;

const CUSTOMER_NAMES: [&str; 20] = [
    "Acme Corporation",
    "TechStart Inc",
    "Global Logistics",
    "Retail Solutions",
    "Manufacturing Co",
    "Digital Services Ltd",
    "Supply Chain Partners",
    "Enterprise Systems",
    "Innovation Labs",
    "Commerce Group",
    "Logistics Express",
    "Tech Innovations",
    "Global Trade Co",
    "Retail Dynamics",
    "Industrial Solutions",
    "Smart Systems Inc",
    "Future Tech",
    "Prime Logistics",
    "Metro Retail",
    "Advanced Manufacturing",
];

/// Noise applied on top of the rule estimate so the portfolio is not perfectly banded.
const RECOVERY_NOISE: f64 = 0.10;

pub fn demo_agencies() -> Vec<Agency> {
    [
        ("DCA Alpha", 0.85, 89, 78.0, 38),
        ("DCA Beta", 0.78, 76, 72.0, 42),
        ("DCA Gamma", 0.70, 82, 65.0, 56),
    ]
    .into_iter()
    .map(
        |(name, performance_score, active_cases, recovery_rate, avg_resolution_days)| Agency {
            name: name.to_string(),
            performance_score,
            active_cases,
            recovery_rate,
            avg_resolution_days,
        },
    )
    .collect()
}

#[derive(Debug, Clone)]
pub struct DemoPortfolio {
    pub agencies: Vec<Agency>,
    pub cases: Vec<Case>,
    /// SLA records for the first half of the cases.
    pub slas: Vec<SlaRecord>,
}

impl DemoPortfolio {
    /// Same `seed` and `now` always yield the same portfolio.
    pub fn generate(case_count: usize, seed: u64, now: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let agencies = demo_agencies();
        let statuses = CaseStatus::ordered();

        let cases: Vec<Case> = (0..case_count)
            .map(|offset| {
                let overdue_days: u32 = rng.gen_range(5..=150);
                let amount = f64::from(rng.gen_range(5_000u32..=150_000));
                let segment = if rng.gen_bool(0.3) {
                    CustomerSegment::Premium
                } else {
                    CustomerSegment::Standard
                };
                let previous_defaults = if rng.gen_bool(0.35) {
                    rng.gen_range(1..=3)
                } else {
                    0
                };
                let features = CaseFeatures::new(amount, overdue_days)
                    .with_segment(segment)
                    .with_previous_defaults(previous_defaults);

                let priority = classify_by_rules(&features).priority;
                let noise = rng.gen_range(-RECOVERY_NOISE..=RECOVERY_NOISE);
                let recovery = round_to(
                    clip_probability(estimate_by_rules(&features).recovery_probability + noise),
                    2,
                );

                let status = *statuses.choose(&mut rng).unwrap_or(&CaseStatus::Open);
                let agency = agencies
                    .choose(&mut rng)
                    .map(|agency| agency.name.clone());
                let customer_name = CUSTOMER_NAMES
                    .choose(&mut rng)
                    .copied()
                    .unwrap_or("Acme Corporation")
                    .to_string();

                let created_at = now - Duration::days(i64::from(overdue_days));
                let resolved_at = status.is_terminal().then(|| {
                    created_at + Duration::days(rng.gen_range(1..=i64::from(overdue_days)))
                });

                Case {
                    id: CaseId::from_sequence(DEFAULT_CASE_SEQUENCE_START + offset as u64),
                    customer_name,
                    amount,
                    overdue_days,
                    status,
                    priority,
                    assigned_agency: agency,
                    recovery_probability: Some(recovery),
                    customer_segment: segment,
                    previous_defaults,
                    created_at,
                    updated_at: resolved_at.unwrap_or(created_at),
                    resolved_at,
                }
            })
            .collect();

        let slas = cases
            .iter()
            .take(case_count / 2)
            .map(sla_record)
            .collect();

        Self {
            agencies,
            cases,
            slas,
        }
    }

    /// Loads the portfolio into a fresh in-memory store.
    pub fn into_store(self) -> Result<MemoryCaseStore, RepositoryError> {
        let store = MemoryCaseStore::with_agencies(self.agencies);
        let loaded = store.load_cases(self.cases)?;
        let slas = self.slas.len();
        for record in self.slas {
            store.upsert_sla(record)?;
        }
        info!(cases = loaded, slas, "demo portfolio seeded");
        Ok(store)
    }
}
