use serde::Serialize;

use super::features::{CaseFeatures, CustomerSegment};
use super::thresholds::{
    AGENCY_PERFORMANCE_WEIGHT, NEUTRAL_AGENCY_PERFORMANCE, PER_DEFAULT_PENALTY,
    PREMIUM_SEGMENT_BONUS, RECOVERY_AMOUNT_STEPS, RECOVERY_BASE, RECOVERY_CEILING,
    RECOVERY_FLOOR, RECOVERY_OVERDUE_STEPS, RULE_RECOVERY_CONFIDENCE,
};
use super::ScoringSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryFactor {
    OverdueDays,
    Amount,
    Segment,
    PreviousDefaults,
    AgencyPerformance,
}

/// One signed contribution to the rule-based estimate, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryAdjustment {
    pub factor: RecoveryFactor,
    pub delta: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryAssessment {
    pub recovery_probability: f64,
    pub confidence: f64,
    pub source: ScoringSource,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<RecoveryAdjustment>,
}

pub fn clip_probability(value: f64) -> f64 {
    value.clamp(RECOVERY_FLOOR, RECOVERY_CEILING)
}

pub fn estimate_by_rules(features: &CaseFeatures) -> RecoveryAssessment {
    let mut adjustments = Vec::new();

    if let Some((threshold, deduction)) = RECOVERY_OVERDUE_STEPS
        .iter()
        .find(|(threshold, _)| features.overdue_days > *threshold)
    {
        adjustments.push(RecoveryAdjustment {
            factor: RecoveryFactor::OverdueDays,
            delta: -deduction,
            notes: format!(
                "{} days overdue exceeds {threshold}",
                features.overdue_days
            ),
        });
    }

    if let Some((threshold, deduction)) = RECOVERY_AMOUNT_STEPS
        .iter()
        .find(|(threshold, _)| features.amount > *threshold)
    {
        adjustments.push(RecoveryAdjustment {
            factor: RecoveryFactor::Amount,
            delta: -deduction,
            notes: format!("amount {:.2} exceeds {threshold:.0}", features.amount),
        });
    }

    if features.segment == CustomerSegment::Premium {
        adjustments.push(RecoveryAdjustment {
            factor: RecoveryFactor::Segment,
            delta: PREMIUM_SEGMENT_BONUS,
            notes: "premium customer".to_string(),
        });
    }

    if features.previous_defaults > 0 {
        adjustments.push(RecoveryAdjustment {
            factor: RecoveryFactor::PreviousDefaults,
            delta: -(f64::from(features.previous_defaults) * PER_DEFAULT_PENALTY),
            notes: format!("{} previous default(s)", features.previous_defaults),
        });
    }

    if let Some(performance) = features.agency_performance {
        adjustments.push(RecoveryAdjustment {
            factor: RecoveryFactor::AgencyPerformance,
            delta: (performance - NEUTRAL_AGENCY_PERFORMANCE) * AGENCY_PERFORMANCE_WEIGHT,
            notes: format!("agency performance {performance:.2}"),
        });
    }

    let raw = adjustments
        .iter()
        .fold(RECOVERY_BASE, |total, adjustment| total + adjustment.delta);

    RecoveryAssessment {
        recovery_probability: clip_probability(raw),
        confidence: RULE_RECOVERY_CONFIDENCE,
        source: ScoringSource::RuleBased,
        adjustments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn long_overdue_standard_case() {
        let outcome = estimate_by_rules(&CaseFeatures::new(10_000.0, 95));
        assert_close(outcome.recovery_probability, 0.50);
        assert_eq!(outcome.confidence, 0.70);
        assert_eq!(outcome.adjustments.len(), 1);
    }

    #[test]
    fn large_premium_case_with_defaults() {
        let features = CaseFeatures::new(120_000.0, 5)
            .with_segment(CustomerSegment::Premium)
            .with_previous_defaults(2);
        let outcome = estimate_by_rules(&features);
        assert_close(outcome.recovery_probability, 0.65);
        assert!(outcome
            .adjustments
            .iter()
            .any(|adjustment| adjustment.factor == RecoveryFactor::Segment));
    }

    #[test]
    fn overdue_steps_are_exclusive() {
        assert_close(
            estimate_by_rules(&CaseFeatures::new(1_000.0, 31)).recovery_probability,
            0.75,
        );
        assert_close(
            estimate_by_rules(&CaseFeatures::new(1_000.0, 61)).recovery_probability,
            0.65,
        );
        assert_close(
            estimate_by_rules(&CaseFeatures::new(1_000.0, 30)).recovery_probability,
            0.80,
        );
    }

    #[test]
    fn mid_amount_deduction_applies() {
        let outcome = estimate_by_rules(&CaseFeatures::new(75_000.0, 0));
        assert_close(outcome.recovery_probability, 0.72);
    }

    #[test]
    fn agency_performance_shifts_estimate() {
        let strong = CaseFeatures::new(1_000.0, 0).with_agency_performance(Some(0.95));
        assert_close(estimate_by_rules(&strong).recovery_probability, 0.84);

        let weak = CaseFeatures::new(1_000.0, 0).with_agency_performance(Some(0.55));
        assert_close(estimate_by_rules(&weak).recovery_probability, 0.76);
    }

    #[test]
    fn estimate_is_clipped_to_floor_and_ceiling() {
        let hopeless = CaseFeatures::new(500_000.0, 400).with_previous_defaults(20);
        assert_eq!(estimate_by_rules(&hopeless).recovery_probability, 0.10);

        let ideal = CaseFeatures::new(10.0, 0)
            .with_segment(CustomerSegment::Premium)
            .with_agency_performance(Some(1.5));
        assert_eq!(estimate_by_rules(&ideal).recovery_probability, 0.95);
    }

    #[test]
    fn estimate_stays_in_range_across_inputs() {
        for amount in [1.0, 20_000.0, 50_000.5, 100_000.5, 1_000_000.0] {
            for overdue_days in [0, 30, 31, 60, 61, 90, 91, 365] {
                for defaults in 0..6 {
                    for segment in [CustomerSegment::Standard, CustomerSegment::Premium] {
                        let features = CaseFeatures::new(amount, overdue_days)
                            .with_segment(segment)
                            .with_previous_defaults(defaults);
                        let p = estimate_by_rules(&features).recovery_probability;
                        assert!((0.1..=0.95).contains(&p), "{p} out of range");
                    }
                }
            }
        }
    }
}
