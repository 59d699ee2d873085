//! Shared cutoffs for triage scoring, SLA evaluation, and portfolio reporting.
//!
//! The rule-based classifiers, the demo portfolio generator, and the analytics
//! aggregator all read from this table. A trained artifact is expected to have
//! been labelled with the same values.

/// Amount above which a case is High priority.
pub const HIGH_PRIORITY_AMOUNT: f64 = 50_000.0;
/// Overdue days above which a case is High priority.
pub const HIGH_PRIORITY_OVERDUE_DAYS: u32 = 90;
/// Amount above which a case is at least Medium priority.
pub const MEDIUM_PRIORITY_AMOUNT: f64 = 20_000.0;
/// Overdue days above which a case is at least Medium priority.
pub const MEDIUM_PRIORITY_OVERDUE_DAYS: u32 = 60;

pub const HIGH_PRIORITY_CONFIDENCE: f64 = 0.85;
pub const MEDIUM_PRIORITY_CONFIDENCE: f64 = 0.75;
pub const LOW_PRIORITY_CONFIDENCE: f64 = 0.70;

/// Starting point for the rule-based recovery estimate.
pub const RECOVERY_BASE: f64 = 0.80;

/// `(overdue days strictly above, deduction)`, checked in order; first match wins.
pub const RECOVERY_OVERDUE_STEPS: [(u32, f64); 3] = [(90, 0.30), (60, 0.15), (30, 0.05)];
/// `(amount strictly above, deduction)`, checked in order; first match wins.
pub const RECOVERY_AMOUNT_STEPS: [(f64, f64); 2] = [(100_000.0, 0.15), (50_000.0, 0.08)];

pub const PREMIUM_SEGMENT_BONUS: f64 = 0.10;
pub const PER_DEFAULT_PENALTY: f64 = 0.05;

/// Agency performance treated as neutral; the adjustment scales the distance from it.
pub const NEUTRAL_AGENCY_PERFORMANCE: f64 = 0.75;
pub const AGENCY_PERFORMANCE_WEIGHT: f64 = 0.2;

pub const RECOVERY_FLOOR: f64 = 0.10;
pub const RECOVERY_CEILING: f64 = 0.95;

pub const RULE_RECOVERY_CONFIDENCE: f64 = 0.70;
pub const MODEL_RECOVERY_CONFIDENCE: f64 = 0.85;

/// Days after case creation before the SLA deadline falls due.
pub const SLA_GRACE_DAYS: i64 = 90;
/// Overdue days above which a case breaches its SLA.
pub const SLA_BREACH_OVERDUE_DAYS: u32 = 90;
/// Overdue days above which a breach counts as critical.
pub const SLA_CRITICAL_OVERDUE_DAYS: u32 = 120;

/// Inclusive upper bounds of the closed ageing buckets; the last bucket is open-ended.
pub const AGEING_BUCKET_UPPER_BOUNDS: [u32; 3] = [30, 60, 90];
