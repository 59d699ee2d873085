use serde::{Deserialize, Serialize};
use std::fmt;

use super::features::CaseFeatures;
use super::thresholds::{
    HIGH_PRIORITY_AMOUNT, HIGH_PRIORITY_CONFIDENCE, HIGH_PRIORITY_OVERDUE_DAYS,
    LOW_PRIORITY_CONFIDENCE, MEDIUM_PRIORITY_AMOUNT, MEDIUM_PRIORITY_CONFIDENCE,
    MEDIUM_PRIORITY_OVERDUE_DAYS,
};
use super::ScoringSource;

/// Triage label guiding case handling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriorityLabel {
    High,
    Medium,
    Low,
}

impl PriorityLabel {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for PriorityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriorityAssessment {
    pub priority: PriorityLabel,
    pub confidence: f64,
    pub source: ScoringSource,
}

/// Threshold classifier; strict `>` comparisons on both amount and overdue days.
pub fn classify_by_rules(features: &CaseFeatures) -> PriorityAssessment {
    let (priority, confidence) = if features.amount > HIGH_PRIORITY_AMOUNT
        || features.overdue_days > HIGH_PRIORITY_OVERDUE_DAYS
    {
        (PriorityLabel::High, HIGH_PRIORITY_CONFIDENCE)
    } else if features.amount > MEDIUM_PRIORITY_AMOUNT
        || features.overdue_days > MEDIUM_PRIORITY_OVERDUE_DAYS
    {
        (PriorityLabel::Medium, MEDIUM_PRIORITY_CONFIDENCE)
    } else {
        (PriorityLabel::Low, LOW_PRIORITY_CONFIDENCE)
    };

    PriorityAssessment {
        priority,
        confidence,
        source: ScoringSource::RuleBased,
    }
}
