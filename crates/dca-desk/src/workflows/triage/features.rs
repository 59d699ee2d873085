use serde::{Deserialize, Serialize};
use std::fmt;

use super::thresholds::NEUTRAL_AGENCY_PERFORMANCE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    #[default]
    Standard,
    Premium,
}

impl CustomerSegment {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "standard" => Some(Self::Standard),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Encoding used by trained artifacts.
    pub const fn indicator(self) -> f64 {
        match self {
            Self::Standard => 0.0,
            Self::Premium => 1.0,
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs shared by the priority classifier and the recovery estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaseFeatures {
    pub amount: f64,
    pub overdue_days: u32,
    #[serde(default)]
    pub segment: CustomerSegment,
    #[serde(default)]
    pub previous_defaults: u32,
    /// Only supplied when scoring at the portfolio level.
    #[serde(default)]
    pub agency_performance: Option<f64>,
}

impl CaseFeatures {
    pub fn new(amount: f64, overdue_days: u32) -> Self {
        Self {
            amount,
            overdue_days,
            segment: CustomerSegment::Standard,
            previous_defaults: 0,
            agency_performance: None,
        }
    }

    pub fn with_segment(mut self, segment: CustomerSegment) -> Self {
        self.segment = segment;
        self
    }

    pub fn with_previous_defaults(mut self, previous_defaults: u32) -> Self {
        self.previous_defaults = previous_defaults;
        self
    }

    pub fn with_agency_performance(mut self, performance: Option<f64>) -> Self {
        self.agency_performance = performance;
        self
    }

    /// Validates raw request values the way the HTTP and CSV surfaces receive them.
    pub fn try_from_raw(
        amount: f64,
        overdue_days: i64,
        segment: Option<&str>,
        previous_defaults: Option<i64>,
    ) -> Result<Self, FeatureError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FeatureError::NonPositiveAmount(amount));
        }
        let overdue_days =
            u32::try_from(overdue_days).map_err(|_| FeatureError::InvalidOverdueDays(overdue_days))?;
        let segment = match segment {
            Some(raw) => CustomerSegment::parse(raw)
                .ok_or_else(|| FeatureError::UnknownSegment(raw.to_string()))?,
            None => CustomerSegment::Standard,
        };
        let previous_defaults = previous_defaults.unwrap_or(0);
        let previous_defaults = u32::try_from(previous_defaults)
            .map_err(|_| FeatureError::InvalidPreviousDefaults(previous_defaults))?;

        Ok(Self::new(amount, overdue_days)
            .with_segment(segment)
            .with_previous_defaults(previous_defaults))
    }

    /// `[amount, overdue_days, segment, previous_defaults]`, the classifier layout.
    pub fn classifier_vector(&self) -> [f64; 4] {
        [
            self.amount,
            f64::from(self.overdue_days),
            self.segment.indicator(),
            f64::from(self.previous_defaults),
        ]
    }

    /// Classifier layout plus agency performance, the regressor layout.
    pub fn regressor_vector(&self) -> [f64; 5] {
        let [amount, overdue, segment, defaults] = self.classifier_vector();
        [
            amount,
            overdue,
            segment,
            defaults,
            self.agency_performance
                .unwrap_or(NEUTRAL_AGENCY_PERFORMANCE),
        ]
    }
}

/// Rejected feature input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("amount must be a positive number, got {0}")]
    NonPositiveAmount(f64),
    #[error("overdue_days must be a non-negative integer, got {0}")]
    InvalidOverdueDays(i64),
    #[error("previous_defaults must be a non-negative integer, got {0}")]
    InvalidPreviousDefaults(i64),
    #[error("unknown customer segment '{0}' (expected standard or premium)")]
    UnknownSegment(String),
    #[error("agency performance must be a finite number")]
    InvalidAgencyPerformance,
}
