use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::features::CaseFeatures;
use super::model::{LinearModelArtifact, ModelError, Predictor};
use super::priority::{classify_by_rules, PriorityAssessment};
use super::recovery::{clip_probability, estimate_by_rules, RecoveryAssessment};
use super::ScoringSource;
use crate::config::TriageConfig;
use crate::workflows::round_to;

/// Selected once when the engine is built; the trained variant still falls back
/// to rules per call when inference fails.
#[derive(Clone)]
pub enum ScoringStrategy {
    RuleBased,
    TrainedModel(Arc<dyn Predictor>),
}

impl fmt::Debug for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleBased => f.write_str("RuleBased"),
            Self::TrainedModel(_) => f.write_str("TrainedModel(..)"),
        }
    }
}

/// Combined output of both classifiers for one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageAssessment {
    pub priority: PriorityAssessment,
    pub recovery: RecoveryAssessment,
}

/// Stateless scorer shared across requests.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    strategy: ScoringStrategy,
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::rule_based()
    }
}

impl TriageEngine {
    pub fn rule_based() -> Self {
        Self {
            strategy: ScoringStrategy::RuleBased,
        }
    }

    pub fn with_predictor(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            strategy: ScoringStrategy::TrainedModel(predictor),
        }
    }

    /// Loads the configured artifact, degrading to rules when it cannot be used.
    pub fn from_config(config: &TriageConfig) -> Self {
        let Some(path) = &config.model_path else {
            info!("no model artifact configured; using rule-based triage");
            return Self::rule_based();
        };

        match LinearModelArtifact::from_path(path) {
            Ok(artifact) => {
                info!(
                    path = %path.display(),
                    classifier = artifact.has_classifier(),
                    regressor = artifact.has_regressor(),
                    "loaded triage model artifact"
                );
                Self::with_predictor(Arc::new(artifact))
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "model artifact unusable; using rule-based triage");
                Self::rule_based()
            }
        }
    }

    pub fn strategy(&self) -> &ScoringStrategy {
        &self.strategy
    }

    pub fn source(&self) -> ScoringSource {
        match self.strategy {
            ScoringStrategy::RuleBased => ScoringSource::RuleBased,
            ScoringStrategy::TrainedModel(_) => ScoringSource::TrainedModel,
        }
    }

    pub fn classify(&self, features: &CaseFeatures) -> PriorityAssessment {
        let assessment = match &self.strategy {
            ScoringStrategy::RuleBased => classify_by_rules(features),
            ScoringStrategy::TrainedModel(predictor) => match predictor
                .classify(features)
                .and_then(|(priority, confidence)| {
                    Ok((priority, finite("confidence", confidence)?))
                }) {
                Ok((priority, confidence)) => PriorityAssessment {
                    priority,
                    confidence: confidence.clamp(0.0, 1.0),
                    source: ScoringSource::TrainedModel,
                },
                Err(err) => {
                    log_fallback("priority", &err);
                    classify_by_rules(features)
                }
            },
        };

        PriorityAssessment {
            confidence: round_to(assessment.confidence, 2),
            ..assessment
        }
    }

    pub fn estimate(&self, features: &CaseFeatures) -> RecoveryAssessment {
        let assessment = match &self.strategy {
            ScoringStrategy::RuleBased => estimate_by_rules(features),
            ScoringStrategy::TrainedModel(predictor) => match predictor
                .estimate(features)
                .and_then(|(value, confidence)| {
                    Ok((finite("recovery", value)?, finite("confidence", confidence)?))
                }) {
                Ok((value, confidence)) => RecoveryAssessment {
                    recovery_probability: clip_probability(value),
                    confidence: confidence.clamp(0.0, 1.0),
                    source: ScoringSource::TrainedModel,
                    adjustments: Vec::new(),
                },
                Err(err) => {
                    log_fallback("recovery", &err);
                    estimate_by_rules(features)
                }
            },
        };

        RecoveryAssessment {
            recovery_probability: round_to(assessment.recovery_probability, 2),
            confidence: round_to(assessment.confidence, 2),
            ..assessment
        }
    }

    pub fn assess(&self, features: &CaseFeatures) -> TriageAssessment {
        let assessment = TriageAssessment {
            priority: self.classify(features),
            recovery: self.estimate(features),
        };
        debug!(
            amount = features.amount,
            overdue_days = features.overdue_days,
            priority = %assessment.priority.priority,
            recovery = assessment.recovery.recovery_probability,
            "scored case features"
        );
        assessment
    }
}

fn finite(output: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::Inference(format!("{output} is not finite: {value}")))
    }
}

fn log_fallback(prediction: &'static str, err: &ModelError) {
    warn!(prediction, error = %err, "trained model failed; falling back to rules");
}
