//! Case triage: priority classification and recovery estimation.

mod engine;
mod features;
pub mod model;
mod priority;
mod recovery;
pub mod router;
pub mod thresholds;

pub use engine::{ScoringStrategy, TriageAssessment, TriageEngine};
pub use features::{CaseFeatures, CustomerSegment, FeatureError};
pub use model::{LinearModelArtifact, ModelError, Predictor};
pub use priority::{classify_by_rules, PriorityAssessment, PriorityLabel};
pub use recovery::{
    clip_probability, estimate_by_rules, RecoveryAdjustment, RecoveryAssessment, RecoveryFactor,
};
pub use router::{prediction_router, PredictionRequest};

use serde::Serialize;

/// Which strategy produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringSource {
    RuleBased,
    TrainedModel,
}
