//! Trained-model strategy: the [`Predictor`] seam and a JSON linear-model artifact.
//!
//! Artifacts are produced offline. The classifier is a multinomial logistic model
//! over standardized `[amount, overdue_days, segment, previous_defaults]`; the
//! regressor is a linear model over the same features plus agency performance.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::features::CaseFeatures;
use super::priority::PriorityLabel;
use super::thresholds::MODEL_RECOVERY_CONFIDENCE;

/// Inference capability backed by a fitted artifact.
pub trait Predictor: Send + Sync {
    /// Returns the predicted label and the maximum class probability.
    fn classify(&self, features: &CaseFeatures) -> Result<(PriorityLabel, f64), ModelError>;
    /// Returns the predicted recovery value and its confidence.
    fn estimate(&self, features: &CaseFeatures) -> Result<(f64, f64), ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact {path} unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("model artifact rejected: {0}")]
    Invalid(String),
    #[error("model artifact has no {0}")]
    MissingComponent(&'static str),
    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Clone, Deserialize)]
struct Standardizer {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Standardizer {
    fn validate(&self, component: &str, width: usize) -> Result<(), ModelError> {
        if self.mean.len() != width || self.scale.len() != width {
            return Err(ModelError::Invalid(format!(
                "{component} scaler must have {width} means and scales"
            )));
        }
        let finite = self.mean.iter().chain(self.scale.iter()).all(|v| v.is_finite());
        if !finite || self.scale.iter().any(|scale| *scale == 0.0) {
            return Err(ModelError::Invalid(format!(
                "{component} scaler needs finite values and non-zero scales"
            )));
        }
        Ok(())
    }

    fn transform(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LogisticClassifier {
    classes: Vec<PriorityLabel>,
    scaler: Standardizer,
    weights: Vec<[f64; 4]>,
    intercepts: Vec<f64>,
}

impl LogisticClassifier {
    fn validate(&self) -> Result<(), ModelError> {
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("classifier lists no classes".into()));
        }
        if self.weights.len() != self.classes.len() || self.intercepts.len() != self.classes.len()
        {
            return Err(ModelError::Invalid(format!(
                "classifier has {} classes but {} weight rows and {} intercepts",
                self.classes.len(),
                self.weights.len(),
                self.intercepts.len()
            )));
        }
        let mut seen = self.classes.clone();
        seen.sort();
        seen.dedup();
        if seen.len() != self.classes.len() {
            return Err(ModelError::Invalid("classifier repeats a class".into()));
        }
        self.scaler.validate("classifier", 4)
    }

    fn predict(&self, features: &CaseFeatures) -> Result<(PriorityLabel, f64), ModelError> {
        let x = self.scaler.transform(&features.classifier_vector());
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| dot(row, &x) + intercept)
            .collect();

        let max_logit = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max_logit.is_finite() {
            return Err(ModelError::Inference("classifier produced non-finite logits".into()));
        }
        let exps: Vec<f64> = logits.iter().map(|logit| (logit - max_logit).exp()).collect();
        let total: f64 = exps.iter().sum();

        let (best, weight) = exps
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .ok_or_else(|| ModelError::Inference("classifier produced no scores".into()))?;

        let probability = weight / total;
        if !probability.is_finite() {
            return Err(ModelError::Inference("class probability is not finite".into()));
        }
        Ok((self.classes[best], probability.clamp(0.0, 1.0)))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LinearRegressor {
    scaler: Standardizer,
    coefficients: [f64; 5],
    intercept: f64,
}

impl LinearRegressor {
    fn validate(&self) -> Result<(), ModelError> {
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("regressor coefficients must be finite".into()));
        }
        self.scaler.validate("regressor", 5)
    }

    fn predict(&self, features: &CaseFeatures) -> Result<f64, ModelError> {
        let x = self.scaler.transform(&features.regressor_vector());
        let value = dot(&self.coefficients, &x) + self.intercept;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::Inference("regressor output is not finite".into()))
        }
    }
}

fn dot(weights: &[f64], x: &[f64]) -> f64 {
    weights.iter().zip(x).map(|(w, v)| w * v).sum()
}

/// Linear-model artifact read from JSON. Either component may be absent, in which
/// case that half of the prediction falls back to rules.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModelArtifact {
    #[serde(default)]
    classifier: Option<LogisticClassifier>,
    #[serde(default)]
    regressor: Option<LinearRegressor>,
}

impl LinearModelArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(raw)?;
        if artifact.classifier.is_none() && artifact.regressor.is_none() {
            return Err(ModelError::Invalid(
                "artifact contains neither a classifier nor a regressor".into(),
            ));
        }
        if let Some(classifier) = &artifact.classifier {
            classifier.validate()?;
        }
        if let Some(regressor) = &artifact.regressor {
            regressor.validate()?;
        }
        Ok(artifact)
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_regressor(&self) -> bool {
        self.regressor.is_some()
    }
}

impl Predictor for LinearModelArtifact {
    fn classify(&self, features: &CaseFeatures) -> Result<(PriorityLabel, f64), ModelError> {
        self.classifier
            .as_ref()
            .ok_or(ModelError::MissingComponent("classifier"))?
            .predict(features)
    }

    fn estimate(&self, features: &CaseFeatures) -> Result<(f64, f64), ModelError> {
        let value = self
            .regressor
            .as_ref()
            .ok_or(ModelError::MissingComponent("regressor"))?
            .predict(features)?;
        Ok((value, MODEL_RECOVERY_CONFIDENCE))
    }
}
