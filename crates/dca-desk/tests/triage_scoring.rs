use std::sync::Arc;

use dca_desk::config::TriageConfig;
use dca_desk::workflows::triage::{
    CaseFeatures, CustomerSegment, ModelError, PriorityLabel, Predictor, ScoringSource,
    TriageEngine,
};

const ARTIFACT: &str = r#"{
    "classifier": {
        "classes": ["High", "Medium", "Low"],
        "scaler": { "mean": [30000.0, 75.0, 0.0, 0.0], "scale": [10000.0, 40.0, 1.0, 1.0] },
        "weights": [[4.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0], [-4.0, 0.0, 0.0, 0.0]],
        "intercepts": [0.0, 0.0, 0.0]
    },
    "regressor": {
        "scaler": { "mean": [0.0, 0.0, 0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0, 1.0, 1.0] },
        "coefficients": [0.0, -0.002, 0.1, -0.05, 0.0],
        "intercept": 0.8
    }
}"#;

struct OfflinePredictor;

impl Predictor for OfflinePredictor {
    fn classify(&self, _features: &CaseFeatures) -> Result<(PriorityLabel, f64), ModelError> {
        Err(ModelError::Inference("model server offline".to_string()))
    }

    fn estimate(&self, _features: &CaseFeatures) -> Result<(f64, f64), ModelError> {
        Err(ModelError::Inference("model server offline".to_string()))
    }
}

#[test]
fn documented_examples_hold_on_the_rule_path() {
    let engine = TriageEngine::rule_based();

    let large = engine.classify(&CaseFeatures::new(60_000.0, 30));
    assert_eq!(large.priority, PriorityLabel::High);
    assert_eq!(large.confidence, 0.85);

    let mid = engine.classify(&CaseFeatures::new(25_000.0, 10));
    assert_eq!(mid.priority, PriorityLabel::Medium);
    assert_eq!(mid.confidence, 0.75);

    let stale = engine.estimate(&CaseFeatures::new(10_000.0, 95));
    assert_eq!(stale.recovery_probability, 0.5);
    assert_eq!(stale.confidence, 0.7);

    let premium = engine.estimate(
        &CaseFeatures::new(120_000.0, 5)
            .with_segment(CustomerSegment::Premium)
            .with_previous_defaults(2),
    );
    assert_eq!(premium.recovery_probability, 0.65);
    assert_eq!(premium.confidence, 0.7);
}

#[test]
fn amount_boundary_is_strict() {
    let engine = TriageEngine::rule_based();
    assert_eq!(
        engine.classify(&CaseFeatures::new(50_000.0, 10)).priority,
        PriorityLabel::Medium
    );
    assert_eq!(
        engine.classify(&CaseFeatures::new(50_000.0, 91)).priority,
        PriorityLabel::High
    );
    assert_eq!(
        engine.classify(&CaseFeatures::new(20_000.0, 60)).priority,
        PriorityLabel::Low
    );
}

#[test]
fn recovery_stays_within_bounds_across_inputs() {
    let engine = TriageEngine::rule_based();
    for amount in [1.0, 20_000.0, 50_001.0, 100_001.0, 5_000_000.0] {
        for overdue_days in [0, 30, 31, 61, 91, 400] {
            for previous_defaults in [0, 1, 5, 40] {
                for segment in [CustomerSegment::Standard, CustomerSegment::Premium] {
                    for performance in [None, Some(0.0), Some(1.0), Some(5.0)] {
                        let features = CaseFeatures::new(amount, overdue_days)
                            .with_segment(segment)
                            .with_previous_defaults(previous_defaults)
                            .with_agency_performance(performance);
                        let value = engine.estimate(&features).recovery_probability;
                        assert!(
                            (0.1..=0.95).contains(&value),
                            "{value} out of range for {features:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn failing_predictor_matches_rule_results_exactly() {
    let rules = TriageEngine::rule_based();
    let fallback = TriageEngine::with_predictor(Arc::new(OfflinePredictor));
    assert_eq!(fallback.source(), ScoringSource::TrainedModel);

    for (amount, overdue_days) in [(60_000.0, 30), (25_000.0, 10), (10_000.0, 95), (500.0, 0)] {
        let features = CaseFeatures::new(amount, overdue_days).with_previous_defaults(1);
        assert_eq!(fallback.assess(&features), rules.assess(&features));
    }
}

#[test]
fn artifact_on_disk_drives_the_trained_path() {
    let path = std::env::temp_dir().join(format!(
        "dca-desk-artifact-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, ARTIFACT).expect("artifact written");

    let engine = TriageEngine::from_config(&TriageConfig {
        model_path: Some(path.clone()),
    });
    let _ = std::fs::remove_file(&path);

    assert_eq!(engine.source(), ScoringSource::TrainedModel);
    let priority = engine.classify(&CaseFeatures::new(1_000.0, 120));
    assert_eq!(priority.priority, PriorityLabel::Low);
    assert_eq!(priority.source, ScoringSource::TrainedModel);

    let recovery = engine.estimate(&CaseFeatures::new(1_000.0, 100));
    assert_eq!(recovery.recovery_probability, 0.6);
    assert_eq!(recovery.confidence, 0.85);
}

#[test]
fn missing_artifact_degrades_to_rules() {
    let engine = TriageEngine::from_config(&TriageConfig {
        model_path: Some(std::env::temp_dir().join("dca-desk-no-such-model.json")),
    });
    assert_eq!(engine.source(), ScoringSource::RuleBased);

    let priority = engine.classify(&CaseFeatures::new(60_000.0, 30));
    assert_eq!(priority.priority, PriorityLabel::High);
    assert_eq!(priority.source, ScoringSource::RuleBased);
}
