use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::engine::TriageEngine;
use super::features::{CaseFeatures, FeatureError};
use super::priority::PriorityLabel;
use super::ScoringSource;

/// Body accepted by every prediction endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub amount: f64,
    pub overdue_days: i64,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default)]
    pub previous_defaults: Option<i64>,
    #[serde(default)]
    pub agency_performance: Option<f64>,
}

impl PredictionRequest {
    pub fn features(&self) -> Result<CaseFeatures, FeatureError> {
        let features = CaseFeatures::try_from_raw(
            self.amount,
            self.overdue_days,
            self.customer_segment.as_deref(),
            self.previous_defaults,
        )?;
        match self.agency_performance {
            Some(performance) if !performance.is_finite() => {
                Err(FeatureError::InvalidAgencyPerformance)
            }
            performance => Ok(features.with_agency_performance(performance)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PredictionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<PriorityLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery_probability: Option<f64>,
    confidence: f64,
    source: ScoringSource,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FullPredictionResponse {
    priority: PriorityLabel,
    recovery_probability: f64,
    priority_confidence: f64,
    recovery_confidence: f64,
}

/// Router exposing the priority, recovery, and combined prediction endpoints.
pub fn prediction_router(engine: Arc<TriageEngine>) -> Router {
    Router::new()
        .route("/api/predict/priority", post(priority_handler))
        .route("/api/predict/recovery", post(recovery_handler))
        .route("/api/predict/full", post(full_handler))
        .with_state(engine)
}

fn rejected(err: FeatureError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

pub(crate) async fn priority_handler(
    State(engine): State<Arc<TriageEngine>>,
    Json(request): Json<PredictionRequest>,
) -> Response {
    let features = match request.features() {
        Ok(features) => features,
        Err(err) => return rejected(err),
    };
    let outcome = engine.classify(&features);
    let body = PredictionResponse {
        priority: Some(outcome.priority),
        recovery_probability: None,
        confidence: outcome.confidence,
        source: outcome.source,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn recovery_handler(
    State(engine): State<Arc<TriageEngine>>,
    Json(request): Json<PredictionRequest>,
) -> Response {
    let features = match request.features() {
        Ok(features) => features,
        Err(err) => return rejected(err),
    };
    let outcome = engine.estimate(&features);
    let body = PredictionResponse {
        priority: None,
        recovery_probability: Some(outcome.recovery_probability),
        confidence: outcome.confidence,
        source: outcome.source,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn full_handler(
    State(engine): State<Arc<TriageEngine>>,
    Json(request): Json<PredictionRequest>,
) -> Response {
    let features = match request.features() {
        Ok(features) => features,
        Err(err) => return rejected(err),
    };
    let assessment = engine.assess(&features);
    let body = FullPredictionResponse {
        priority: assessment.priority.priority,
        recovery_probability: assessment.recovery.recovery_probability,
        priority_confidence: assessment.priority.confidence,
        recovery_confidence: assessment.recovery.confidence,
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
        let router = prediction_router(Arc::new(TriageEngine::rule_based()));
        let response = router
            .oneshot(
                Request::post(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }

    #[tokio::test]
    async fn priority_endpoint_applies_rules() {
        let (status, body) = post_json(
            "/api/predict/priority",
            json!({ "amount": 60000.0, "overdue_days": 30 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["priority"], "High");
        assert_eq!(body["confidence"], 0.85);
        assert_eq!(body["source"], "rule_based");
        assert!(body.get("recovery_probability").is_none());
    }

    #[tokio::test]
    async fn recovery_endpoint_uses_segment_and_defaults() {
        let (status, body) = post_json(
            "/api/predict/recovery",
            json!({
                "amount": 120000.0,
                "overdue_days": 5,
                "customer_segment": "premium",
                "previous_defaults": 2
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recovery_probability"], 0.65);
        assert_eq!(body["confidence"], 0.7);
    }

    #[tokio::test]
    async fn full_endpoint_combines_both_predictions() {
        let (status, body) = post_json(
            "/api/predict/full",
            json!({ "amount": 10000.0, "overdue_days": 95 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["priority"], "High");
        assert_eq!(body["recovery_probability"], 0.5);
        assert_eq!(body["priority_confidence"], 0.85);
        assert_eq!(body["recovery_confidence"], 0.7);
    }

    #[tokio::test]
    async fn negative_amount_is_unprocessable() {
        let (status, body) = post_json(
            "/api/predict/priority",
            json!({ "amount": -5.0, "overdue_days": 30 }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap_or_default().contains("amount"));
    }
}
