//! Prediction API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use loan_core::features::LayoutInfo;
use loan_core::model::{EngineStatus, LoanDecision};
use loan_core::RawRecord;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: LoanDecision,
    pub probability: f64,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    #[serde(flatten)]
    pub status: EngineStatus,
    pub layout: LayoutInfo,
}

/// Classify one JSON applicant record
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RawRecord>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(record) = payload?;

    let prediction = state.classifier.predict(&record).map_err(|e| {
        tracing::warn!("Prediction refused: {}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        "Prediction: {} (p={:.4}, {}us)",
        prediction.decision,
        prediction.probability,
        prediction.inference_time_us
    );

    Ok(Json(PredictResponse {
        prediction: prediction.decision,
        probability: prediction.probability,
    }))
}

/// Loaded model details
pub async fn model_info(State(state): State<AppState>) -> AppResult<Json<ModelResponse>> {
    let schema = state
        .classifier
        .schema()
        .ok_or_else(|| AppError::NotReady("model not loaded".to_string()))?;

    Ok(Json(ModelResponse {
        layout: schema.info(),
        status: state.classifier.status(),
    }))
}
