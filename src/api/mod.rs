use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{
    DishcastError, VERSION,
    analysis::{AnalysisMode, FRAMEWORK_CATALOG, TEMPLATED_SECTIONS},
    models::Timeframe,
    prediction::{PredictionReport, PredictionRequest, PredictionService},
};

type AppState = Arc<PredictionService>;

/// Error body returned by every handler
pub struct ApiError(DishcastError);

impl From<DishcastError> for ApiError {
    fn from(err: DishcastError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DishcastError::Validation { .. } => StatusCode::BAD_REQUEST,
            DishcastError::Api { .. } | DishcastError::Parse { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

#[derive(Serialize)]
pub struct ApiTimeframe {
    pub id: Timeframe,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct ApiFrameworks {
    pub catalog: Vec<&'static str>,
    pub templated: Vec<&'static str>,
    pub timeframes: Vec<ApiTimeframe>,
    pub analysis_modes: Vec<AnalysisMode>,
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/frameworks", get(frameworks))
        .route("/health", get(health))
        .with_state(service)
}

async fn predict(
    State(service): State<AppState>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionReport>, ApiError> {
    let report = service.predict(request).await?;
    Ok(Json(report))
}

async fn frameworks() -> Json<ApiFrameworks> {
    Json(ApiFrameworks {
        catalog: FRAMEWORK_CATALOG.to_vec(),
        templated: TEMPLATED_SECTIONS.to_vec(),
        timeframes: Timeframe::ALL
            .iter()
            .map(|timeframe| ApiTimeframe {
                id: *timeframe,
                label: timeframe.label(),
            })
            .collect(),
        analysis_modes: vec![AnalysisMode::Templated, AnalysisMode::Generated],
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}
