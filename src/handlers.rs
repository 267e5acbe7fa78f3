use crate::config::Config;
use crate::errors::{AppError, LookupFailure};
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::pipeline::{AnalysisOutcome, AnalysisPipeline};
use crate::presentation::failure_message;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Analysis pipeline (registry client + evaluators + decision engine).
    pub pipeline: Arc<AnalysisPipeline>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-cnpj-risk-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/analysis
///
/// Runs a full analysis for the CNPJ in the request body.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - JSON body with the `cnpj` field, in any formatting.
///
/// # Returns
///
/// * `Result<Response, AppError>` - The decision output with the financial analysis,
///   or a classified failure body.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalysisRequest>,
) -> Result<Response, AppError> {
    tracing::info!("POST /analysis - cnpj: {}", payload.cnpj);
    run_analysis(&state, &payload.cnpj).await
}

/// GET /api/v1/analysis/:cnpj
///
/// Same as `analyze`, with the CNPJ taken from the path (digits only).
pub async fn analyze_by_cnpj(
    State(state): State<Arc<AppState>>,
    Path(cnpj): Path<String>,
) -> Result<Response, AppError> {
    tracing::info!("GET /analysis/{}", cnpj);
    run_analysis(&state, &cnpj).await
}

async fn run_analysis(state: &AppState, cnpj: &str) -> Result<Response, AppError> {
    if cnpj.trim().is_empty() {
        return Err(AppError::BadRequest("cnpj is required".to_string()));
    }

    let outcome = state.pipeline.run(cnpj).await;
    Ok(outcome_into_response(outcome, &state.config))
}

/// Maps a pipeline outcome onto an HTTP status and JSON body.
pub fn outcome_into_response(outcome: AnalysisOutcome, config: &Config) -> Response {
    let msg = config.locale.messages();
    let (status, token, message) = match outcome {
        AnalysisOutcome::Completed(report) => {
            tracing::info!(
                "Analysis {} completed: {}",
                report.analysis_id,
                report.decision.verdict
            );
            let report = *report;
            let body = AnalysisResponse {
                analysis_id: report.analysis_id,
                decision: report.decision,
                sector_finding: report.sector_finding,
                financial_analysis: report.financial.narrative,
            };
            return (StatusCode::OK, Json(body)).into_response();
        }
        AnalysisOutcome::LookupFailed(failure) => {
            let status = match failure {
                LookupFailure::InvalidId => StatusCode::BAD_REQUEST,
                LookupFailure::UpstreamFailure => StatusCode::BAD_GATEWAY,
                LookupFailure::UnknownFailure => StatusCode::INTERNAL_SERVER_ERROR,
                LookupFailure::Timeout => StatusCode::GATEWAY_TIMEOUT,
            };
            (status, failure.as_token(), failure_message(failure, config.locale))
        }
        AnalysisOutcome::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            msg.failure_not_found.to_string(),
        ),
        AnalysisOutcome::ReasoningFailed(detail) => {
            tracing::error!("Reasoning failure: {}", detail);
            (
                StatusCode::BAD_GATEWAY,
                "REASONING_FAILURE",
                msg.failure_reasoning.to_string(),
            )
        }
    };

    (status, Json(json!({ "error": token, "message": message }))).into_response()
}
