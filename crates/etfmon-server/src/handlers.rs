//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use etfmon::{AnalysisError, EtfAnalyzer, EtfReport};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Multipart field carrying the constituent CSV.
pub const UPLOAD_FIELD: &str = "file";

/// Application state.
#[derive(Debug)]
pub struct AppState {
    /// Pipeline shared by every request
    pub analyzer: EtfAnalyzer,
}

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Analysis pipeline failure
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Malformed request outside the pipeline
    #[error("{0}")]
    BadRequest(String),
}

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            Self::Analysis(e) if e.is_client_error() => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Analysis(e @ AnalysisError::Load(_)) => {
                error!("Price data unavailable: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Price data unavailable".to_string(),
                )
            }
            Self::Analysis(e) => {
                error!("Unexpected error in ETF analysis: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    data_loaded: bool,
}

/// Health check handler.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "etf-api",
        version: "v1",
        data_loaded: state.analyzer.data_loaded(),
    })
}

/// API root: name, version and mounted API versions.
pub async fn api_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "ETF Price Monitor API",
        "version": env!("CARGO_PKG_VERSION"),
        "versions": {
            "v1": "/api/py/v1"
        },
        "documentation": "/docs"
    }))
}

/// Analyze an uploaded constituent file.
///
/// The pipeline scans the whole price table, so it runs on the blocking pool.
pub async fn upload_etf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<EtfReport>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file content: {}", e)))?;
        upload = Some((filename, content.to_vec()));
    }

    let (filename, content) = upload.ok_or_else(|| {
        warn!("Upload request without a '{}' field", UPLOAD_FIELD);
        ApiError::BadRequest(format!(
            "Missing '{}' field in multipart request",
            UPLOAD_FIELD
        ))
    })?;

    info!("Received ETF upload: {}", filename);
    let analyzer = state.analyzer.clone();
    let report = tokio::task::spawn_blocking(move || analyzer.analyze_csv(&content, &filename))
        .await
        .map_err(|e| AnalysisError::Calculation(e.to_string()))??;

    info!(
        "Returning {} index points and {} top holdings",
        report.time_series.len(),
        report.top_holdings.len()
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use etfmon::{LoadError, ParseError};
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::BadRequest("no file".to_string()), StatusCode::BAD_REQUEST)]
    #[case(ApiError::Analysis(ParseError::Empty.into()), StatusCode::BAD_REQUEST)]
    #[case(
        ApiError::Analysis(AnalysisError::Validation(vec!["bad".to_string()])),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        ApiError::Analysis(LoadError::NotFound { path: "p.csv".into() }.into()),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[case(
        ApiError::Analysis(AnalysisError::Calculation("panic".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_status_mapping(#[case] err: ApiError, #[case] expected: StatusCode) {
        assert_eq!(err.into_response().status(), expected);
    }
}
