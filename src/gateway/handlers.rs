use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::form::FormData;
use crate::generation::{
    GenerationStatus, NarrativeType, RegenerateLetterResponse, RegenerateNarrativeResponse,
    ToolSelection,
};

use super::AppState;

/// Wire bodies with every field optional, so a missing field is reported by
/// name instead of as a generic decode failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateBody {
    pub selection: Option<ToolSelection>,
    pub form_data: Option<FormData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegenerateNarrativeBody {
    pub narrative_type: Option<NarrativeType>,
    pub form_data: Option<FormData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegenerateLetterBody {
    pub form_data: Option<FormData>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bad_request(message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

fn rejected(route: &str, rejection: &JsonRejection) -> Response {
    tracing::debug!(route, error = %rejection.body_text(), "invalid request body");
    bad_request(&format!("Invalid request body: {}", rejection.body_text()))
}

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "generator": state.orchestrator.generator_name(),
    }))
}

/// POST /api/generate-documents
///
/// 200 for `success` and `partial_fail`, 500 for `total_fail`. The body is
/// the full result either way.
pub(super) async fn handle_generate_documents(
    State(state): State<AppState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected("generate-documents", &rejection),
    };
    let Some(selection) = body.selection else {
        return bad_request("selection is required");
    };
    let Some(form_data) = body.form_data else {
        return bad_request("formData is required");
    };

    let result = state
        .orchestrator
        .generate_documents(selection, form_data)
        .await;
    let status = match result.status {
        GenerationStatus::Success | GenerationStatus::PartialFail => StatusCode::OK,
        GenerationStatus::TotalFail => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(result)).into_response()
}

/// POST /api/regenerate-narrative
pub(super) async fn handle_regenerate_narrative(
    State(state): State<AppState>,
    body: Result<Json<RegenerateNarrativeBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected("regenerate-narrative", &rejection),
    };
    let Some(narrative_type) = body.narrative_type else {
        return bad_request("narrativeType is required");
    };
    let Some(form_data) = body.form_data else {
        return bad_request("formData is required");
    };

    match state
        .orchestrator
        .regenerate_narrative(narrative_type, &form_data)
        .await
    {
        Ok(narrative) => Json(RegenerateNarrativeResponse { narrative }).into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string()),
    }
}

/// POST /api/regenerate-letter
pub(super) async fn handle_regenerate_letter(
    State(state): State<AppState>,
    body: Result<Json<RegenerateLetterBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected("regenerate-letter", &rejection),
    };
    let Some(form_data) = body.form_data else {
        return bad_request("formData is required");
    };

    match state.orchestrator.regenerate_letter(&form_data).await {
        Ok(letter) => Json(RegenerateLetterResponse { letter }).into_response(),
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string()),
    }
}
