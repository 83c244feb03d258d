use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use copilot_client::CopilotError;

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Backend status errors keep their status code; everything else is a 500.
pub(crate) fn relay_error(err: &CopilotError) -> Response {
    let status = err
        .status()
        .and_then(|status| StatusCode::from_u16(status.status_code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_error(status, err.to_string())
}
