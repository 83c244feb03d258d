use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use copilot_protocol::copilot::models::ModelsResponse;
use copilot_transform::list_models::copilot2openai;

use crate::GatewayState;
use crate::auth::resolve_backend_token;
use crate::error::json_error;

pub(crate) async fn list_models(
    State(state): State<GatewayState>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET {
        return json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let token = match resolve_backend_token(&state, &headers).await {
        Ok(token) => token,
        Err(err) => {
            warn!(event = "token_resolve_failed", op = "models.list", error = %err);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    let cancel = CancellationToken::new();
    let models = match state.client.models(&token, &cancel).await {
        Ok(models) => models,
        Err(err) => {
            warn!(event = "models_list_failed", error = %err);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    info!(event = "models_list", models = models.len());
    let response = copilot2openai::transform_response(ModelsResponse {
        data: models,
        object: "list".to_string(),
    });
    (StatusCode::OK, Json(response)).into_response()
}
