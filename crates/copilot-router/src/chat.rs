use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{info, warn};

use copilot_client::{BoxError, CopilotError};
use copilot_protocol::openai::chat_completions::{ChatRequest, ChatResponse};

use crate::GatewayState;
use crate::auth::resolve_backend_token;
use crate::error::{json_error, relay_error};

const RELAY_BUFFER: usize = 32;
const SSE_DONE_FRAME: &[u8] = b"data: [DONE]\n\n";

enum RelayEvent {
    Frame(ChatResponse),
    Done,
    Failed(CopilotError),
}

pub(crate) async fn chat_completions(
    State(state): State<GatewayState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let request: ChatRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                format!("invalid chat request: {err}"),
            );
        }
    };

    let token = match resolve_backend_token(&state, &headers).await {
        Ok(token) => token,
        Err(err) => {
            warn!(event = "token_resolve_failed", op = "chat.completions", error = %err);
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    info!(
        event = "downstream_chat",
        model = %request.model,
        messages = request.messages.len(),
        is_stream = request.stream
    );
    if request.stream {
        stream_chat(state, token, request).await
    } else {
        buffered_chat(&state, &token, request).await
    }
}

async fn buffered_chat(state: &GatewayState, token: &str, request: ChatRequest) -> Response {
    let cancel = CancellationToken::new();
    let mut response = None;
    let result = state
        .client
        .chat_completions(token, request, &cancel, |frame| {
            response = Some(frame);
            std::future::ready(Ok::<(), BoxError>(()))
        })
        .await;

    match (result, response) {
        (Ok(()), Some(frame)) => (StatusCode::OK, Json(frame)).into_response(),
        (Ok(()), None) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "backend returned no response",
        ),
        (Err(err), _) => {
            warn!(event = "chat_failed", is_stream = false, error = %err);
            relay_error(&err)
        }
    }
}

/// Runs the backend stream on its own task and relays frames as SSE.
///
/// The first event decides the response: a failure before any frame is sent
/// as a plain JSON error, otherwise a 200 event stream starts. Dropping the
/// handler future or the response body cancels the backend call.
async fn stream_chat(state: GatewayState, token: String, request: ChatRequest) -> Response {
    let (tx, mut rx) = mpsc::channel::<RelayEvent>(RELAY_BUFFER);
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    // Armed before the first await so a disconnect at any point cancels the backend call.
    let guard = cancel.drop_guard();

    tokio::spawn(async move {
        let frame_tx = tx.clone();
        let result = state
            .client
            .chat_completions(&token, request, &task_cancel, move |frame| {
                let tx = frame_tx.clone();
                async move {
                    tx.send(RelayEvent::Frame(frame))
                        .await
                        .map_err(|_| BoxError::from("downstream closed"))
                }
            })
            .await;
        let last = match result {
            Ok(()) => RelayEvent::Done,
            Err(err) => RelayEvent::Failed(err),
        };
        let _ = tx.send(last).await;
    });

    let first = match rx.recv().await {
        Some(RelayEvent::Failed(err)) => {
            warn!(event = "chat_failed", is_stream = true, error = %err);
            return relay_error(&err);
        }
        Some(event) => event,
        None => {
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "chat relay ended unexpectedly",
            );
        }
    };

    let relay = Relay {
        first: Some(first),
        rx,
        finished: false,
        _guard: guard,
    };
    let body = stream::unfold(relay, |mut relay| async move {
        if relay.finished {
            return None;
        }
        let event = match relay.first.take() {
            Some(event) => event,
            None => relay.rx.recv().await?,
        };
        let chunk = match event {
            RelayEvent::Frame(frame) => sse_data(&frame),
            RelayEvent::Done => {
                relay.finished = true;
                Bytes::from_static(SSE_DONE_FRAME)
            }
            RelayEvent::Failed(err) => {
                warn!(event = "chat_stream_aborted", error = %err);
                relay.finished = true;
                sse_data(&serde_json::json!({ "error": err.to_string() }))
            }
        };
        Some((Ok::<_, Infallible>(chunk), relay))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .header(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        )
        .body(Body::from_stream(body))
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "response_build_failed").into_response()
        })
}

struct Relay {
    first: Option<RelayEvent>,
    rx: mpsc::Receiver<RelayEvent>,
    finished: bool,
    _guard: DropGuard,
}

fn sse_data<T: Serialize>(value: &T) -> Bytes {
    let mut out = b"data: ".to_vec();
    if serde_json::to_writer(&mut out, value).is_err() {
        out.truncate(b"data: ".len());
        out.extend_from_slice(b"{\"error\":\"encode failed\"}");
    }
    out.extend_from_slice(b"\n\n");
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_data_frames_json() {
        let frame = ChatResponse {
            id: "chatcmpl-1".to_string(),
            ..Default::default()
        };
        let chunk = sse_data(&frame);
        let text = std::str::from_utf8(&chunk).unwrap();
        assert!(text.starts_with("data: {"));
        assert!(text.ends_with("}\n\n"));
        assert!(text.contains("\"id\":\"chatcmpl-1\""));
    }
}
